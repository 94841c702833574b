use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reference data and fixed markers for one merge run.
///
/// Every key is optional in TOML; missing keys fall back to the built-in
/// values returned by [`LabConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabConfig {
    /// Leading words that mark a qualitative (descriptive) result.
    pub qualitative_words: Vec<String>,
    /// Input file extensions; a leading dot is optional. Compared case-insensitively.
    pub input_extensions: Vec<String>,
    /// Substring removed from every file display name before it becomes a column header.
    pub strip_from_name: String,
    /// Cell text for a parameter that a file does not report.
    pub missing_marker: String,
    /// Cell text for a min/max/units field whose values disagree across files.
    pub conflict_marker: String,
    #[serde(rename = "match")]
    pub match_mode: MatchMode,
    /// Output base name prefix; a `_%y%m%d_%H%M%S` timestamp is appended.
    pub report_name_prefix: String,
    /// Known report sections, matched verbatim against whole lines.
    /// Must remain the last field: TOML tables are emitted after plain keys.
    pub sections: Vec<SectionConfig>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            qualitative_words: ["Amarillo", "Claro", "Negativo", "Ausentes"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            input_extensions: vec!["txt".into()],
            strip_from_name: "Antonio Luna".into(),
            missing_marker: ".".into(),
            conflict_marker: "## MULTIPLE ##".into(),
            match_mode: MatchMode::default(),
            report_name_prefix: "merged".into(),
            sections: vec![
                SectionConfig::new("EXAMEN GENERAL DE ORINA", "Orina."),
                SectionConfig::new("QUÍMICA INTEGRAL DE 45 ELEMENTOS", "Sangre."),
                SectionConfig::new("QUÍMICA 6", "Sangre."),
                SectionConfig::new("HEMOGLOBINA GLICOSILADA A1c", "Sangre."),
                SectionConfig::new("ÁCIDO ÚRICO EN SANGRE", "Sangre."),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    /// Exact header line as it appears in the report.
    pub header: String,
    /// Prefix prepended to every parameter found under this header.
    pub prefix: String,
}

impl SectionConfig {
    pub fn new(header: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            prefix: prefix.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Match mode
// ---------------------------------------------------------------------------

/// How many grammars may emit an observation for a single line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Every grammar that matches emits its own observation.
    #[default]
    All,
    /// Only the highest-priority matching grammar emits.
    First,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::First => write!(f, "first"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl LabConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: LabConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigSerialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.sections.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one section is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.header.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "section header must not be empty".into(),
                ));
            }
            if !seen.insert(section.header.as_str()) {
                return Err(ReconError::DuplicateSection(section.header.clone()));
            }
        }

        if self.qualitative_words.is_empty() {
            return Err(ReconError::ConfigValidation(
                "qualitative_words must list at least one word".into(),
            ));
        }
        if self.qualitative_words.iter().any(|w| w.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(
                "qualitative_words must not contain empty words".into(),
            ));
        }

        if self.input_extensions.is_empty() {
            return Err(ReconError::ConfigValidation(
                "input_extensions must list at least one extension".into(),
            ));
        }

        let mut marker = self.missing_marker.chars();
        match (marker.next(), marker.next()) {
            (Some(c), None) if !c.is_whitespace() => {}
            _ => {
                return Err(ReconError::ConfigValidation(format!(
                    "missing_marker must be a single non-space character, got {:?}",
                    self.missing_marker
                )))
            }
        }

        if self.conflict_marker.is_empty() {
            return Err(ReconError::ConfigValidation(
                "conflict_marker must not be empty".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOM: &str = r#"
qualitative_words = ["Positivo", "Negativo"]
strip_from_name = "Paciente"
missing_marker = "-"
match = "first"

[[sections]]
header = "BIOMETRÍA HEMÁTICA"
prefix = "Hemo."

[[sections]]
header = "PERFIL DE LÍPIDOS"
prefix = "Sangre."
"#;

    #[test]
    fn default_is_valid() {
        let config = LabConfig::default();
        config.validate().unwrap();
        assert_eq!(config.sections.len(), 5);
        assert_eq!(config.sections[2].header, "QUÍMICA 6");
        assert_eq!(config.sections[2].prefix, "Sangre.");
        assert_eq!(config.conflict_marker, "## MULTIPLE ##");
        assert_eq!(config.match_mode, MatchMode::All);
    }

    #[test]
    fn parse_custom() {
        let config = LabConfig::from_toml(CUSTOM).unwrap();
        assert_eq!(config.sections.len(), 2);
        assert_eq!(config.sections[0].prefix, "Hemo.");
        assert_eq!(config.qualitative_words, vec!["Positivo", "Negativo"]);
        assert_eq!(config.missing_marker, "-");
        assert_eq!(config.match_mode, MatchMode::First);
        // Untouched keys keep their defaults
        assert_eq!(config.conflict_marker, "## MULTIPLE ##");
        assert_eq!(config.input_extensions, vec!["txt"]);
    }

    #[test]
    fn empty_input_gives_defaults() {
        let config = LabConfig::from_toml("").unwrap();
        assert_eq!(config, LabConfig::default());
    }

    #[test]
    fn toml_round_trip_of_defaults() {
        let text = LabConfig::default().to_toml().unwrap();
        let parsed = LabConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, LabConfig::default());
    }

    #[test]
    fn reject_unknown_key() {
        let err = LabConfig::from_toml("colour = \"red\"\n");
        assert!(err.is_err(), "unknown keys should fail deserialization");
    }

    #[test]
    fn reject_invalid_match_mode() {
        let err = LabConfig::from_toml("match = \"best\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn reject_duplicate_section() {
        let input = r#"
[[sections]]
header = "QUÍMICA 6"
prefix = "Sangre."

[[sections]]
header = "QUÍMICA 6"
prefix = "Otra."
"#;
        let err = LabConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn reject_empty_sections() {
        let err = LabConfig::from_toml("sections = []\n").unwrap_err();
        assert!(err.to_string().contains("at least one section"));
    }

    #[test]
    fn reject_wide_missing_marker() {
        let err = LabConfig::from_toml("missing_marker = \"n/a\"\n").unwrap_err();
        assert!(err.to_string().contains("missing_marker"));

        let err = LabConfig::from_toml("missing_marker = \" \"\n").unwrap_err();
        assert!(err.to_string().contains("missing_marker"));
    }

    #[test]
    fn reject_empty_qualitative_word() {
        let err = LabConfig::from_toml("qualitative_words = [\"Claro\", \"\"]\n").unwrap_err();
        assert!(err.to_string().contains("empty words"));
    }
}
