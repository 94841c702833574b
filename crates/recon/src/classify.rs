//! Line Classifier: section headers and the four result-line grammars.
//!
//! All grammars are anchored at both ends. The parameter capture is greedy, so
//! it absorbs everything up to the last position where the value/range/units
//! tail still matches.

use std::collections::HashMap;

use regex::{Captures, Regex};

use crate::config::{LabConfig, SectionConfig};
use crate::error::ReconError;
use crate::model::{Grammar, Observation};

const NUMBER: &str = r"\d[.\d]*";

// ---------------------------------------------------------------------------
// Section table
// ---------------------------------------------------------------------------

/// Exact-line lookup of known section headers.
#[derive(Debug, Clone)]
pub struct SectionTable {
    by_header: HashMap<String, SectionConfig>,
}

impl SectionTable {
    pub fn new(sections: &[SectionConfig]) -> Self {
        let by_header = sections
            .iter()
            .map(|s| (s.header.clone(), s.clone()))
            .collect();
        Self { by_header }
    }

    /// Section whose header equals `line` verbatim.
    pub fn match_header(&self, line: &str) -> Option<&SectionConfig> {
        self.by_header.get(line)
    }

    pub fn len(&self) -> usize {
        self.by_header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_header.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LineClassifier {
    sections: SectionTable,
    grammars: Vec<(Grammar, Regex)>,
}

impl LineClassifier {
    /// Compile the grammars for `config`'s qualitative vocabulary and section list.
    pub fn new(config: &LabConfig) -> Result<Self, ReconError> {
        let words: Vec<String> = config
            .qualitative_words
            .iter()
            .map(|w| regex::escape(w))
            .collect();

        let sources = [
            (
                Grammar::Descriptive,
                format!(
                    r"^(?P<parameter>.*)\s(?P<value>\S*)\s(?P<units>(?:{}).*)$",
                    words.join("|")
                ),
            ),
            (
                Grammar::Range,
                format!(
                    r"^(?P<parameter>.*)\s(?P<value>{NUMBER})\s(?P<min>{NUMBER})\s*-\s*(?P<max>{NUMBER})\s*(?P<units>.*)$"
                ),
            ),
            (
                Grammar::LessThan,
                format!(
                    r"^(?P<parameter>.*)\s(?P<value>{NUMBER})\s<\s*(?P<max>{NUMBER})\s*(?P<units>.*)$"
                ),
            ),
            (
                Grammar::GreaterThan,
                format!(
                    r"^(?P<parameter>.*)\s(?P<value>{NUMBER})\s>\s*(?P<min>{NUMBER})\s*(?P<units>.*)$"
                ),
            ),
        ];

        let mut grammars = Vec::with_capacity(sources.len());
        for (grammar, source) in sources {
            let re = Regex::new(&source).map_err(|e| ReconError::Pattern {
                grammar,
                message: e.to_string(),
            })?;
            grammars.push((grammar, re));
        }

        Ok(Self {
            sections: SectionTable::new(&config.sections),
            grammars,
        })
    }

    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    /// Section whose header equals `line` verbatim.
    pub fn match_header(&self, line: &str) -> Option<&SectionConfig> {
        self.sections.match_header(line)
    }

    /// Every grammar that matches `line`, in priority order, one observation each.
    pub fn classify(&self, line: &str, prefix: &str) -> Vec<Observation> {
        self.grammars
            .iter()
            .filter_map(|(grammar, re)| {
                re.captures(line)
                    .map(|caps| build_observation(*grammar, &caps, prefix))
            })
            .collect()
    }

    /// The highest-priority grammar match only.
    pub fn classify_first(&self, line: &str, prefix: &str) -> Option<Observation> {
        self.grammars.iter().find_map(|(grammar, re)| {
            re.captures(line)
                .map(|caps| build_observation(*grammar, &caps, prefix))
        })
    }
}

fn build_observation(grammar: Grammar, caps: &Captures<'_>, prefix: &str) -> Observation {
    let text = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

    let units = caps
        .name("units")
        .map(|m| m.as_str().trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    Observation {
        parameter: format!("{prefix}{}", &caps["parameter"]),
        current_value: caps["value"].to_string(),
        min_value: text("min"),
        max_value: text("max"),
        units,
        grammar,
    }
}
