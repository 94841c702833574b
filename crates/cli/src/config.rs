//! `labmerge config` and `labmerge sections` — configuration inspection.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;
use labmerge_recon::LabConfig;

use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the built-in configuration as TOML
    #[command(after_help = "\
Examples:
  labmerge config default > labmerge.toml")]
    Default,

    /// Check a configuration file without merging anything
    #[command(after_help = "\
Examples:
  labmerge config validate labmerge.toml")]
    Validate {
        /// Path to the TOML configuration file
        file: PathBuf,
    },
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Default => cmd_config_default(),
        ConfigCommands::Validate { file } => cmd_config_validate(&file),
    }
}

fn stdout_err(e: io::Error) -> CliError {
    CliError::general(format!("cannot write to stdout: {e}"))
}

/// Built-in configuration, or the file at `path` parsed and validated.
pub fn load_config(path: Option<&Path>) -> Result<LabConfig, CliError> {
    let Some(path) = path else {
        return Ok(LabConfig::default());
    };

    log::debug!("loading configuration from {}", path.display());
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::config(format!("cannot read {}: {}", path.display(), e)))?;
    LabConfig::from_toml(&text).map_err(|e| {
        CliError::config(format!("{}: {}", path.display(), e))
            .with_hint("run `labmerge config default` for a complete example")
    })
}

fn cmd_config_default() -> Result<(), CliError> {
    let text = LabConfig::default().to_toml().map_err(|e| CliError::config(e.to_string()))?;
    io::stdout().lock().write_all(text.as_bytes()).map_err(stdout_err)
}

fn cmd_config_validate(file: &Path) -> Result<(), CliError> {
    let config = load_config(Some(file))?;
    println!(
        "ok: {} sections, {} qualitative words, match = {}",
        config.sections.len(),
        config.qualitative_words.len(),
        config.match_mode
    );
    Ok(())
}

// ============================================================================
// sections
// ============================================================================

pub fn cmd_sections(config: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if json {
        let text = serde_json::to_string_pretty(&config.sections)
            .map_err(|e| CliError::config(e.to_string()))?;
        writeln!(handle, "{}", text).map_err(stdout_err)?;
        return Ok(());
    }

    let width = config
        .sections
        .iter()
        .map(|s| s.header.chars().count())
        .max()
        .unwrap_or(0);
    for section in &config.sections {
        let pad = width - section.header.chars().count();
        writeln!(handle, "{}{}  {}", section.header, " ".repeat(pad), section.prefix)
            .map_err(stdout_err)?;
    }
    Ok(())
}
