use std::fmt;

use crate::model::Grammar;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty section list, bad marker, etc.).
    ConfigValidation(String),
    /// Two sections declare the same header line.
    DuplicateSection(String),
    /// A result-line grammar failed to compile from the configured vocabulary.
    Pattern { grammar: Grammar, message: String },
    /// TOML serialization error.
    ConfigSerialize(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::DuplicateSection(header) => {
                write!(f, "section header '{header}' is declared more than once")
            }
            Self::Pattern { grammar, message } => {
                write!(f, "cannot build {grammar} grammar: {message}")
            }
            Self::ConfigSerialize(msg) => write!(f, "config serialize error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
