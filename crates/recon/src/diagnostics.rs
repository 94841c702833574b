//! Leveled diagnostics emitted by the parser and the merge engine.
//!
//! Engine functions never log directly: they take a `&mut dyn DiagnosticSink`
//! supplied by the caller. The binary passes a [`LogSink`] that forwards to the
//! `log` facade; tests pass a `Vec<Diagnostic>` and inspect what was emitted.

use std::fmt;

use log::Level;

use crate::model::{FieldConflict, Grammar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A result line produced one observation per listed grammar.
    LineMatched { line: String, grammars: Vec<Grammar> },
    /// A line that is neither a section header nor a result line.
    LineUnmatched { line: String },
    /// A section header line switched the active prefix.
    SectionEntered { header: String, prefix: String },
    /// A result line appeared before any section header; an empty prefix is used.
    MissingSection { line: String },
    /// A later observation replaced an earlier one for the same parameter in one file.
    DuplicateParameter { source: String, parameter: String },
    /// Files disagree on min/max/units for a parameter.
    FieldConflict(FieldConflict),
}

impl Diagnostic {
    pub fn level(&self) -> Level {
        match self {
            Self::LineMatched { .. }
            | Self::LineUnmatched { .. }
            | Self::SectionEntered { .. }
            | Self::DuplicateParameter { .. } => Level::Debug,
            Self::MissingSection { .. } => Level::Warn,
            Self::FieldConflict(_) => Level::Error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineMatched { line, grammars } => {
                let names: Vec<String> = grammars.iter().map(|g| g.to_string()).collect();
                write!(f, "LINE OK      [{}]: {line}", names.join(","))
            }
            Self::LineUnmatched { line } => write!(f, "LINE INVALID : {line}"),
            Self::SectionEntered { header, prefix } => {
                write!(f, "section {header:?} -> prefix {prefix:?}")
            }
            Self::MissingSection { line } => {
                write!(f, "result found before any section header, using empty prefix: {line}")
            }
            Self::DuplicateParameter { source, parameter } => {
                write!(f, "{source}: parameter {parameter:?} reported again, keeping the later value")
            }
            Self::FieldConflict(conflict) => write!(f, "{conflict}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);

    /// Whether diagnostics at `level` will be kept. Callers skip building
    /// per-line debug events when this returns false.
    fn wants(&self, _level: Level) -> bool {
        true
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards every diagnostic to the `log` facade at its own level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        log::log!(diagnostic.level(), "{diagnostic}");
    }

    fn wants(&self, level: Level) -> bool {
        level <= log::max_level()
    }
}

/// Wraps another sink and tallies warnings and errors passing through it.
#[derive(Debug, Default)]
pub struct CountingSink<S> {
    inner: S,
    pub warnings: usize,
    pub errors: usize,
}

impl<S: DiagnosticSink> CountingSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            warnings: 0,
            errors: 0,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: DiagnosticSink> DiagnosticSink for CountingSink<S> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level() {
            Level::Error => self.errors += 1,
            Level::Warn => self.warnings += 1,
            _ => {}
        }
        self.inner.emit(diagnostic);
    }

    fn wants(&self, level: Level) -> bool {
        // Warnings and errors are always counted, even if the inner sink drops them.
        level <= Level::Warn || self.inner.wants(level)
    }
}
