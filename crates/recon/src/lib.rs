//! `labmerge-recon` — Lab report parsing and multi-file merge engine.
//!
//! Pure engine crate: receives already-decoded report lines, returns the
//! merged parameter table and the report model. No CLI or IO dependencies.

pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod merge;
pub mod model;
pub mod parser;
pub mod report;

pub use config::{LabConfig, MatchMode, SectionConfig};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink};
pub use engine::{run, RunOutput, SourceInput};
pub use error::ReconError;
pub use model::{MergeSummary, MergedTable, SourceFile};
pub use report::{build_report, Report, ReportOptions};
