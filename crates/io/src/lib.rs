// File I/O operations

pub mod commit;
pub mod csv;
pub mod discover;
pub mod json;
pub mod source;
pub mod xlsx;

/// Suffix of the sibling file every writer fills before renaming it into place.
pub const PARTIAL_SUFFIX: &str = "partial";
