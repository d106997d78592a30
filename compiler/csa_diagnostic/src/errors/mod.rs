//! Embedded finding documentation for `--explain` support.
//!
//! Each code has a markdown file that explains the finding, shows an
//! example and the fix. These are embedded at compile time and can be
//! accessed via `ErrorDocs::get()`.
//!
//! # Adding New Documentation
//!
//! 1. Create a new file `XXNN.md` in this directory
//! 2. Add an entry to the `DOCS` array below

use crate::ErrorCode;

/// Registry of embedded finding documentation.
pub struct ErrorDocs;

impl ErrorDocs {
    /// Get the documentation for a code.
    ///
    /// Returns `Some(markdown)` if documentation exists for the code,
    /// `None` otherwise.
    pub fn get(code: ErrorCode) -> Option<&'static str> {
        DOCS.iter().find(|(c, _)| *c == code).map(|(_, doc)| *doc)
    }

    /// Get all documented codes.
    pub fn all_codes() -> impl Iterator<Item = ErrorCode> {
        DOCS.iter().map(|(code, _)| *code)
    }

    /// Check if a code has documentation.
    pub fn has_docs(code: ErrorCode) -> bool {
        DOCS.iter().any(|(c, _)| *c == code)
    }
}

/// Embedded documentation for each code.
static DOCS: &[(ErrorCode, &str)] = &[
    (ErrorCode::MA01, include_str!("MA01.md")),
    (ErrorCode::MA02, include_str!("MA02.md")),
    (ErrorCode::MA04, include_str!("MA04.md")),
];
