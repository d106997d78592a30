//! Diagnostic system for check findings.
//!
//! Every finding carries:
//! - An error code for searchability (`--explain`)
//! - The identifier of the check that produced it
//! - A message template with positional `%N` slots plus the typed
//!   arguments substituted into it
//! - A primary label (where) and an optional source range
//!
//! Findings are collected in a [`DiagnosticQueue`](queue::DiagnosticQueue),
//! sorted by position and rendered by an [`emitter`].

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod errors;
pub mod queue;
pub mod span_utils;

pub use diagnostic::{render_template, Diagnostic, DiagnosticArg, Label, Severity};
pub use error_code::ErrorCode;
pub use errors::ErrorDocs;
