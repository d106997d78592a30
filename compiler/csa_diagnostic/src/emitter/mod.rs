//! Finding emitters.
//!
//! - Terminal: colored, human-readable output with source snippets
//! - JSON: machine-readable output for tooling
//!
//! Both implement [`DiagnosticEmitter`]. Positions are rendered against the
//! file set with `set_file`, so one emitter can serve a whole run.

mod json;
mod terminal;

pub use json::JsonEmitter;
pub use terminal::{ColorMode, TerminalEmitter};

use std::fmt::Write;

use crate::span_utils::LineOffsetTable;
use crate::Diagnostic;

/// Returns a trailing comma for JSON list serialization.
///
/// Returns `","` when `index` is not the last element, `""` otherwise.
pub(crate) fn trailing_comma(index: usize, total: usize) -> &'static str {
    if index + 1 < total {
        ","
    } else {
        ""
    }
}

/// Trait for emitting findings in various formats.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);

    /// Emit a summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}

/// The file diagnostics are currently positioned against.
#[derive(Clone, Debug, Default)]
pub(crate) struct FileContext {
    pub(crate) path: Option<String>,
    source: Option<(String, LineOffsetTable)>,
}

impl FileContext {
    pub(crate) fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    pub(crate) fn set_source(&mut self, source: impl Into<String>) {
        let source = source.into();
        let table = LineOffsetTable::build(&source);
        self.source = Some((source, table));
    }

    pub(crate) fn clear_source(&mut self) {
        self.source = None;
    }

    /// 1-based (line, column) of a byte offset, if source text is known.
    pub(crate) fn line_col(&self, offset: u32) -> Option<(u32, u32)> {
        self.source
            .as_ref()
            .map(|(source, table)| table.offset_to_line_col(source, offset))
    }

    /// Text of a 1-based line without its terminator.
    pub(crate) fn line_text(&self, line: u32) -> Option<&str> {
        let (source, table) = self.source.as_ref()?;
        table.line_text(source, line)
    }

    pub(crate) fn source(&self) -> Option<&str> {
        self.source.as_ref().map(|(source, _)| source.as_str())
    }
}

/// Escape a string for JSON output.
pub(crate) fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(result, "\\u{:04x}", c as u32);
            }
            c => result.push(c),
        }
    }
    result
}
