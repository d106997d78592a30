//! Diagnostic queue for collecting, deduplicating, and sorting findings.
//!
//! Features:
//! - A finding limit to prevent overwhelming output
//! - Deduplication of identical findings (same code, location, message and
//!   substitution arguments)
//! - Stable ordering by source position on flush

use rustc_hash::FxHashSet;

use csa_ir::Span;

use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, DiagnosticArg, ErrorCode};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of findings kept (0 = unlimited).
    pub limit: usize,
    /// Drop findings identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            limit: 0,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config that keeps everything (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            limit: 0,
            deduplicate: false,
        }
    }
}

/// Queued diagnostic with its position for sorting.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct QueuedDiagnostic {
    pub(crate) diagnostic: Diagnostic,
    /// Line number (1-based) for sorting.
    pub(crate) line: u32,
    /// Column number (1-based) for sorting within a line.
    pub(crate) column: u32,
}

/// Identity of a finding for deduplication.
///
/// Templates without a slot for their subject render the same message for
/// different subjects, so the arguments and range take part too.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct DedupKey {
    code: ErrorCode,
    primary: Option<Span>,
    range: Option<Span>,
    message: String,
    args: Vec<DiagnosticArg>,
}

impl DedupKey {
    fn of(diag: &Diagnostic) -> Self {
        DedupKey {
            code: diag.code,
            primary: diag.primary_span(),
            range: diag.range,
            message: diag.message.clone(),
            args: diag.args.clone(),
        }
    }
}

/// Queue for collecting, deduplicating, and sorting findings.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.add(diagnostic, line, column);
/// // ... add more diagnostics
/// let sorted = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<QueuedDiagnostic>,
    seen: FxHashSet<DedupKey>,
    /// Findings rejected because the limit was reached.
    dropped: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic at a known position.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic, line: u32, column: u32) -> bool {
        if self.limit_reached() {
            self.dropped += 1;
            return false;
        }

        if self.config.deduplicate {
            if !self.seen.insert(DedupKey::of(&diag)) {
                return false;
            }
        }

        self.diagnostics.push(QueuedDiagnostic {
            diagnostic: diag,
            line,
            column,
        });
        true
    }

    /// Add a diagnostic with position computed from source.
    pub fn add_with_source(&mut self, diag: Diagnostic, source: &str) -> bool {
        let table = LineOffsetTable::build(source);
        self.add_with_table(diag, &table, source)
    }

    /// Add a diagnostic with position computed from a pre-built table.
    ///
    /// Diagnostics without a primary span sort first.
    pub fn add_with_table(
        &mut self,
        diag: Diagnostic,
        table: &LineOffsetTable,
        source: &str,
    ) -> bool {
        let (line, column) = diag
            .primary_span()
            .map_or((0, 0), |span| table.offset_to_line_col(source, span.start));
        self.add(diag, line, column)
    }

    /// Add a diagnostic ordered by the byte offset of its primary span.
    ///
    /// For units without source text: offsets still give a stable order.
    pub fn add_by_offset(&mut self, diag: Diagnostic) -> bool {
        let offset = diag.primary_span().map_or(0, |span| span.start);
        self.add(diag, 0, offset)
    }

    /// Check if the limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.limit > 0 && self.diagnostics.len() >= self.config.limit
    }

    /// Findings rejected because the limit was reached.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.peek().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.peek().filter(|d| d.is_warning()).count()
    }

    /// Sort diagnostics by position and return them.
    ///
    /// Clears the queue. The sort is stable: findings at the same position
    /// keep the order they were reported in.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let already_sorted = self
            .diagnostics
            .windows(2)
            .all(|w| (w[0].line, w[0].column) <= (w[1].line, w[1].column));

        if !already_sorted {
            self.diagnostics.sort_by_key(|d| (d.line, d.column));
        }

        let result = self.diagnostics.drain(..).map(|d| d.diagnostic).collect();
        self.seen.clear();
        self.dropped = 0;
        result
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().map(|d| &d.diagnostic)
    }
}
