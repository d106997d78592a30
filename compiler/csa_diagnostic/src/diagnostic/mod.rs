//! Core diagnostic types for structured finding reports.
//!
//! Defines [`Diagnostic`], [`Label`], [`Severity`] and [`DiagnosticArg`],
//! the building blocks every check uses to report findings.

use csa_ir::Span;
use std::fmt::{self, Write};

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A value substituted into a message template.
///
/// Declarations and types are quoted when rendered (`'bsl::string'`),
/// expressions and free text are inserted verbatim.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DiagnosticArg {
    /// Name of a declaration.
    Decl(String),
    /// Spelling of a type.
    Type(String),
    /// Source text of an expression.
    Expr(String),
    Text(String),
}

impl DiagnosticArg {
    /// The unquoted value.
    pub fn value(&self) -> &str {
        match self {
            DiagnosticArg::Decl(s)
            | DiagnosticArg::Type(s)
            | DiagnosticArg::Expr(s)
            | DiagnosticArg::Text(s) => s,
        }
    }

    /// Lowercase kind name (`decl`, `type`, `expr`, `text`).
    pub fn kind(&self) -> &'static str {
        match self {
            DiagnosticArg::Decl(_) => "decl",
            DiagnosticArg::Type(_) => "type",
            DiagnosticArg::Expr(_) => "expr",
            DiagnosticArg::Text(_) => "text",
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            DiagnosticArg::Decl(s) | DiagnosticArg::Type(s) => {
                let _ = write!(out, "'{s}'");
            }
            DiagnosticArg::Expr(s) | DiagnosticArg::Text(s) => out.push_str(s),
        }
    }
}

/// Substitute `%0`, `%1`, ... in `template` with `args`.
///
/// A slot with no matching argument is left as written. `%%` is a
/// literal percent sign.
pub fn render_template(template: &str, args: &[DiagnosticArg]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if let Some(tail) = after.strip_prefix('%') {
            out.push('%');
            rest = tail;
            continue;
        }
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let arg = after[..digits]
            .parse::<usize>()
            .ok()
            .and_then(|index| args.get(index));
        match arg {
            Some(arg) => arg.render(&mut out),
            None => out.push_str(&rest[pos..=pos + digits]),
        }
        rest = &after[digits..];
    }
    out.push_str(rest);
    out
}

/// A labeled span with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    /// The source location to highlight.
    pub span: Span,
    /// The label text explaining this location.
    pub message: String,
    /// Whether this is the primary location.
    pub is_primary: bool,
}

impl Label {
    /// Create a primary label (the finding's location).
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label (related context).
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A finding with all context needed for reporting.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Severity level.
    pub severity: Severity,
    /// Identifier of the check that produced the finding.
    pub check: Option<&'static str>,
    /// Rendered message.
    pub message: String,
    /// Message template before substitution, if built from one.
    pub template: Option<&'static str>,
    /// Arguments substituted into `template`.
    pub args: Vec<DiagnosticArg>,
    /// Source range the finding covers, beyond its primary location.
    pub range: Option<Span>,
    /// Labeled spans showing where the finding occurred.
    pub labels: Vec<Label>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            check: None,
            message: String::new(),
            template: None,
            args: Vec::new(),
            range: None,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Attribute the finding to a check.
    pub fn with_check(mut self, check: &'static str) -> Self {
        self.check = Some(check);
        self
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the message from a `%N` template and its arguments.
    pub fn with_template(mut self, template: &'static str, args: Vec<DiagnosticArg>) -> Self {
        self.message = render_template(template, &args);
        self.template = Some(template);
        self.args = args;
        self
    }

    /// Add a primary label at the finding's location.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Attach the source range the finding covers.
    pub fn with_range(mut self, range: Span) -> Self {
        self.range = Some(range);
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Get the primary span (first primary label's span).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }

    /// Check if this is an error (vs warning/note).
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;
        if let Some(check) = self.check {
            write!(f, " [{check}]")?;
        }

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {} {:?}: {}", marker, label.span, label.message)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        Ok(())
    }
}
