//! Terminal Emitter
//!
//! Human-readable finding output with optional ANSI color support and
//! source snippets when the file's text is known.

use std::io::Write;

use csa_ir::Span;

use crate::{Diagnostic, Label, Severity};

use super::{DiagnosticEmitter, FileContext};

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Automatically detect based on terminal capabilities.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorMode {
    /// Resolve to a boolean based on terminal detection.
    ///
    /// `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            other => Err(format!(
                "invalid color mode '{other}' (expected auto, always or never)"
            )),
        }
    }
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    file: FileContext,
}

impl<W: Write> TerminalEmitter<W> {
    /// Create a new terminal emitter with explicit color mode.
    ///
    /// # Arguments
    ///
    /// * `writer` - The output writer
    /// * `mode` - Color mode selection
    /// * `is_tty` - Whether output is a TTY (used for `ColorMode::Auto`)
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            file: FileContext::default(),
        }
    }

    /// Render positions as `line:col` and show snippets from `source`.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.file.set_source(source);
        self
    }

    /// Prefix locations with `path`.
    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file.set_path(path);
        self
    }

    /// Switch to another file between batches of findings.
    pub fn set_file(&mut self, path: impl Into<String>, source: Option<&str>) {
        self.file.set_path(path);
        match source {
            Some(source) => self.file.set_source(source),
            None => self.file.clear_source(),
        }
    }

    /// Consume the emitter, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn severity_color(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        }
    }

    fn write_code(&mut self, code: &str) {
        if self.colors {
            let _ = write!(self.writer, "{}[{code}]{}", colors::BOLD, colors::RESET);
        } else {
            let _ = write!(self.writer, "[{code}]");
        }
    }

    /// `path:line:col`, or the raw span when no source is known.
    fn location(&self, span: Span) -> String {
        let position = match self.file.line_col(span.start) {
            Some((line, col)) => format!("{line}:{col}"),
            None => format!("{span:?}"),
        };
        match &self.file.path {
            Some(path) => format!("{path}:{position}"),
            None => position,
        }
    }

    /// Gutter, source line and carets under the label's span.
    ///
    /// Returns `false` when no source line is available.
    fn write_snippet(&mut self, label: &Label, color: &'static str) -> bool {
        let Some((line, col)) = self.file.line_col(label.span.start) else {
            return false;
        };
        let Some(text) = self.file.line_text(line).map(str::to_owned) else {
            return false;
        };

        let gutter = line.to_string();
        let pad = " ".repeat(gutter.len());
        let width = self.caret_width(label.span, &text, col);
        let carets = if label.is_primary { "^" } else { "-" }.repeat(width);

        self.write_colored(&format!("{pad} |"), colors::SECONDARY);
        let _ = writeln!(self.writer);
        self.write_colored(&format!("{gutter} |"), colors::SECONDARY);
        let _ = writeln!(self.writer, " {text}");
        self.write_colored(&format!("{pad} |"), colors::SECONDARY);
        let indent = " ".repeat(col as usize);
        let _ = write!(self.writer, "{indent}");
        self.write_colored(&carets, color);
        if !label.message.is_empty() {
            let _ = write!(self.writer, " ");
            self.write_colored(&label.message, color);
        }
        let _ = writeln!(self.writer);
        true
    }

    /// Characters of `span` on its first line, at least one.
    fn caret_width(&self, span: Span, line_text: &str, col: u32) -> usize {
        let remaining = line_text
            .chars()
            .count()
            .saturating_sub(col.saturating_sub(1) as usize);
        let spanned = self
            .file
            .source()
            .and_then(|source| source.get(span.start as usize..span.end as usize))
            .map_or(0, |text| text.chars().take_while(|&c| c != '\n').count());
        spanned.min(remaining).max(1)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        // Header: severity[CODE]: message [check]
        let color = Self::severity_color(diagnostic.severity);
        self.write_colored(&diagnostic.severity.to_string(), color);
        self.write_code(diagnostic.code.as_str());
        let _ = write!(self.writer, ": {}", diagnostic.message);
        if let Some(check) = diagnostic.check {
            let _ = write!(self.writer, " [{check}]");
        }
        let _ = writeln!(self.writer);

        for label in &diagnostic.labels {
            let marker = if label.is_primary { "-->" } else { ":::" };
            let location = self.location(label.span);
            let _ = write!(self.writer, "  {marker} ");
            self.write_colored(&location, colors::BOLD);
            let _ = writeln!(self.writer);

            let label_color = if label.is_primary {
                color
            } else {
                colors::SECONDARY
            };
            if !self.write_snippet(label, label_color) && !label.message.is_empty() {
                let _ = write!(self.writer, "      ");
                self.write_colored(&label.message, label_color);
                let _ = writeln!(self.writer);
            }
        }

        if let Some(range) = diagnostic.range {
            let start = self.location(range);
            let _ = writeln!(self.writer, "  = range: {start} ({} bytes)", range.len());
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count == 0 && warning_count == 0 {
            return;
        }

        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let _ = write!(
                self.writer,
                ": {error_count} error{}",
                plural_s(error_count)
            );
            if warning_count > 0 {
                let _ = write!(
                    self.writer,
                    " and {warning_count} warning{}",
                    plural_s(warning_count)
                );
            }
            let _ = writeln!(self.writer, " found");
        } else {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}
