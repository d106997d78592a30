//! JSON Emitter
//!
//! Machine-readable finding output. One array per run; each finding records
//! the file it was reported against.

use std::io::Write;

use csa_ir::Span;

use crate::Diagnostic;

use super::{escape_json, trailing_comma, DiagnosticEmitter, FileContext};

/// JSON emitter for machine-readable output.
pub struct JsonEmitter<W: Write> {
    writer: W,
    first: bool,
    file: FileContext,
}

impl<W: Write> JsonEmitter<W> {
    /// Create a new JSON emitter.
    pub fn new(writer: W) -> Self {
        JsonEmitter {
            writer,
            first: true,
            file: FileContext::default(),
        }
    }

    /// Attribute the following findings to `path`, resolving line and
    /// column against `source` when given.
    pub fn set_file(&mut self, path: impl Into<String>, source: Option<&str>) {
        self.file.set_path(path);
        match source {
            Some(source) => self.file.set_source(source),
            None => self.file.clear_source(),
        }
    }

    /// Begin the JSON array output.
    pub fn begin(&mut self) {
        let _ = writeln!(self.writer, "[");
    }

    /// End the JSON array output.
    pub fn end(&mut self) {
        if self.first {
            let _ = writeln!(self.writer, "]");
        } else {
            let _ = writeln!(self.writer, "\n]");
        }
    }

    /// Consume the emitter, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn position_fields(&mut self, span: Span, indent: &str) {
        match self.file.line_col(span.start) {
            Some((line, col)) => {
                let _ = writeln!(self.writer, "{indent}\"line\": {line},");
                let _ = writeln!(self.writer, "{indent}\"column\": {col},");
            }
            None => {
                let _ = writeln!(self.writer, "{indent}\"line\": null,");
                let _ = writeln!(self.writer, "{indent}\"column\": null,");
            }
        }
    }
}

fn json_str_or_null(value: Option<&str>) -> String {
    value.map_or_else(|| "null".to_string(), |s| format!("\"{}\"", escape_json(s)))
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        if !self.first {
            let _ = writeln!(self.writer, ",");
        }
        self.first = false;

        let _ = writeln!(self.writer, "  {{");
        let _ = writeln!(self.writer, "    \"code\": \"{}\",", diagnostic.code);
        let _ = writeln!(self.writer, "    \"severity\": \"{}\",", diagnostic.severity);
        let _ = writeln!(
            self.writer,
            "    \"check\": {},",
            json_str_or_null(diagnostic.check)
        );
        let _ = writeln!(
            self.writer,
            "    \"message\": \"{}\",",
            escape_json(&diagnostic.message)
        );
        let _ = writeln!(
            self.writer,
            "    \"template\": {},",
            json_str_or_null(diagnostic.template)
        );

        let _ = writeln!(self.writer, "    \"args\": [");
        for (i, arg) in diagnostic.args.iter().enumerate() {
            let comma = trailing_comma(i, diagnostic.args.len());
            let _ = writeln!(
                self.writer,
                "      {{ \"kind\": \"{}\", \"value\": \"{}\" }}{comma}",
                arg.kind(),
                escape_json(arg.value())
            );
        }
        let _ = writeln!(self.writer, "    ],");

        let path = self.file.path.clone();
        let _ = writeln!(
            self.writer,
            "    \"file\": {},",
            json_str_or_null(path.as_deref())
        );
        match diagnostic.primary_span() {
            Some(span) => self.position_fields(span, "    "),
            None => {
                let _ = writeln!(self.writer, "    \"line\": null,");
                let _ = writeln!(self.writer, "    \"column\": null,");
            }
        }

        match diagnostic.range {
            Some(range) => {
                let _ = writeln!(
                    self.writer,
                    "    \"range\": {{ \"start\": {}, \"end\": {} }},",
                    range.start, range.end
                );
            }
            None => {
                let _ = writeln!(self.writer, "    \"range\": null,");
            }
        }

        let _ = writeln!(self.writer, "    \"labels\": [");
        for (i, label) in diagnostic.labels.iter().enumerate() {
            let comma = trailing_comma(i, diagnostic.labels.len());
            let _ = writeln!(self.writer, "      {{");
            let _ = writeln!(self.writer, "        \"start\": {},", label.span.start);
            let _ = writeln!(self.writer, "        \"end\": {},", label.span.end);
            self.position_fields(label.span, "        ");
            let _ = writeln!(
                self.writer,
                "        \"message\": \"{}\",",
                escape_json(&label.message)
            );
            let _ = writeln!(self.writer, "        \"primary\": {}", label.is_primary);
            let _ = writeln!(self.writer, "      }}{comma}");
        }
        let _ = writeln!(self.writer, "    ],");

        let _ = writeln!(self.writer, "    \"notes\": [");
        for (i, note) in diagnostic.notes.iter().enumerate() {
            let comma = trailing_comma(i, diagnostic.notes.len());
            let _ = writeln!(self.writer, "      \"{}\"{}", escape_json(note), comma);
        }
        let _ = writeln!(self.writer, "    ]");

        let _ = write!(self.writer, "  }}");
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, _error_count: usize, _warning_count: usize) {
        // Counts are derivable from the array itself.
    }
}
