//! The `check` command: run the source checks over unit dumps.

use std::io::Write;
use std::path::Path;

use csa_checks::{check_unit, CheckConfig, CheckResult};
use csa_diagnostic::emitter::{ColorMode, DiagnosticEmitter, JsonEmitter, TerminalEmitter};
use rayon::prelude::*;

use crate::dump::{load_unit, LoadError};

/// How findings are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable, on stderr.
    #[default]
    Terminal,
    /// One JSON array on stdout.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "invalid format '{other}' (expected terminal or json)"
            )),
        }
    }
}

/// Parsed `check` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckOptions {
    pub paths: Vec<String>,
    pub format: OutputFormat,
    pub color: ColorMode,
    pub config: CheckConfig,
}

/// Parse the arguments following `check`.
pub fn parse_check_options(args: &[String]) -> Result<CheckOptions, String> {
    let mut options = CheckOptions::default();

    for arg in args {
        if let Some(format) = arg.strip_prefix("--format=") {
            options.format = format.parse()?;
        } else if let Some(color) = arg.strip_prefix("--color=") {
            options.color = color.parse()?;
        } else if let Some(name) = arg.strip_prefix("--allocator=") {
            if name.is_empty() {
                return Err("--allocator needs a qualified class name".to_string());
            }
            options.config.allocator_forward.allocator = name.to_string();
        } else if let Some(limit) = arg.strip_prefix("--limit=") {
            options.config.diagnostics.limit = limit
                .parse()
                .map_err(|_| format!("invalid limit '{limit}' (expected a number)"))?;
        } else if let Some(checks) = arg.strip_prefix("--checks=") {
            options.config.enabled = Some(
                checks
                    .split(',')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        } else if arg == "--no-dedup" {
            options.config.diagnostics.deduplicate = false;
        } else if arg.starts_with('-') {
            return Err(format!("unknown option '{arg}'"));
        } else {
            options.paths.push(arg.clone());
        }
    }

    if options.paths.is_empty() {
        return Err("missing unit dump path".to_string());
    }
    Ok(options)
}

/// Outcome of checking one dump.
#[derive(Debug)]
pub struct FileReport {
    /// The dump as named on the command line.
    pub dump: String,
    /// Source file findings are positioned against, with its text when the
    /// dump embeds it.
    pub file: String,
    pub source: Option<String>,
    pub outcome: Result<CheckResult, LoadError>,
}

/// Load and check every dump. Dumps are processed in parallel; reports come
/// back in input order.
#[tracing::instrument(level = "debug", skip_all, fields(dumps = paths.len()))]
pub fn analyse_files(paths: &[String], config: &CheckConfig) -> Vec<FileReport> {
    paths
        .par_iter()
        .map(|path| analyse_file(path, config))
        .collect()
}

fn analyse_file(path: &str, config: &CheckConfig) -> FileReport {
    match load_unit(Path::new(path)) {
        Ok(unit) => {
            let result = check_unit(&unit, config);
            FileReport {
                dump: path.to_string(),
                file: unit.path().unwrap_or(path).to_string(),
                source: unit.source().map(str::to_string),
                outcome: Ok(result),
            }
        }
        Err(error) => FileReport {
            dump: path.to_string(),
            file: path.to_string(),
            source: None,
            outcome: Err(error),
        },
    }
}

/// Totals over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub units: usize,
    pub load_errors: usize,
    pub errors: usize,
    pub warnings: usize,
    pub dropped: usize,
}

impl Summary {
    fn add(&mut self, result: &CheckResult) {
        self.units += 1;
        self.errors += result.error_count();
        self.warnings += result.warning_count();
        self.dropped += result.dropped;
    }

    pub fn findings(&self) -> usize {
        self.errors + self.warnings
    }

    /// Exit status: non-zero when a dump failed to load or anything was
    /// reported.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.load_errors > 0 || self.findings() > 0 || self.dropped > 0)
    }
}

/// Render reports for a human. Load failures are written to `errors`.
pub fn render_terminal<W: Write, E: Write>(
    reports: &[FileReport],
    emitter: &mut TerminalEmitter<W>,
    errors: &mut E,
) -> Summary {
    let mut summary = Summary::default();
    for report in reports {
        match &report.outcome {
            Ok(result) => {
                emitter.set_file(report.file.as_str(), report.source.as_deref());
                emitter.emit_all(&result.diagnostics);
                summary.add(result);
            }
            Err(error) => {
                summary.load_errors += 1;
                let _ = writeln!(errors, "error: {error}");
            }
        }
    }
    emitter.emit_summary(summary.errors, summary.warnings);
    emitter.flush();
    if summary.dropped > 0 {
        let _ = writeln!(
            errors,
            "note: {} further finding(s) not shown, limit reached",
            summary.dropped
        );
    }
    summary
}

/// Render reports as a single JSON array. Load failures are written to
/// `errors`.
pub fn render_json<W: Write, E: Write>(
    reports: &[FileReport],
    emitter: &mut JsonEmitter<W>,
    errors: &mut E,
) -> Summary {
    let mut summary = Summary::default();
    emitter.begin();
    for report in reports {
        match &report.outcome {
            Ok(result) => {
                emitter.set_file(report.file.as_str(), report.source.as_deref());
                emitter.emit_all(&result.diagnostics);
                summary.add(result);
            }
            Err(error) => {
                summary.load_errors += 1;
                let _ = writeln!(errors, "error: {error}");
            }
        }
    }
    emitter.end();
    emitter.flush();
    summary
}

/// Run `check` and return the exit status.
pub fn check_files(options: &CheckOptions) -> i32 {
    let reports = analyse_files(&options.paths, &options.config);
    let mut stderr = std::io::stderr();

    let summary = match options.format {
        OutputFormat::Terminal => {
            let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
            let mut emitter =
                TerminalEmitter::with_color_mode(std::io::stderr(), options.color, is_tty);
            let summary = render_terminal(&reports, &mut emitter, &mut stderr);
            if summary.exit_code() == 0 {
                println!("OK: {} unit(s) checked, no findings", summary.units);
            }
            summary
        }
        OutputFormat::Json => {
            let mut emitter = JsonEmitter::new(std::io::stdout().lock());
            render_json(&reports, &mut emitter, &mut stderr)
        }
    };

    tracing::debug!(
        units = summary.units,
        findings = summary.findings(),
        load_errors = summary.load_errors,
        "check finished"
    );
    summary.exit_code()
}
