//! Command handlers for the `csac` CLI.
//!
//! Handlers return the process exit status instead of exiting, so the
//! binary stays a thin argument dispatcher and the handlers can be driven
//! from tests.

mod check;
mod explain;

pub use check::{
    analyse_files, check_files, parse_check_options, render_json, render_terminal, CheckOptions,
    FileReport, OutputFormat, Summary,
};
pub use explain::explain_error;
