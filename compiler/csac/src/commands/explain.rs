//! The `explain` command: print the documentation of a finding code.

use csa_diagnostic::{ErrorCode, ErrorDocs};

/// Print the documentation for `code_str`. Returns the exit status.
pub fn explain_error(code_str: &str) -> i32 {
    let Ok(code) = code_str.parse::<ErrorCode>() else {
        eprintln!("Unknown finding code: {code_str}");
        eprintln!();
        let known: Vec<&str> = ErrorCode::ALL.iter().map(ErrorCode::as_str).collect();
        eprintln!("Known codes: {}", known.join(", "));
        return 1;
    };

    if let Some(doc) = ErrorDocs::get(code) {
        println!("{doc}");
        0
    } else {
        eprintln!("No documentation available for {code}");
        1
    }
}
