//! csac CLI
//!
//! Allocator source checks over translation-unit dumps.

use csac::commands::{check_files, explain_error, parse_check_options};

fn main() {
    csac::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    let status = match command.as_str() {
        "check" => match parse_check_options(&args[2..]) {
            Ok(options) => check_files(&options),
            Err(message) => {
                eprintln!("error: {message}");
                eprintln!("Usage: csac check <dump.json>... [options]");
                1
            }
        },
        "--explain" | "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: csac explain <CODE>");
                eprintln!("Example: csac explain MA01");
                1
            } else {
                explain_error(&args[2])
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        "version" | "--version" | "-V" => {
            println!("csac {}", env!("CARGO_PKG_VERSION"));
            0
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            1
        }
    };

    if status != 0 {
        std::process::exit(status);
    }
}

fn print_usage() {
    println!("csac - allocator source checks for C++ translation units");
    println!();
    println!("Usage: csac <command> [options]");
    println!();
    println!("Commands:");
    println!("  check <dump.json>...  Check translation-unit dumps");
    println!("  explain <code>        Explain a finding code (e.g., MA01)");
    println!("  help                  Show this help message");
    println!("  version               Show version information");
    println!();
    println!("Check options:");
    println!("  --format=<fmt>        Output: terminal (default), json");
    println!("  --color=<mode>        Color: auto (default), always, never");
    println!("  --allocator=<name>    Allocator class (default: BloombergLP::bslma::Allocator)");
    println!("  --checks=<a,b>        Only run the named checks");
    println!("  --limit=<n>           Stop after n findings per unit (0 = unlimited)");
    println!("  --no-dedup            Keep duplicate findings");
    println!();
    println!("Environment:");
    println!("  RUST_LOG              Enable tracing (e.g., csa_checks=debug)");
    println!("  CSA_LOG_TREE          Render tracing spans as a tree");
    println!();
    println!("Examples:");
    println!("  csac check widget.json");
    println!("  csac check build/*.json --format=json");
    println!("  csac explain MA04");
}
