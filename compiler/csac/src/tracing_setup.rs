//! Tracing subscriber setup.
//!
//! Nothing is installed unless `RUST_LOG` is set. With `CSA_LOG_TREE` also
//! set, spans are rendered as an indented tree instead of flat lines:
//!
//! ```bash
//! RUST_LOG=csa_checks=debug csac check unit.json
//! RUST_LOG=debug CSA_LOG_TREE=1 csac check unit.json
//! ```
//!
//! Output always goes to stderr so `--format=json` stays parseable.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();

        if std::env::var_os("CSA_LOG_TREE").is_some() {
            let tree = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree).init();
        } else {
            let flat = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true);
            Registry::default().with(filter).with(flat).init();
        }
    });
}
