//! `csac`: runs the source checks over translation-unit dumps.
//!
//! The C++ front end is an external tool. It writes every parsed unit as a
//! JSON dump ([`dump`]); this crate loads the dumps, runs the registered
//! checks and prints their findings.

pub mod commands;
pub mod dump;
mod tracing_setup;

pub use dump::{load_unit, parse_unit, LoadError, NodeError, UnitDump};
pub use tracing_setup::init_tracing;
