//! Source checks over parsed translation units.
//!
//! A check observes declarations and constructor calls while the
//! [`Analyser`] walks a unit, then reports findings once the whole unit has
//! been seen. Checks are created fresh for every unit by the
//! [`CheckRegistry`], so no state crosses units.
//!
//! The only built-in check is [`allocator_forward`].

pub mod allocator_forward;
mod analyser;
mod check;
mod config;

#[cfg(test)]
mod test_support;

pub use analyser::{check_unit, check_unit_with, Analyser, CheckResult, Reporter};
pub use check::{Check, CheckFactory, CheckRegistry};
pub use config::{AllocatorForwardConfig, CheckConfig};
