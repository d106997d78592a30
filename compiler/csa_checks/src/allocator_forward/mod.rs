//! Allocator forwarding and misrouting.
//!
//! Classes that allocate take a trailing `bslma::Allocator *` in their
//! constructors, and must hand it to every base and member that allocates
//! too. This check collects constructors, constructor calls and trait
//! declarations while the unit is walked, then reports:
//!
//! - `MA01`: an allocator not passed to an allocator-aware base or member;
//! - `MA02`: a class whose allocator trait disagrees with its constructors,
//!   or an allocator argument that conversion routed into the wrong
//!   parameter;
//! - `MA04`: a constructor of an allocator-aware class with no
//!   allocator-taking counterpart.
//!
//! Nothing is queried until the whole unit has been seen, so the order in
//! which marker types and trait specializations are declared does not
//! matter.

mod collector;
mod forwarding;
mod markers;
mod misroute;
mod oracle;
mod problem;

use rustc_hash::FxHashSet;

use csa_ir::ast::{ConstructorDecl, ConversionDecl, RecordDecl, TypedefDecl};
use csa_ir::{DeclId, ExprId, TranslationUnit};

use crate::{AllocatorForwardConfig, Check, CheckConfig, Reporter};

use collector::Collected;
use markers::Markers;
use oracle::{AffinityCache, Oracle};

pub use problem::AllocatorProblem;

/// Identifier the check registers and reports under.
pub const CHECK_NAME: &str = "allocator-forward";

/// Per-unit state of the allocator check.
#[derive(Clone, Debug, Default)]
pub struct AllocatorForward {
    config: AllocatorForwardConfig,
    markers: Markers,
    collected: Collected,
    cache: AffinityCache,
    /// `(innermost argument, constructor)` pairs already reported as
    /// misrouted.
    reported: FxHashSet<(ExprId, DeclId)>,
}

impl AllocatorForward {
    pub fn new(config: AllocatorForwardConfig) -> Self {
        AllocatorForward {
            config,
            ..Self::default()
        }
    }

    pub fn factory(config: &CheckConfig) -> Box<dyn Check> {
        Box::new(Self::new(config.allocator_forward.clone()))
    }

    /// Run both post-passes over what was collected.
    ///
    /// Problems come out in discovery order: forwarding findings per
    /// constructor, then trait findings per record, then misroutes.
    pub fn problems(&mut self, unit: &TranslationUnit) -> Vec<AllocatorProblem> {
        self.collected
            .resolve_trait_specializations(unit, &self.markers);

        let mut problems = Vec::new();
        let mut oracle = Oracle::new(unit, self.markers.allocator(), &mut self.cache);
        forwarding::check_constructors(&mut oracle, &self.collected, &mut problems);
        misroute::check_calls(
            &oracle,
            self.collected.calls(),
            &mut self.reported,
            &mut problems,
        );
        problems
    }
}

impl Check for AllocatorForward {
    fn name(&self) -> &'static str {
        CHECK_NAME
    }

    fn on_record(&mut self, id: DeclId, record: &RecordDecl, unit: &TranslationUnit) {
        self.markers.observe_record(id, record, unit, &self.config);
        self.collected
            .observe_specialization(id, record, unit, &self.config);
    }

    fn on_typedef(&mut self, id: DeclId, typedef: &TypedefDecl, unit: &TranslationUnit) {
        self.markers.observe_typedef(id, typedef, unit, &self.config);
    }

    fn on_constructor(&mut self, id: DeclId, _ctor: &ConstructorDecl, _unit: &TranslationUnit) {
        self.collected.add_constructor(id);
    }

    fn on_conversion(&mut self, id: DeclId, conversion: &ConversionDecl, unit: &TranslationUnit) {
        self.collected
            .observe_conversion(id, conversion, unit, &self.config);
    }

    fn on_construct_expr(&mut self, id: ExprId, _unit: &TranslationUnit) {
        self.collected.add_call(id);
    }

    fn on_unit_done(&mut self, unit: &TranslationUnit, reporter: &mut Reporter<'_>) {
        let problems = self.problems(unit);
        tracing::debug!(problems = problems.len(), "allocator-forward done");
        for problem in &problems {
            reporter.report(problem.into_diagnostic(unit).with_check(CHECK_NAME));
        }
    }
}
