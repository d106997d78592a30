//! Analysis driver.
//!
//! The [`Analyser`] walks a unit once, forwarding every node to each enabled
//! check, then fires the unit-done event. Findings go through a
//! [`Reporter`] into a [`DiagnosticQueue`], which orders and deduplicates
//! them.

use csa_diagnostic::queue::DiagnosticQueue;
use csa_diagnostic::span_utils::LineOffsetTable;
use csa_diagnostic::Diagnostic;
use csa_ir::ast::{ConstructorDecl, ConversionDecl, RecordDecl, TypedefDecl};
use csa_ir::visitor::{walk_constructor, walk_construct_args, walk_unit, Visitor};
use csa_ir::{DeclId, ExprId, TranslationUnit};

use crate::{Check, CheckConfig, CheckRegistry};

/// Sink for the findings of one unit.
pub struct Reporter<'a> {
    queue: &'a mut DiagnosticQueue,
    /// Unit source and its line table, when positions can be resolved.
    source: Option<(&'a str, LineOffsetTable)>,
}

impl<'a> Reporter<'a> {
    pub fn new(queue: &'a mut DiagnosticQueue, unit: &'a TranslationUnit) -> Self {
        let source = unit
            .source()
            .map(|source| (source, LineOffsetTable::build(source)));
        Reporter { queue, source }
    }

    /// Queue a finding. Returns `false` if it was dropped as a duplicate or
    /// over the limit.
    pub fn report(&mut self, diagnostic: Diagnostic) -> bool {
        match &self.source {
            Some((source, table)) => self.queue.add_with_table(diagnostic, table, source),
            None => self.queue.add_by_offset(diagnostic),
        }
    }
}

/// Runs a set of checks over one unit.
pub struct Analyser {
    checks: Vec<Box<dyn Check>>,
}

impl Analyser {
    /// Fresh instances of every check `config` enables.
    pub fn new(registry: &CheckRegistry, config: &CheckConfig) -> Self {
        Analyser {
            checks: registry.instantiate(config),
        }
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Walk `unit`, then let every check report into `queue`.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(checks = self.checks.len(), decls = unit.decl_count())
    )]
    pub fn run(mut self, unit: &TranslationUnit, queue: &mut DiagnosticQueue) {
        walk_unit(&mut self, unit);

        let mut reporter = Reporter::new(queue, unit);
        for check in &mut self.checks {
            check.on_unit_done(unit, &mut reporter);
        }
    }
}

impl<'u> Visitor<'u> for Analyser {
    fn visit_record(&mut self, id: DeclId, record: &'u RecordDecl, unit: &'u TranslationUnit) {
        for check in &mut self.checks {
            check.on_record(id, record, unit);
        }
    }

    fn visit_typedef(&mut self, id: DeclId, typedef: &'u TypedefDecl, unit: &'u TranslationUnit) {
        for check in &mut self.checks {
            check.on_typedef(id, typedef, unit);
        }
    }

    fn visit_constructor(
        &mut self,
        id: DeclId,
        ctor: &'u ConstructorDecl,
        unit: &'u TranslationUnit,
    ) {
        for check in &mut self.checks {
            check.on_constructor(id, ctor, unit);
        }
        walk_constructor(self, ctor, unit);
    }

    fn visit_conversion(
        &mut self,
        id: DeclId,
        conversion: &'u ConversionDecl,
        unit: &'u TranslationUnit,
    ) {
        for check in &mut self.checks {
            check.on_conversion(id, conversion, unit);
        }
    }

    fn visit_construct_expr(&mut self, id: ExprId, args: &'u [ExprId], unit: &'u TranslationUnit) {
        for check in &mut self.checks {
            check.on_construct_expr(id, unit);
        }
        walk_construct_args(self, args, unit);
    }
}

/// Findings of one unit, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    /// Findings discarded because the configured limit was reached.
    pub dropped: usize,
}

impl CheckResult {
    pub fn has_findings(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }
}

/// Run every built-in check `config` enables over `unit`.
pub fn check_unit(unit: &TranslationUnit, config: &CheckConfig) -> CheckResult {
    check_unit_with(unit, &CheckRegistry::with_builtin_checks(), config)
}

/// Run the checks of `registry` that `config` enables over `unit`.
#[tracing::instrument(level = "debug", skip_all, fields(path = unit.path().unwrap_or("<memory>")))]
pub fn check_unit_with(
    unit: &TranslationUnit,
    registry: &CheckRegistry,
    config: &CheckConfig,
) -> CheckResult {
    let mut queue = DiagnosticQueue::with_config(config.diagnostics.clone());
    Analyser::new(registry, config).run(unit, &mut queue);

    let dropped = queue.dropped();
    let diagnostics = queue.flush();
    tracing::debug!(findings = diagnostics.len(), dropped, "unit checked");
    CheckResult {
        diagnostics,
        dropped,
    }
}
