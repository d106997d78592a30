//! The check interface and the registry of available checks.

use csa_ir::ast::{ConstructorDecl, ConversionDecl, RecordDecl, TypedefDecl};
use csa_ir::{DeclId, ExprId, TranslationUnit};

use crate::analyser::Reporter;
use crate::CheckConfig;

/// A source check.
///
/// The `on_*` callbacks fire during traversal, once per occurrence of the
/// node; the defaults ignore it. `on_unit_done` fires exactly once, after
/// the last callback, and is where findings are reported.
pub trait Check {
    /// Identifier findings are attributed to.
    fn name(&self) -> &'static str;

    fn on_record(&mut self, _id: DeclId, _record: &RecordDecl, _unit: &TranslationUnit) {}

    fn on_typedef(&mut self, _id: DeclId, _typedef: &TypedefDecl, _unit: &TranslationUnit) {}

    fn on_constructor(&mut self, _id: DeclId, _ctor: &ConstructorDecl, _unit: &TranslationUnit) {}

    fn on_conversion(
        &mut self,
        _id: DeclId,
        _conversion: &ConversionDecl,
        _unit: &TranslationUnit,
    ) {
    }

    /// A constructor call expression.
    fn on_construct_expr(&mut self, _id: ExprId, _unit: &TranslationUnit) {}

    fn on_unit_done(&mut self, unit: &TranslationUnit, reporter: &mut Reporter<'_>);
}

/// Creates a fresh check instance for one unit.
pub type CheckFactory = fn(&CheckConfig) -> Box<dyn Check>;

/// Checks available to an analysis run, by identifier.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    entries: Vec<(&'static str, CheckFactory)>,
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl CheckRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in check.
    pub fn with_builtin_checks() -> Self {
        let mut registry = Self::new();
        registry.register(
            crate::allocator_forward::CHECK_NAME,
            crate::allocator_forward::AllocatorForward::factory,
        );
        registry
    }

    /// Register `factory` under `name`.
    ///
    /// Returns `false`, leaving the registry unchanged, if the name is taken.
    pub fn register(&mut self, name: &'static str, factory: CheckFactory) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push((name, factory));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(registered, _)| *registered == name)
    }

    /// Registered identifiers in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// Fresh instances of every check `config` enables.
    pub fn instantiate(&self, config: &CheckConfig) -> Vec<Box<dyn Check>> {
        self.entries
            .iter()
            .filter(|(name, _)| config.is_enabled(name))
            .map(|(_, factory)| factory(config))
            .collect()
    }
}
