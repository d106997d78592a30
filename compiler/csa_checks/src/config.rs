//! Check configuration.

use csa_diagnostic::queue::DiagnosticConfig;

/// Qualified names the allocator checks key on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AllocatorForwardConfig {
    /// The allocator protocol class.
    pub allocator: String,
    /// Alias of the "true" integral constant the uses-allocator trait
    /// derives from.
    pub true_type: String,
    /// Template named by the nested trait declaration idiom
    /// (`operator NestedTraitDeclaration<X>()`).
    pub nested_trait: String,
    /// Trait template explicitly specialized for allocator-aware classes.
    pub uses_allocator_trait: String,
}

impl Default for AllocatorForwardConfig {
    fn default() -> Self {
        AllocatorForwardConfig {
            allocator: "BloombergLP::bslma::Allocator".to_string(),
            true_type: "bsl::true_type".to_string(),
            nested_trait: "BloombergLP::bslalg::TypeTraitUsesBslmaAllocator::NestedTraitDeclaration"
                .to_string(),
            uses_allocator_trait: "BloombergLP::bslma::UsesBslmaAllocator".to_string(),
        }
    }
}

/// Configuration for one analysis run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CheckConfig {
    /// Check identifiers to run. `None` runs every registered check.
    pub enabled: Option<Vec<String>>,
    pub allocator_forward: AllocatorForwardConfig,
    pub diagnostics: DiagnosticConfig,
}

impl CheckConfig {
    pub fn is_enabled(&self, check: &str) -> bool {
        self.enabled
            .as_ref()
            .map_or(true, |enabled| enabled.iter().any(|name| name == check))
    }
}
