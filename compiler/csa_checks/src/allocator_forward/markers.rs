//! Marker types discovered while the unit streams by.

use csa_ir::ast::{RecordDecl, TypedefDecl};
use csa_ir::{DeclId, QualType, TranslationUnit, TypeId};

use crate::AllocatorForwardConfig;

/// The allocator protocol type and the "true" trait base, once seen.
///
/// Each marker is set by the first matching declaration and never changes
/// afterwards.
#[derive(Clone, Debug, Default)]
pub(crate) struct Markers {
    allocator: Option<TypeId>,
    true_type: Option<QualType>,
}

impl Markers {
    pub(crate) fn observe_record(
        &mut self,
        id: DeclId,
        record: &RecordDecl,
        unit: &TranslationUnit,
        config: &AllocatorForwardConfig,
    ) {
        if self.allocator.is_some() || !config.allocator.ends_with(unit.name(id)) {
            return;
        }
        if unit.qualified_name(id) == config.allocator {
            let ty = unit.canonical(QualType::new(record.ty)).ty;
            tracing::debug!(decl = ?id, ty = ?ty, "allocator type found");
            self.allocator = Some(ty);
        }
    }

    pub(crate) fn observe_typedef(
        &mut self,
        id: DeclId,
        typedef: &TypedefDecl,
        unit: &TranslationUnit,
        config: &AllocatorForwardConfig,
    ) {
        if self.true_type.is_none() && unit.qualified_name(id) == config.true_type {
            tracing::debug!(decl = ?id, "true type found");
            self.true_type = Some(typedef.underlying);
        }
    }

    /// Canonical allocator type, if declared so far.
    pub(crate) fn allocator(&self) -> Option<TypeId> {
        self.allocator
    }

    /// Record the true-type alias names.
    pub(crate) fn true_type_record(&self, unit: &TranslationUnit) -> Option<DeclId> {
        self.true_type.and_then(|ty| unit.as_record_decl(ty))
    }
}
