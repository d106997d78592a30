//! Allocator affinity: which types and constructors accept an allocator.
//!
//! A constructor takes an allocator when its last parameter is a pointer to
//! the allocator type. With conversions enabled it also qualifies when the
//! last parameter is a `const` reference to a type that itself takes an
//! allocator directly. The conversion is followed one level only, so the
//! recursion always bottoms out.
//!
//! Results are memoized per unit. `false` is recorded before a query
//! recurses, so a query that reaches itself again sees `false` instead of
//! looping.

use rustc_hash::FxHashMap;

use csa_ir::types::TypeKind;
use csa_ir::{DeclId, QualType, TranslationUnit, TypeId};

/// Memoized affinity answers, keyed by canonical type or constructor and
/// by whether conversions were allowed.
#[derive(Clone, Debug, Default)]
pub(crate) struct AffinityCache {
    types: FxHashMap<(QualType, bool), bool>,
    ctors: FxHashMap<(DeclId, bool), bool>,
}

impl AffinityCache {
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.types.len() + self.ctors.len()
    }
}

/// Affinity queries over one unit.
pub(crate) struct Oracle<'a> {
    unit: &'a TranslationUnit,
    allocator: Option<TypeId>,
    cache: &'a mut AffinityCache,
}

impl<'a> Oracle<'a> {
    pub(crate) fn new(
        unit: &'a TranslationUnit,
        allocator: Option<TypeId>,
        cache: &'a mut AffinityCache,
    ) -> Self {
        Oracle {
            unit,
            allocator,
            cache,
        }
    }

    pub(crate) fn unit(&self) -> &'a TranslationUnit {
        self.unit
    }

    pub(crate) fn allocator(&self) -> Option<TypeId> {
        self.allocator
    }

    /// Pointer to the allocator type, however spelled.
    pub(crate) fn is_allocator(&self, ty: QualType) -> bool {
        let Some(allocator) = self.allocator else {
            return false;
        };
        self.unit
            .pointee(ty)
            .is_some_and(|pointee| self.unit.canonical(pointee).ty == allocator)
    }

    /// Record a type names once template spellings and substituted
    /// parameters are looked through.
    pub(crate) fn record_decl_of(&self, ty: QualType) -> Option<DeclId> {
        let mut ty = ty;
        if let Some(TypeKind::TemplateSpecialization { .. }) = self.unit.type_kind(ty.ty) {
            ty = self.unit.desugar_once(ty).unwrap_or(ty);
        }
        if let Some(TypeKind::SubstTemplateParm { .. }) = self.unit.type_kind(ty.ty) {
            ty = self.unit.desugar_once(ty).unwrap_or(ty);
        }
        self.unit.as_record_decl(ty)
    }

    /// Whether some constructor of `ty` takes an allocator.
    pub(crate) fn type_takes_allocator(&mut self, ty: QualType, conv: bool) -> bool {
        let key = (self.unit.canonical(ty), conv);
        if let Some(&known) = self.cache.types.get(&key) {
            tracing::trace!(ty = ?key.0, conv, known, "type affinity cached");
            return known;
        }
        self.cache.types.insert(key, false);

        let Some(record) = self.record_decl_of(ty) else {
            return false;
        };
        let unit = self.unit;
        for &ctor in unit.constructors_of(record) {
            if self.constructor_takes_allocator(ctor, conv) {
                self.cache.types.insert(key, true);
                return true;
            }
        }
        false
    }

    /// Whether `ctor`'s last parameter accepts an allocator.
    pub(crate) fn constructor_takes_allocator(&mut self, ctor: DeclId, conv: bool) -> bool {
        let key = (ctor, conv);
        if let Some(&known) = self.cache.ctors.get(&key) {
            tracing::trace!(?ctor, conv, known, "constructor affinity cached");
            return known;
        }
        self.cache.ctors.insert(key, false);

        let unit = self.unit;
        let Some(last) = unit
            .constructor(ctor)
            .and_then(|c| c.params.last())
            .and_then(|&param| unit.param(param))
        else {
            return false;
        };

        if self.is_allocator(last.ty) {
            self.cache.ctors.insert(key, true);
            return true;
        }
        if !conv {
            return false;
        }

        let Some(referent) = unit.referenced_type(last.ty) else {
            return false;
        };
        if !referent.is_const {
            return false;
        }

        let takes = self.type_takes_allocator(referent, false);
        self.cache.ctors.insert(key, takes);
        takes
    }
}

#[cfg(test)]
mod tests;
