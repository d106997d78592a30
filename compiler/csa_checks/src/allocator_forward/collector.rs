//! Constructors, constructor calls and trait declarations gathered during
//! traversal, consumed once the unit is complete.

use std::hash::Hash;

use rustc_hash::FxHashSet;

use csa_ir::ast::{ConversionDecl, RecordDecl};
use csa_ir::types::TypeKind;
use csa_ir::{DeclId, ExprId, TranslationUnit};

use super::markers::Markers;
use crate::AllocatorForwardConfig;

/// Insertion-ordered set.
#[derive(Clone, Debug)]
struct Seen<T> {
    order: Vec<T>,
    set: FxHashSet<T>,
}

impl<T> Default for Seen<T> {
    fn default() -> Self {
        Seen {
            order: Vec::new(),
            set: FxHashSet::default(),
        }
    }
}

impl<T: Copy + Eq + Hash> Seen<T> {
    fn insert(&mut self, item: T) -> bool {
        let new = self.set.insert(item);
        if new {
            self.order.push(item);
        }
        new
    }

    fn as_slice(&self) -> &[T] {
        &self.order
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Collected {
    constructors: Seen<DeclId>,
    calls: Seen<ExprId>,
    records_with_trait: FxHashSet<DeclId>,
    /// Explicit specializations of the uses-allocator trait, checked once
    /// the true type is known.
    trait_specializations: Vec<DeclId>,
}

impl Collected {
    pub(crate) fn add_constructor(&mut self, ctor: DeclId) {
        self.constructors.insert(ctor);
    }

    pub(crate) fn add_call(&mut self, call: ExprId) {
        self.calls.insert(call);
    }

    /// Constructor declarations in the order first seen.
    pub(crate) fn constructors(&self) -> &[DeclId] {
        self.constructors.as_slice()
    }

    /// Constructor calls in the order first seen.
    pub(crate) fn calls(&self) -> &[ExprId] {
        self.calls.as_slice()
    }

    pub(crate) fn declares_trait(&self, record: DeclId) -> bool {
        self.records_with_trait.contains(&record)
    }

    /// Nested trait declaration idiom:
    ///
    /// ```text
    /// class X {
    ///     operator bslalg::TypeTraitUsesBslmaAllocator::
    ///                             NestedTraitDeclaration<X>() const;
    /// };
    /// ```
    pub(crate) fn observe_conversion(
        &mut self,
        id: DeclId,
        conversion: &ConversionDecl,
        unit: &TranslationUnit,
        config: &AllocatorForwardConfig,
    ) {
        let Some(record) = unit
            .get_decl(id)
            .and_then(|decl| decl.context)
            .filter(|&context| unit.record(context).is_some())
        else {
            return;
        };
        let Some(TypeKind::Elaborated { named }) = unit.type_kind(conversion.target.ty) else {
            return;
        };
        let Some(TypeKind::TemplateSpecialization { template, args, .. }) =
            unit.type_kind(named.ty)
        else {
            return;
        };
        if args.len() != 1 || unit.as_record_decl(args[0]) != Some(record) {
            return;
        }
        if unit.qualified_name(*template) == config.nested_trait {
            tracing::trace!(?record, "nested allocator trait");
            self.records_with_trait.insert(record);
        }
    }

    /// Candidate for the specialization idiom:
    ///
    /// ```text
    /// namespace bslma {
    ///     template <> struct UsesBslmaAllocator<X> : bsl::true_type {};
    /// }
    /// ```
    pub(crate) fn observe_specialization(
        &mut self,
        id: DeclId,
        record: &RecordDecl,
        unit: &TranslationUnit,
        config: &AllocatorForwardConfig,
    ) {
        let is_explicit = record
            .specialization
            .as_ref()
            .is_some_and(|spec| spec.is_explicit);
        if is_explicit && unit.qualified_name(id) == config.uses_allocator_trait {
            self.trait_specializations.push(id);
        }
    }

    /// Accept the specialization candidates that are empty, non-local,
    /// derive from the true type and name exactly one record.
    pub(crate) fn resolve_trait_specializations(
        &mut self,
        unit: &TranslationUnit,
        markers: &Markers,
    ) {
        let candidates = std::mem::take(&mut self.trait_specializations);
        let Some(true_record) = markers.true_type_record(unit) else {
            if !candidates.is_empty() {
                tracing::debug!(
                    candidates = candidates.len(),
                    "true type never declared; trait specializations ignored"
                );
            }
            return;
        };

        for id in candidates {
            let Some(record) = unit.record(id) else {
                continue;
            };
            let Some(spec) = &record.specialization else {
                continue;
            };
            if !record.is_empty()
                || record.is_local()
                || !unit.is_derived_from(id, true_record)
                || spec.args.len() != 1
            {
                continue;
            }
            if let Some(arg) = unit.as_record_decl(spec.args[0]) {
                tracing::trace!(record = ?arg, "allocator trait specialization");
                self.records_with_trait.insert(arg);
            }
        }
    }
}
