#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use csa_ir::{QualType, Span, TranslationUnit, TypeId};

use super::*;
use crate::test_support::{Fixture, DEFINED};

fn allocator_of(unit: &TranslationUnit, alloc_ptr: QualType) -> Option<TypeId> {
    unit.pointee(alloc_ptr).map(|ty| unit.canonical(ty).ty)
}

#[test]
fn test_is_allocator_sees_through_spelling() {
    let mut f = Fixture::new();
    let alloc_ptr = f.alloc_ptr;
    let alloc = f.b.unit().pointee(alloc_ptr).unwrap();
    let typedef = f.b.typedef("AllocPtr", None, alloc_ptr, Span::DUMMY);
    let typedef_ty = f.b.typedef_type(typedef);
    let const_pointee = f.b.pointer_to(alloc.with_const(true));
    let int = f.int;
    let int_ptr = f.b.pointer_to(int);
    let unit = f.finish();

    let mut cache = AffinityCache::default();
    let oracle = Oracle::new(&unit, allocator_of(&unit, alloc_ptr), &mut cache);
    assert!(oracle.is_allocator(alloc_ptr));
    assert!(oracle.is_allocator(typedef_ty));
    assert!(oracle.is_allocator(const_pointee));
    assert!(!oracle.is_allocator(alloc));
    assert!(!oracle.is_allocator(int_ptr));
}

#[test]
fn test_nothing_is_an_allocator_without_the_marker() {
    let f = Fixture::new();
    let alloc_ptr = f.alloc_ptr;
    let unit = f.finish();

    let mut cache = AffinityCache::default();
    let oracle = Oracle::new(&unit, None, &mut cache);
    assert!(!oracle.is_allocator(alloc_ptr));
}

#[test]
fn test_constructor_with_trailing_allocator() {
    let mut f = Fixture::new();
    let aware = f.alloc_aware("Aware");
    let (plain, _) = f.record("Plain");
    let no_params = f.ctor(plain, DEFINED);
    let int_ctor = f.ctor(plain, DEFINED);
    let int = f.int;
    f.param(int_ctor, "x", int);
    let alloc_ptr = f.alloc_ptr;
    let unit = f.finish();

    let mut cache = AffinityCache::default();
    let mut oracle = Oracle::new(&unit, allocator_of(&unit, alloc_ptr), &mut cache);
    assert!(oracle.constructor_takes_allocator(aware.ctor, false));
    assert!(oracle.constructor_takes_allocator(aware.ctor, true));
    assert!(!oracle.constructor_takes_allocator(no_params, true));
    assert!(!oracle.constructor_takes_allocator(int_ctor, true));
    assert!(oracle.type_takes_allocator(aware.ty, true));
    assert!(!oracle.type_takes_allocator(int, true));
}

#[test]
fn test_const_reference_conversion_is_one_level_deep() {
    // C(Allocator*), B(const C&), A(const B&)
    let mut f = Fixture::new();
    let c = f.alloc_aware("C");
    let (b, b_ty) = f.record("B");
    let b_ctor = f.ctor(b, DEFINED);
    let const_c = f.b.lvalue_ref_to(c.ty.with_const(true));
    f.param(b_ctor, "c", const_c);
    let (a, _) = f.record("A");
    let a_ctor = f.ctor(a, DEFINED);
    let const_b = f.b.lvalue_ref_to(b_ty.with_const(true));
    f.param(a_ctor, "b", const_b);
    let alloc_ptr = f.alloc_ptr;
    let unit = f.finish();

    let mut cache = AffinityCache::default();
    let mut oracle = Oracle::new(&unit, allocator_of(&unit, alloc_ptr), &mut cache);
    assert!(oracle.constructor_takes_allocator(b_ctor, true));
    assert!(!oracle.constructor_takes_allocator(b_ctor, false));
    assert!(!oracle.constructor_takes_allocator(a_ctor, true));
    assert!(oracle.type_takes_allocator(b_ty, true));
    assert!(!oracle.type_takes_allocator(b_ty, false));
}

#[test]
fn test_non_const_reference_does_not_convert() {
    let mut f = Fixture::new();
    let c = f.alloc_aware("C");
    let (b, _) = f.record("B");
    let by_ref = f.ctor(b, DEFINED);
    let c_ref = f.b.lvalue_ref_to(c.ty);
    f.param(by_ref, "c", c_ref);
    let by_rvalue = f.ctor(b, DEFINED);
    let c_rvalue = f.b.rvalue_ref_to(c.ty.with_const(true));
    f.param(by_rvalue, "c", c_rvalue);
    let alloc_ptr = f.alloc_ptr;
    let unit = f.finish();

    let mut cache = AffinityCache::default();
    let mut oracle = Oracle::new(&unit, allocator_of(&unit, alloc_ptr), &mut cache);
    assert!(!oracle.constructor_takes_allocator(by_ref, true));
    // A const rvalue reference is still a const reference.
    assert!(oracle.constructor_takes_allocator(by_rvalue, true));
}

#[test]
fn test_template_spellings_resolve_to_the_record() {
    let mut f = Fixture::new();
    let aware = f.alloc_aware("Aware");
    let template = f.b.class_template("Wrapper", None, Span::DUMMY);
    let spelled = f.b.template_specialization(template, &[], Some(aware.ty));
    let substituted = f.b.substituted(aware.ty);
    let elaborated = f.b.elaborated(spelled);
    let dependent = f.b.template_specialization(template, &[aware.ty], None);
    let alloc_ptr = f.alloc_ptr;
    let unit = f.finish();

    let mut cache = AffinityCache::default();
    let mut oracle = Oracle::new(&unit, allocator_of(&unit, alloc_ptr), &mut cache);
    assert_eq!(oracle.record_decl_of(spelled), Some(aware.record));
    assert_eq!(oracle.record_decl_of(substituted), Some(aware.record));
    assert_eq!(oracle.record_decl_of(dependent), None);
    assert!(oracle.type_takes_allocator(spelled, false));
    assert!(oracle.type_takes_allocator(substituted, false));
    assert!(oracle.type_takes_allocator(elaborated, false));
    assert!(!oracle.type_takes_allocator(dependent, true));
}

#[test]
fn test_mutually_referencing_types_terminate() {
    // A(const B&), B(const A&), S(const S&)
    let mut f = Fixture::new();
    let (a, a_ty) = f.record("A");
    let (b, b_ty) = f.record("B");
    let (s, s_ty) = f.record("S");
    let a_ctor = f.ctor(a, DEFINED);
    let b_ctor = f.ctor(b, DEFINED);
    let s_ctor = f.ctor(s, DEFINED);
    let const_a = f.b.lvalue_ref_to(a_ty.with_const(true));
    let const_b = f.b.lvalue_ref_to(b_ty.with_const(true));
    let const_s = f.b.lvalue_ref_to(s_ty.with_const(true));
    f.param(a_ctor, "b", const_b);
    f.param(b_ctor, "a", const_a);
    f.param(s_ctor, "s", const_s);
    let alloc_ptr = f.alloc_ptr;
    let unit = f.finish();

    let mut cache = AffinityCache::default();
    let mut oracle = Oracle::new(&unit, allocator_of(&unit, alloc_ptr), &mut cache);
    assert!(!oracle.type_takes_allocator(a_ty, true));
    assert!(!oracle.type_takes_allocator(b_ty, true));
    assert!(!oracle.type_takes_allocator(s_ty, true));
}

#[test]
fn test_repeated_queries_hit_the_cache() {
    let mut f = Fixture::new();
    let aware = f.alloc_aware("Aware");
    let (holder, holder_ty) = f.record("Holder");
    let ctor = f.ctor(holder, DEFINED);
    let const_aware = f.b.lvalue_ref_to(aware.ty.with_const(true));
    f.param(ctor, "a", const_aware);
    let alloc_ptr = f.alloc_ptr;
    let unit = f.finish();

    let mut cache = AffinityCache::default();
    let allocator = allocator_of(&unit, alloc_ptr);
    let first = Oracle::new(&unit, allocator, &mut cache).type_takes_allocator(holder_ty, true);
    let filled = cache.len();

    let mut oracle = Oracle::new(&unit, allocator, &mut cache);
    for _ in 0..3 {
        assert_eq!(oracle.type_takes_allocator(holder_ty, true), first);
    }
    assert!(first);
    assert_eq!(cache.len(), filled);
}

mod proptest_affinity {
    use proptest::prelude::*;

    use csa_ir::ast::CtorFlags;
    use csa_ir::{DeclId, QualType, TranslationUnit};

    use super::super::{AffinityCache, Oracle};
    use super::allocator_of;
    use crate::test_support::Fixture;

    /// Last parameter of a generated constructor.
    #[derive(Copy, Clone, Debug)]
    enum Last {
        Nothing,
        Allocator,
        Int,
        ConstRef(usize),
        MutRef(usize),
    }

    fn last_param() -> impl Strategy<Value = Last> {
        prop_oneof![
            Just(Last::Nothing),
            Just(Last::Allocator),
            Just(Last::Int),
            (0usize..6).prop_map(Last::ConstRef),
            (0usize..6).prop_map(Last::MutRef),
        ]
    }

    /// Records and their constructors, described by last parameter only.
    fn graph() -> impl Strategy<Value = Vec<Vec<Last>>> {
        proptest::collection::vec(proptest::collection::vec(last_param(), 0..4), 1..6)
    }

    struct Built {
        unit: TranslationUnit,
        alloc_ptr: QualType,
        types: Vec<QualType>,
        ctors: Vec<Vec<DeclId>>,
    }

    fn build(graph: &[Vec<Last>]) -> Built {
        let mut f = Fixture::new();
        let records: Vec<_> = (0..graph.len())
            .map(|i| f.record(&format!("R{i}")))
            .collect();
        let mut ctors = Vec::new();
        for (i, lasts) in graph.iter().enumerate() {
            let mut ids = Vec::new();
            for last in lasts {
                let ctor = f.ctor(records[i].0, CtorFlags::USER_PROVIDED);
                let ty = match *last {
                    Last::Nothing => None,
                    Last::Allocator => Some(f.alloc_ptr),
                    Last::Int => Some(f.int),
                    Last::ConstRef(k) => {
                        let target = records[k % records.len()].1.with_const(true);
                        Some(f.b.lvalue_ref_to(target))
                    }
                    Last::MutRef(k) => {
                        let target = records[k % records.len()].1;
                        Some(f.b.lvalue_ref_to(target))
                    }
                };
                if let Some(ty) = ty {
                    f.param(ctor, "p", ty);
                }
                ids.push(ctor);
            }
            ctors.push(ids);
        }
        let alloc_ptr = f.alloc_ptr;
        Built {
            unit: f.finish(),
            alloc_ptr,
            types: records.iter().map(|r| r.1).collect(),
            ctors,
        }
    }

    fn reference_ctor(graph: &[Vec<Last>], last: Last, conv: bool) -> bool {
        match last {
            Last::Allocator => true,
            Last::ConstRef(k) if conv => reference_type(graph, k % graph.len(), false),
            _ => false,
        }
    }

    fn reference_type(graph: &[Vec<Last>], record: usize, conv: bool) -> bool {
        graph[record]
            .iter()
            .any(|&last| reference_ctor(graph, last, conv))
    }

    proptest! {
        #[test]
        fn affinity_matches_unmemoized_reference(graph in graph(), reverse in any::<bool>()) {
            let built = build(&graph);
            let unit = &built.unit;
            let mut cache = AffinityCache::default();
            let mut oracle = Oracle::new(unit, allocator_of(unit, built.alloc_ptr), &mut cache);

            let mut queries: Vec<(usize, bool)> = (0..graph.len())
                .flat_map(|i| [(i, false), (i, true)])
                .collect();
            if reverse {
                queries.reverse();
            }
            for (i, conv) in queries {
                prop_assert_eq!(
                    oracle.type_takes_allocator(built.types[i], conv),
                    reference_type(&graph, i, conv)
                );
                for (ctor, &last) in built.ctors[i].iter().zip(&graph[i]) {
                    prop_assert_eq!(
                        oracle.constructor_takes_allocator(*ctor, conv),
                        reference_ctor(&graph, last, conv)
                    );
                }
            }
        }

        #[test]
        fn affinity_is_idempotent(graph in graph()) {
            let built = build(&graph);
            let unit = &built.unit;
            let mut cache = AffinityCache::default();
            let mut oracle = Oracle::new(unit, allocator_of(unit, built.alloc_ptr), &mut cache);

            let first: Vec<bool> = built
                .types
                .iter()
                .map(|&ty| oracle.type_takes_allocator(ty, true))
                .collect();
            let second: Vec<bool> = built
                .types
                .iter()
                .map(|&ty| oracle.type_takes_allocator(ty, true))
                .collect();
            prop_assert_eq!(first, second);
        }
    }
}
