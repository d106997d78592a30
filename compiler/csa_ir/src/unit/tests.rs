#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use crate::ast::ExprKind;
use crate::{Span, UnitBuilder};

#[test]
fn test_qualified_name_walks_contexts() {
    let mut b = UnitBuilder::new();
    let outer = b.namespace("BloombergLP", None);
    let inner = b.namespace("bslma", Some(outer));
    let rec = b.record("Allocator", Some(inner), Span::DUMMY);
    let anon = b.namespace("", Some(outer));
    let hidden = b.record("Hidden", Some(anon), Span::DUMMY);
    let unit = b.finish().unwrap();

    assert_eq!(unit.qualified_name(rec), "BloombergLP::bslma::Allocator");
    assert_eq!(unit.qualified_name(hidden), "BloombergLP::(anonymous)::Hidden");
}

#[test]
fn test_is_derived_from_is_transitive_and_strict() {
    let mut b = UnitBuilder::new();
    let base = b.record("Base", None, Span::DUMMY);
    let mid = b.record("Mid", None, Span::DUMMY);
    let leaf = b.record("Leaf", None, Span::DUMMY);
    let base_ty = b.record_type(base);
    let mid_ty = b.record_type(mid);
    let alias = b.typedef("MidAlias", None, mid_ty, Span::DUMMY);
    let alias_ty = b.typedef_type(alias);
    b.add_base(mid, base_ty);
    b.add_base(leaf, alias_ty);
    let unit = b.finish().unwrap();

    assert!(unit.is_derived_from(mid, base));
    assert!(unit.is_derived_from(leaf, base));
    assert!(unit.is_derived_from(leaf, mid));
    assert!(!unit.is_derived_from(base, base));
    assert!(!unit.is_derived_from(base, leaf));
}

#[test]
fn test_is_derived_from_tolerates_cycles() {
    let mut b = UnitBuilder::new();
    let a = b.record("A", None, Span::DUMMY);
    let c = b.record("C", None, Span::DUMMY);
    let other = b.record("Other", None, Span::DUMMY);
    let a_ty = b.record_type(a);
    let c_ty = b.record_type(c);
    b.add_base(a, c_ty);
    b.add_base(c, a_ty);
    let unit = b.finish().unwrap();

    assert!(unit.is_derived_from(a, c));
    assert!(!unit.is_derived_from(a, other));
}

#[test]
fn test_pointer_and_reference_queries_see_through_typedefs() {
    let mut b = UnitBuilder::new();
    let rec = b.record("Allocator", None, Span::DUMMY);
    let rec_ty = b.record_type(rec);
    let ptr = b.pointer_to(rec_ty);
    let alias = b.typedef("AllocPtr", None, ptr, Span::DUMMY);
    let alias_ty = b.typedef_type(alias);
    let cref = b.lvalue_ref_to(rec_ty.with_const(true));
    let unit = b.finish().unwrap();

    assert_eq!(unit.pointee(alias_ty), Some(rec_ty));
    assert_eq!(unit.pointee(rec_ty), None);
    assert_eq!(unit.referenced_type(cref), Some(rec_ty.with_const(true)));
    assert_eq!(unit.referenced_type(ptr), None);
}

#[test]
fn test_type_to_string() {
    let mut b = UnitBuilder::new();
    let ns = b.namespace("bslma", None);
    let rec = b.record("Allocator", Some(ns), Span::DUMMY);
    let rec_ty = b.record_type(rec);
    let ptr = b.pointer_to(rec_ty);
    let const_ptr = b.pointer_to(rec_ty.with_const(true));
    let int = b.builtin("int");
    let cref = b.lvalue_ref_to(int.with_const(true));
    let rref = b.rvalue_ref_to(rec_ty);
    let unit = b.finish().unwrap();

    assert_eq!(unit.type_to_string(ptr), "bslma::Allocator *");
    assert_eq!(unit.type_to_string(const_ptr), "const bslma::Allocator *");
    assert_eq!(unit.type_to_string(cref), "const int &");
    assert_eq!(unit.type_to_string(rref), "bslma::Allocator &&");
    assert_eq!(unit.type_to_string(ptr.with_const(true)), "bslma::Allocator *const");
}

#[test]
fn test_ignore_implicit_casts() {
    let mut b = UnitBuilder::new();
    let int = b.builtin("int");
    let lit = b.expr(ExprKind::IntegerLiteral(1), int, Span::new(0, 1));
    let cast1 = b.implicit_cast(lit, int);
    let cast2 = b.implicit_cast(cast1, int);
    let unit = b.finish().unwrap();

    assert_eq!(unit.ignore_implicit_casts(cast2), lit);
    assert_eq!(unit.ignore_implicit_casts(lit), lit);
    assert_eq!(unit.expr_span(cast2), Span::new(0, 1));
}

#[test]
fn test_snippet() {
    let with_source = UnitBuilder::new()
        .with_source("a.cpp", "Widget w(&ta);")
        .finish()
        .unwrap();
    assert_eq!(with_source.snippet(Span::new(9, 12)), Some("&ta"));
    assert_eq!(with_source.snippet(Span::DUMMY), None);
    assert_eq!(with_source.snippet(Span::new(9, 40)), None);

    let without = UnitBuilder::new().finish().unwrap();
    assert_eq!(without.snippet(Span::new(0, 3)), None);
}
