#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use csa_checks::{check_unit, CheckConfig};
use csa_ir::ast::{Access, CtorFlags, ExprKind, InitTarget, RecordFlags};

use super::*;

const WIDGET: &str = include_str!("../../tests/fixtures/widget.json");

fn load(json: &str) -> Result<TranslationUnit, LoadError> {
    parse_unit(json, "unit.json")
}

#[test]
fn test_widget_dump_builds_unit() {
    let unit = load(WIDGET).expect("fixture loads");

    assert_eq!(unit.path(), Some("widget.cpp"));
    assert!(unit.source().is_some_and(|s| s.contains("struct Widget")));
    assert_eq!(unit.decl_count(), 10);
    assert_eq!(unit.expr_count(), 4);
    assert_eq!(
        unit.qualified_name(DeclId::new(2)),
        "BloombergLP::bslma::Allocator"
    );

    let ctor = unit.constructor(DeclId::new(8)).expect("constructor");
    assert_eq!(ctor.params.as_slice(), &[DeclId::new(9)]);
    assert_eq!(
        ctor.flags,
        CtorFlags::HAS_BODY | CtorFlags::USER_PROVIDED | CtorFlags::DEFAULT_CTOR
    );
    assert_eq!(ctor.inits.len(), 1);
    assert_eq!(ctor.inits[0].target, InitTarget::Member(DeclId::new(7)));
    assert!(!ctor.inits[0].is_written);

    let param = unit.param(DeclId::new(9)).expect("parameter");
    assert_eq!(
        unit.type_to_string(param.ty),
        "BloombergLP::bslma::Allocator *"
    );
    assert_eq!(param.default_arg, Some(ExprId::new(1)));
    assert_eq!(unit.decl_span(DeclId::new(9)), Span::new(210, 239));
}

#[test]
fn test_widget_dump_reports_findings_in_source_order() {
    let unit = load(WIDGET).expect("fixture loads");
    let result = check_unit(&unit, &CheckConfig::default());

    let messages: Vec<String> = result
        .diagnostics
        .iter()
        .map(|d| format!("{}: {}", d.code, d.message))
        .collect();
    assert_eq!(
        messages,
        vec![
            "MA02: Class 'Field' uses allocators but does not declare the \
             TypeTraitUsesBslmaAllocator trait"
                .to_string(),
            "MA02: Class 'Widget' uses allocators but does not declare the \
             TypeTraitUsesBslmaAllocator trait"
                .to_string(),
            "MA01: Allocator not passed to member 'd_field'".to_string(),
        ]
    );
    // Implicit initialization is reported at the allocator parameter.
    assert_eq!(
        result.diagnostics[2].primary_span(),
        Some(Span::new(210, 239))
    );
}

#[test]
fn test_path_falls_back_to_origin() {
    let unit = load(r#"{ "nodes": [] }"#).expect("empty dump loads");
    assert_eq!(unit.path(), Some("unit.json"));
    assert_eq!(unit.source(), None);
    assert_eq!(unit.decl_count(), 0);
}

#[test]
fn test_sugar_and_qualifier_nodes() {
    let json = r#"{ "nodes": [
        { "node": "builtin", "name": "int" },
        { "node": "const", "of": 0 },
        { "node": "lvalue_ref", "to": 1 },
        { "node": "rvalue_ref", "to": 0 },
        { "node": "namespace", "name": "bsl" },
        { "node": "typedef", "name": "size_type", "context": 0, "underlying": 0 },
        { "node": "typedef_type", "decl": 1 },
        { "node": "elaborated", "named": 4 },
        { "node": "substituted", "replacement": 5 },
        { "node": "typedef", "name": "cref", "underlying": 2 },
        { "node": "typedef", "name": "rref", "underlying": 3 },
        { "node": "typedef", "name": "spelled", "underlying": 6 }
    ] }"#;
    let unit = load(json).expect("dump loads");
    let underlying = |id: u32| unit.typedef(DeclId::new(id)).expect("typedef").underlying;

    assert_eq!(unit.type_to_string(underlying(2)), "const int &");
    assert_eq!(unit.type_to_string(underlying(3)), "int &&");
    let spelled = underlying(4);
    assert_eq!(unit.type_to_string(spelled), "bsl::size_type");
    assert_eq!(unit.canonical(spelled), underlying(1));
}

#[test]
fn test_declaration_details() {
    let json = r#"{ "nodes": [
        { "node": "record", "name": "Local", "flags": ["local", "empty"] },
        { "node": "record_type", "decl": 0 },
        { "node": "lvalue_ref", "to": 0 },
        { "node": "const", "of": 0 },
        { "node": "lvalue_ref", "to": 2 },
        { "node": "constructor", "record": 0, "access": "private",
          "flags": ["copy", "user_provided"], "span": [5, 9] },
        { "node": "param", "ctor": 1, "ty": 3, "written_ty": 1 },
        { "node": "redeclaration", "canonical": 1, "flags": ["has_body"], "span": [20, 30] },
        { "node": "param", "ctor": 3, "name": "other", "ty": 3 }
    ] }"#;
    let unit = load(json).expect("dump loads");

    let record = unit.record(DeclId::new(0)).expect("record");
    assert_eq!(record.flags, RecordFlags::LOCAL | RecordFlags::EMPTY);
    assert_eq!(record.ctors.as_slice(), &[DeclId::new(1)]);

    let first = unit.constructor(DeclId::new(1)).expect("constructor");
    assert_eq!(first.access, Access::Private);
    assert_eq!(first.flags, CtorFlags::COPY_CTOR | CtorFlags::USER_PROVIDED);

    let unnamed = unit.param(DeclId::new(2)).expect("parameter");
    assert_eq!(unit.name(DeclId::new(2)), "");
    assert_eq!(unit.type_to_string(unnamed.ty), "const Local &");
    assert_eq!(unit.type_to_string(unnamed.original_ty), "Local &");

    let definition = unit.constructor(DeclId::new(3)).expect("redeclaration");
    assert_eq!(definition.canonical, DeclId::new(1));
    assert_eq!(definition.access, Access::Private);
    assert!(unit.has_body(DeclId::new(1)));
}

#[test]
fn test_expression_nodes() {
    let json = r#"{ "nodes": [
        { "node": "builtin", "name": "int" },
        { "node": "record", "name": "R" },
        { "node": "record_type", "decl": 0 },
        { "node": "constructor", "record": 0 },
        { "node": "param", "ctor": 1, "name": "n", "ty": 0 },
        { "node": "integer", "value": 7, "ty": 0, "span": [1, 2] },
        { "node": "cast", "sub": 0, "ty": 0 },
        { "node": "construct", "ctor": 1, "args": [1], "ty": 1, "span": [0, 4] },
        { "node": "bind", "sub": 2, "ty": 1, "span": [0, 4] },
        { "node": "materialize", "sub": 3, "ty": 1, "span": [0, 4] },
        { "node": "decl_ref", "decl": 2, "ty": 0 },
        { "node": "opaque", "ty": 0 },
        { "node": "statement", "expr": 4 }
    ] }"#;
    let unit = load(json).expect("dump loads");

    assert_eq!(unit.expr(ExprId::new(0)).kind, ExprKind::IntegerLiteral(7));
    assert_eq!(
        unit.expr(ExprId::new(1)).kind,
        ExprKind::ImplicitCast(ExprId::new(0))
    );
    assert_eq!(unit.expr_span(ExprId::new(1)), Span::new(1, 2));
    assert_eq!(
        unit.expr(ExprId::new(4)).kind,
        ExprKind::MaterializeTemporary(ExprId::new(3))
    );
    assert_eq!(unit.expr(ExprId::new(5)).kind, ExprKind::DeclRef(DeclId::new(2)));
    assert_eq!(unit.statements(), &[ExprId::new(4)]);
}

#[test]
fn test_forward_reference_is_rejected() {
    let json = r#"{ "nodes": [
        { "node": "namespace", "name": "a" },
        { "node": "namespace", "name": "b", "context": 5 }
    ] }"#;
    let error = load(json).expect_err("dangling context");

    match error {
        LoadError::Node { path, node, error } => {
            assert_eq!(path, "unit.json");
            assert_eq!(node, 1);
            assert_eq!(
                error,
                NodeError::Undefined {
                    family: "declaration",
                    index: 5
                }
            );
        }
        other => panic!("expected a node error, got {other:?}"),
    }
}

#[test]
fn test_initializer_needs_one_target() {
    let json = r#"{ "nodes": [
        { "node": "builtin", "name": "int" },
        { "node": "record", "name": "R" },
        { "node": "field", "record": 0, "name": "d_n", "ty": 0 },
        { "node": "constructor", "record": 0 },
        { "node": "opaque", "ty": 0 },
        { "node": "initializer", "ctor": 2, "init": 0 }
    ] }"#;
    let error = load(json).expect_err("no target");
    assert_eq!(
        error.to_string(),
        "'unit.json': node 5 must initialize exactly one of `base` or `member`"
    );
}

#[test]
fn test_wrong_declaration_kind_is_a_build_error() {
    // A field whose owner is a namespace.
    let json = r#"{ "nodes": [
        { "node": "builtin", "name": "int" },
        { "node": "namespace", "name": "ns" },
        { "node": "field", "record": 0, "name": "d_n", "ty": 0 }
    ] }"#;
    let error = load(json).expect_err("wrong kind");
    assert!(
        matches!(
            error,
            LoadError::Build {
                source: BuildError::WrongDeclKind { id: 0, .. },
                ..
            }
        ),
        "{error:?}"
    );
}

#[test]
fn test_malformed_json() {
    for json in [
        "{",
        r#"{ "nodes": [ { "node": "lambda" } ] }"#,
        r#"{ "nodes": [], "extra": true }"#,
        r#"{ "nodes": [ { "node": "pointer" } ] }"#,
    ] {
        let error = load(json).expect_err(json);
        assert!(matches!(error, LoadError::Json { .. }), "{json}: {error:?}");
    }
}

#[test]
fn test_missing_file() {
    let error = load_unit(Path::new("/nonexistent/unit.json")).expect_err("no such file");
    assert!(matches!(error, LoadError::Io { .. }), "{error:?}");
    assert!(error.to_string().starts_with("cannot read '/nonexistent/unit.json'"));
}
