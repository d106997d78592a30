//! Translation-unit traversal.
//!
//! Provides generic traversal of a [`TranslationUnit`]. Declarations are
//! visited once each, in declaration order. Expressions are visited from the
//! place they occur: constructor initializers, parameter default arguments
//! and statements. An expression shared by two occurrences is visited twice.
//!
//! Default implementations call `walk_*` functions that traverse children.
//! Override `visit_*` methods to add custom behavior at specific nodes.
//!
//! # Example
//!
//! ```text
//! struct CountConstructs {
//!     count: usize,
//! }
//!
//! impl<'u> Visitor<'u> for CountConstructs {
//!     fn visit_construct_expr(&mut self, id: ExprId, args: &'u [ExprId], unit: &'u TranslationUnit) {
//!         self.count += 1;
//!         walk_construct_args(self, args, unit);
//!     }
//! }
//! ```

use crate::ast::{
    ConstructorDecl, ConversionDecl, DeclKind, ExprKind, ParamDecl, RecordDecl, TypedefDecl,
};
use crate::stack::ensure_sufficient_stack;
use crate::{DeclId, ExprId, TranslationUnit};

// Visitor Trait

/// Translation-unit visitor.
///
/// The visitor can mutate its own state during traversal.
/// The unit itself remains immutable.
pub trait Visitor<'u> {
    fn visit_decl(&mut self, id: DeclId, unit: &'u TranslationUnit) {
        walk_decl(self, id, unit);
    }

    /// Records, including class-template specializations.
    fn visit_record(&mut self, _id: DeclId, _record: &'u RecordDecl, _unit: &'u TranslationUnit) {}

    fn visit_typedef(
        &mut self,
        _id: DeclId,
        _typedef: &'u TypedefDecl,
        _unit: &'u TranslationUnit,
    ) {
    }

    fn visit_constructor(
        &mut self,
        _id: DeclId,
        ctor: &'u ConstructorDecl,
        unit: &'u TranslationUnit,
    ) {
        walk_constructor(self, ctor, unit);
    }

    fn visit_param(&mut self, _id: DeclId, param: &'u ParamDecl, unit: &'u TranslationUnit) {
        walk_param(self, param, unit);
    }

    fn visit_conversion(
        &mut self,
        _id: DeclId,
        _conversion: &'u ConversionDecl,
        _unit: &'u TranslationUnit,
    ) {
    }

    fn visit_expr(&mut self, id: ExprId, unit: &'u TranslationUnit) {
        walk_expr(self, id, unit);
    }

    /// A constructor call. `id` is the construct expression itself.
    fn visit_construct_expr(
        &mut self,
        _id: ExprId,
        args: &'u [ExprId],
        unit: &'u TranslationUnit,
    ) {
        walk_construct_args(self, args, unit);
    }
}

// Walk Functions

/// Visit every declaration, then every statement-level expression.
pub fn walk_unit<'u, V: Visitor<'u> + ?Sized>(visitor: &mut V, unit: &'u TranslationUnit) {
    for id in unit.decl_ids() {
        visitor.visit_decl(id, unit);
    }
    for &expr in unit.statements() {
        visitor.visit_expr(expr, unit);
    }
}

pub fn walk_decl<'u, V: Visitor<'u> + ?Sized>(
    visitor: &mut V,
    id: DeclId,
    unit: &'u TranslationUnit,
) {
    match &unit.decl(id).kind {
        DeclKind::Record(record) => visitor.visit_record(id, record, unit),
        DeclKind::Typedef(typedef) => visitor.visit_typedef(id, typedef, unit),
        DeclKind::Constructor(ctor) => visitor.visit_constructor(id, ctor, unit),
        DeclKind::Parameter(param) => visitor.visit_param(id, param, unit),
        DeclKind::Conversion(conversion) => visitor.visit_conversion(id, conversion, unit),
        DeclKind::Namespace | DeclKind::ClassTemplate | DeclKind::Field(_) => {}
    }
}

/// Visit the initializer expressions of a constructor.
///
/// Parameters are declarations in their own right and are reached
/// through [`walk_unit`], not from here.
pub fn walk_constructor<'u, V: Visitor<'u> + ?Sized>(
    visitor: &mut V,
    ctor: &'u ConstructorDecl,
    unit: &'u TranslationUnit,
) {
    for init in &ctor.inits {
        visitor.visit_expr(init.init, unit);
    }
}

pub fn walk_param<'u, V: Visitor<'u> + ?Sized>(
    visitor: &mut V,
    param: &'u ParamDecl,
    unit: &'u TranslationUnit,
) {
    if let Some(default) = param.default_arg {
        visitor.visit_expr(default, unit);
    }
}

/// Dispatch on the expression kind and visit children.
///
/// A `DefaultArgument` does not revisit the parameter's default
/// expression; that is visited once, at the parameter.
pub fn walk_expr<'u, V: Visitor<'u> + ?Sized>(
    visitor: &mut V,
    id: ExprId,
    unit: &'u TranslationUnit,
) {
    ensure_sufficient_stack(|| match &unit.expr(id).kind {
        ExprKind::Construct { args, .. } => visitor.visit_construct_expr(id, args, unit),
        ExprKind::MaterializeTemporary(sub)
        | ExprKind::BindTemporary(sub)
        | ExprKind::ImplicitCast(sub) => visitor.visit_expr(*sub, unit),
        ExprKind::DefaultArgument(_)
        | ExprKind::DeclRef(_)
        | ExprKind::IntegerLiteral(_)
        | ExprKind::NullPointer
        | ExprKind::Opaque => {}
    });
}

pub fn walk_construct_args<'u, V: Visitor<'u> + ?Sized>(
    visitor: &mut V,
    args: &'u [ExprId],
    unit: &'u TranslationUnit,
) {
    for &arg in args {
        visitor.visit_expr(arg, unit);
    }
}
