//! Declaration and expression nodes of a translation unit.
//!
//! Flat, arena-indexed: nodes refer to each other by `DeclId`/`ExprId`,
//! never by reference.

mod decl;
mod expr;

pub use decl::{
    Access, ConstructorDecl, ConversionDecl, CtorFlags, Decl, DeclKind, FieldDecl,
    ImplicitCtorKind, InitTarget, Initializer, ParamDecl, RecordDecl, RecordFlags,
    Specialization, TypedefDecl,
};
pub use expr::{Expr, ExprKind};
