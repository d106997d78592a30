//! CSA IR - translation-unit model for source analysis checks.
//!
//! This crate is the provider side of the checks: an already-parsed,
//! already-resolved C++ translation unit and the semantic queries over it.
//! - Spans for source locations
//! - Names for interned identifiers
//! - Hash-consed types with canonical forms
//! - Declaration and expression arenas
//! - A builder for assembling units and a visitor for walking them
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings -> Name(u32), Types -> TypeId(u32)
//! - **Flatten Everything**: no boxed trees, nodes refer to each other by id
//! - **Total Queries**: wrong-kind or unknown ids yield `None`, not panics

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod builder;
mod ids;
mod interner;
mod name;
mod span;
pub mod stack;
pub mod types;
mod unit;
pub mod visitor;

pub use builder::{BuildError, UnitBuilder};
pub use ids::{DeclId, ExprId, TypeId};
pub use interner::StringInterner;
pub use name::Name;
pub use span::{Span, Spanned};
pub use types::{QualType, TypeKind};
pub use unit::TranslationUnit;
