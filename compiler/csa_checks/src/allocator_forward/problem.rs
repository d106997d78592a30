//! Findings of the allocator checks and their rendering.

use csa_diagnostic::{Diagnostic, DiagnosticArg, ErrorCode};
use csa_ir::ast::ImplicitCtorKind;
use csa_ir::{DeclId, ExprId, QualType, Span, TranslationUnit};

const NOT_PASSED_TO_BASE: &str = "Allocator not passed to base %0";
const NOT_PASSED_TO_MEMBER: &str = "Allocator not passed to member %0";
const TRAIT_UNUSED: &str =
    "Class %0 does not use allocators but declares the TypeTraitUsesBslmaAllocator trait";
const TRAIT_MISSING: &str =
    "Class %0 uses allocators but does not declare the TypeTraitUsesBslmaAllocator trait";
const NO_ALLOCATOR_OVERLOAD: &str =
    "This constructor has no version that can be called with an allocator.";
const IMPLICIT_DEFAULT: &str = "Implicit default constructor cannot be called with an allocator";
const IMPLICIT_COPY: &str = "Implicit copy constructor cannot be called with an allocator";
const IMPLICIT_OTHER: &str = "Implicit constructor cannot be called with an allocator";
const MISROUTED: &str = "Allocator argument initializes non-allocator %0 of type '%1' \
                         rather than allocator %2";

/// A defect found by the allocator checks.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AllocatorProblem {
    /// An allocator-taking constructor builds an allocator-aware base
    /// without passing its allocator.
    BaseNotForwarded {
        location: Span,
        range: Span,
        /// Canonical base type.
        base: QualType,
    },

    /// Same, for a member.
    MemberNotForwarded {
        location: Span,
        range: Span,
        member: DeclId,
    },

    TraitDeclaredButUnused { record: DeclId },

    TraitMissing { record: DeclId },

    /// A user-provided constructor of an allocator-aware class with no
    /// allocator-taking counterpart.
    NoAllocatorOverload { ctor: DeclId },

    /// A compiler-synthesized constructor of an allocator-aware class with
    /// no allocator-taking counterpart.
    ImplicitCtorWithoutAllocator {
        ctor: DeclId,
        kind: ImplicitCtorKind,
    },

    /// An allocator argument converted into the parameter before the
    /// defaulted allocator parameter.
    MisroutedAllocator {
        /// Innermost argument expression, typed as an allocator pointer.
        arg: ExprId,
        ctor: DeclId,
        wrong_param: DeclId,
        alloc_param: DeclId,
    },
}

impl AllocatorProblem {
    pub fn code(&self) -> ErrorCode {
        match self {
            AllocatorProblem::BaseNotForwarded { .. }
            | AllocatorProblem::MemberNotForwarded { .. } => ErrorCode::MA01,
            AllocatorProblem::TraitDeclaredButUnused { .. }
            | AllocatorProblem::TraitMissing { .. }
            | AllocatorProblem::MisroutedAllocator { .. } => ErrorCode::MA02,
            AllocatorProblem::NoAllocatorOverload { .. }
            | AllocatorProblem::ImplicitCtorWithoutAllocator { .. } => ErrorCode::MA04,
        }
    }

    /// Where the finding is reported.
    pub fn span(&self, unit: &TranslationUnit) -> Span {
        match self {
            AllocatorProblem::BaseNotForwarded { location, .. }
            | AllocatorProblem::MemberNotForwarded { location, .. } => *location,
            AllocatorProblem::TraitDeclaredButUnused { record }
            | AllocatorProblem::TraitMissing { record } => unit.decl_span(*record),
            AllocatorProblem::NoAllocatorOverload { ctor } => unit.decl_span(*ctor),
            // Synthesized constructors have no location of their own.
            AllocatorProblem::ImplicitCtorWithoutAllocator { ctor, .. } => {
                match unit.decl_span(*ctor) {
                    Span::DUMMY => unit
                        .constructor(*ctor)
                        .map_or(Span::DUMMY, |c| unit.decl_span(c.record)),
                    span => span,
                }
            }
            AllocatorProblem::MisroutedAllocator { arg, .. } => unit.expr_span(*arg),
        }
    }

    /// Render as a warning.
    #[cold]
    pub fn into_diagnostic(&self, unit: &TranslationUnit) -> Diagnostic {
        let span = self.span(unit);
        let diag = Diagnostic::warning(self.code());
        match self {
            AllocatorProblem::BaseNotForwarded { range, base, .. } => diag
                .with_template(
                    NOT_PASSED_TO_BASE,
                    vec![DiagnosticArg::Type(unit.type_to_string(*base))],
                )
                .with_label(span, "constructed without the allocator")
                .with_range(*range),

            AllocatorProblem::MemberNotForwarded { range, member, .. } => diag
                .with_template(
                    NOT_PASSED_TO_MEMBER,
                    vec![DiagnosticArg::Decl(unit.name(*member).to_string())],
                )
                .with_label(span, "constructed without the allocator")
                .with_range(*range),

            AllocatorProblem::TraitDeclaredButUnused { record } => diag
                .with_template(TRAIT_UNUSED, vec![decl_arg(unit, *record)])
                .with_label(span, "no constructor forwards an allocator"),

            AllocatorProblem::TraitMissing { record } => diag
                .with_template(TRAIT_MISSING, vec![decl_arg(unit, *record)])
                .with_label(span, "declared here")
                .with_note(
                    "declare the trait with `BSLMF_NESTED_TRAIT_DECLARATION` \
                     or specialize `bslma::UsesBslmaAllocator`",
                ),

            AllocatorProblem::NoAllocatorOverload { ctor } => diag
                .with_template(NO_ALLOCATOR_OVERLOAD, vec![decl_arg(unit, *ctor)])
                .with_label(span, "add an overload taking a trailing allocator"),

            AllocatorProblem::ImplicitCtorWithoutAllocator { ctor, kind } => {
                let template = match kind {
                    ImplicitCtorKind::Default => IMPLICIT_DEFAULT,
                    ImplicitCtorKind::Copy => IMPLICIT_COPY,
                    ImplicitCtorKind::Other => IMPLICIT_OTHER,
                };
                diag.with_template(template, vec![decl_arg(unit, *ctor)])
                    .with_label(span, "implicitly declared")
            }

            AllocatorProblem::MisroutedAllocator {
                wrong_param,
                alloc_param,
                ..
            } => {
                let wrong_ty = unit
                    .param(*wrong_param)
                    .map_or_else(String::new, |p| unit.type_to_string(p.ty));
                let mut args = vec![
                    DiagnosticArg::Text(param_label(unit, *wrong_param)),
                    DiagnosticArg::Text(wrong_ty),
                    DiagnosticArg::Text(param_label(unit, *alloc_param)),
                ];
                // The argument as written, when the unit carries its source.
                if let Some(text) = unit.snippet(span) {
                    args.push(DiagnosticArg::Expr(text.to_string()));
                }
                let mut diag = diag
                    .with_template(MISROUTED, args)
                    .with_label(span, "allocator passed here")
                    .with_range(span);
                let alloc_span = unit.decl_span(*alloc_param);
                if alloc_span != Span::DUMMY {
                    diag = diag.with_secondary_label(alloc_span, "allocator parameter");
                }
                diag
            }
        }
    }
}

fn decl_arg(unit: &TranslationUnit, decl: DeclId) -> DiagnosticArg {
    DiagnosticArg::Decl(unit.name(decl).to_string())
}

/// `parameter N ('name')`, 1-based, name omitted when empty.
fn param_label(unit: &TranslationUnit, param: DeclId) -> String {
    let position = unit.param(param).map_or(0, |p| p.index + 1);
    let name = unit.name(param);
    if name.is_empty() {
        format!("parameter {position}")
    } else {
        format!("parameter {position} ('{name}')")
    }
}
