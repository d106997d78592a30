//! Allocator arguments that conversion routed into the wrong parameter.
//!
//! Given `X(const Field&, Allocator* = 0)` and a `Field` constructible from
//! an allocator pointer, `X x(alloc)` compiles: `alloc` becomes a `Field`
//! and `X` gets the default allocator. The call looks right and is not.

use rustc_hash::FxHashSet;

use csa_ir::ast::ExprKind;
use csa_ir::{DeclId, ExprId, TranslationUnit};

use super::oracle::Oracle;
use super::AllocatorProblem;

#[tracing::instrument(level = "debug", skip_all, fields(calls = calls.len()))]
pub(crate) fn check_calls(
    oracle: &Oracle<'_>,
    calls: &[ExprId],
    reported: &mut FxHashSet<(ExprId, DeclId)>,
    problems: &mut Vec<AllocatorProblem>,
) {
    if oracle.allocator().is_none() {
        return;
    }
    let before = problems.len();
    for &call in calls {
        check_call(oracle, call, reported, problems);
    }
    tracing::debug!(found = problems.len() - before, "misrouted allocators");
}

fn check_call(
    oracle: &Oracle<'_>,
    call: ExprId,
    reported: &mut FxHashSet<(ExprId, DeclId)>,
    problems: &mut Vec<AllocatorProblem>,
) {
    let unit = oracle.unit();
    let Some(ExprKind::Construct { ctor, args }) = unit.get_expr(call).map(|e| &e.kind) else {
        return;
    };
    let n = args.len();
    if n < 2 {
        return;
    }
    let Some(decl) = unit.constructor(*ctor) else {
        return;
    };
    if decl.params.len() != n {
        return;
    }

    // Only the allocator slot was left to its default.
    let alloc_param = decl.params[n - 1];
    let Some(last_param) = unit.param(alloc_param) else {
        return;
    };
    let defaulted = unit
        .get_expr(args[n - 1])
        .is_some_and(|arg| arg.is_default_argument());
    if last_param.default_arg.is_none() || !defaulted || !oracle.is_allocator(last_param.ty) {
        return;
    }

    let inner = innermost_argument(unit, args[n - 2]);
    let Some(inner_expr) = unit.get_expr(inner) else {
        return;
    };
    if oracle.is_allocator(inner_expr.ty) && reported.insert((inner, *ctor)) {
        problems.push(AllocatorProblem::MisroutedAllocator {
            arg: inner,
            ctor: *ctor,
            wrong_param: decl.params[n - 2],
            alloc_param,
        });
    }
}

/// The expression an argument was converted from.
///
/// Strips implicit casts and temporaries, and for a constructor call moves
/// to its rightmost argument the caller wrote, until none of those apply.
pub(crate) fn innermost_argument(unit: &TranslationUnit, arg: ExprId) -> ExprId {
    let mut arg = arg;
    // Each step moves to a sub-expression, and expression trees are
    // acyclic, so the walk ends within `expr_count` steps.
    for _ in 0..=unit.expr_count() {
        arg = unit.ignore_implicit_casts(arg);
        let next = match unit.get_expr(arg).map(|e| &e.kind) {
            Some(ExprKind::MaterializeTemporary(sub) | ExprKind::BindTemporary(sub)) => *sub,
            Some(ExprKind::Construct { args, .. }) => {
                let written = args.iter().rev().copied().find(|&sub| {
                    unit.get_expr(sub)
                        .is_some_and(|e| !e.is_default_argument())
                });
                match written {
                    Some(sub) => sub,
                    None => break,
                }
            }
            _ => break,
        };
        arg = next;
    }
    arg
}
