//! Post-pass over the constructors seen in the unit.
//!
//! For every constructor:
//! - an allocator-taking constructor with a body must pass its allocator to
//!   every allocator-aware base and member it initializes;
//! - a constructor of an allocator-aware class that takes no allocator needs
//!   a sibling that takes the same parameters plus a trailing allocator.
//!
//! For every record with a constructor, whether some constructor forwards an
//! allocator must agree with whether the record declares the trait.

use rustc_hash::FxHashMap;

use csa_ir::ast::{Access, ConstructorDecl, ExprKind, InitTarget, Initializer};
use csa_ir::{DeclId, ExprId, TranslationUnit};

use super::collector::Collected;
use super::oracle::Oracle;
use super::AllocatorProblem;

#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(constructors = collected.constructors().len())
)]
pub(crate) fn check_constructors(
    oracle: &mut Oracle<'_>,
    collected: &Collected,
    problems: &mut Vec<AllocatorProblem>,
) {
    let unit = oracle.unit();
    // Records in the order first seen, with whether any constructor
    // forwarded an allocator.
    let mut records: Vec<(DeclId, bool)> = Vec::new();
    let mut index: FxHashMap<DeclId, usize> = FxHashMap::default();

    for &id in collected.constructors() {
        let Some(ctor) = unit.constructor(id) else {
            continue;
        };
        let uses_allocator = check_forwarding(oracle, id, ctor, problems);
        match index.get(&ctor.record) {
            Some(&i) => records[i].1 |= uses_allocator,
            None => {
                index.insert(ctor.record, records.len());
                records.push((ctor.record, uses_allocator));
            }
        }
        check_sibling(oracle, id, ctor, problems);
    }

    for (record, uses_allocator) in records {
        match (uses_allocator, collected.declares_trait(record)) {
            (false, true) => problems.push(AllocatorProblem::TraitDeclaredButUnused { record }),
            (true, false) => problems.push(AllocatorProblem::TraitMissing { record }),
            _ => {}
        }
    }
}

/// Check the initializers of an allocator-taking constructor.
///
/// Returns whether the constructor takes (and so should forward) an
/// allocator.
fn check_forwarding(
    oracle: &mut Oracle<'_>,
    id: DeclId,
    ctor: &ConstructorDecl,
    problems: &mut Vec<AllocatorProblem>,
) -> bool {
    let unit = oracle.unit();
    if oracle.allocator().is_none()
        || !unit.has_body(id)
        || unit.record(ctor.record).is_none()
        || !oracle.constructor_takes_allocator(id, true)
    {
        return false;
    }

    // The allocator is the last parameter.
    let Some(&alloc_param) = ctor.params.last() else {
        return false;
    };
    for init in &ctor.inits {
        check_initializer(oracle, init, alloc_param, problems);
    }
    true
}

fn check_initializer(
    oracle: &mut Oracle<'_>,
    init: &Initializer,
    alloc_param: DeclId,
    problems: &mut Vec<AllocatorProblem>,
) {
    let unit = oracle.unit();
    let target_ty = match init.target {
        InitTarget::Base(base) => base,
        InitTarget::Member(field) => match unit.field(field) {
            Some(field) => field.ty,
            None => return,
        },
    };
    if !oracle.type_takes_allocator(unit.canonical(target_ty), true) {
        return;
    }

    let Some(ExprKind::Construct { ctor, args }) = unit.get_expr(init.init).map(|e| &e.kind)
    else {
        return;
    };
    if oracle.constructor_takes_allocator(*ctor, true) && last_arg_is_explicit(unit, args) {
        return;
    }

    let (location, range) = if init.is_written {
        (unit.expr_span(init.init), init.span)
    } else {
        let param = unit.decl_span(alloc_param);
        (param, param)
    };
    problems.push(match init.target {
        InitTarget::Base(base) => AllocatorProblem::BaseNotForwarded {
            location,
            range,
            base: unit.canonical(base),
        },
        InitTarget::Member(member) => AllocatorProblem::MemberNotForwarded {
            location,
            range,
            member,
        },
    });
}

/// No arguments, or a last argument the caller wrote.
fn last_arg_is_explicit(unit: &TranslationUnit, args: &[ExprId]) -> bool {
    args.last()
        .and_then(|&arg| unit.get_expr(arg))
        .map_or(true, |arg| !arg.is_default_argument())
}

fn check_sibling(
    oracle: &mut Oracle<'_>,
    id: DeclId,
    ctor: &ConstructorDecl,
    problems: &mut Vec<AllocatorProblem>,
) {
    let unit = oracle.unit();
    if ctor.canonical != id {
        return;
    }
    let Some(record_ty) = unit.record_type(ctor.record) else {
        return;
    };
    if !oracle.type_takes_allocator(unit.canonical(record_ty), true)
        || oracle.constructor_takes_allocator(id, true)
    {
        return;
    }

    // Declared private and never defined: the usual way to disable copying.
    let disabled_copy = ctor.access == Access::Private
        && ctor.is_copy_or_move()
        && ctor.is_user_provided()
        && !unit.has_body(id);
    if disabled_copy || has_allocator_sibling(oracle, id, ctor) {
        return;
    }

    problems.push(if ctor.is_user_provided() {
        AllocatorProblem::NoAllocatorOverload { ctor: id }
    } else {
        AllocatorProblem::ImplicitCtorWithoutAllocator {
            ctor: id,
            kind: ctor.implicit_kind(),
        }
    });
}

/// Another constructor of the same record taking the same parameters, as
/// written, followed by an allocator.
fn has_allocator_sibling(oracle: &mut Oracle<'_>, id: DeclId, ctor: &ConstructorDecl) -> bool {
    let unit = oracle.unit();
    let written = |param: DeclId| unit.param(param).map(|p| p.original_ty);

    for &other_id in unit.constructors_of(ctor.record) {
        let Some(other) = unit.constructor(other_id) else {
            continue;
        };
        if other_id == id
            || other.canonical != other_id
            || other.record != ctor.record
            || other.params.len() != ctor.params.len() + 1
            || !oracle.constructor_takes_allocator(other_id, true)
        {
            continue;
        }
        let same_leading = ctor
            .params
            .iter()
            .zip(&other.params)
            .all(|(&mine, &theirs)| written(mine) == written(theirs));
        if same_leading {
            return true;
        }
    }
    false
}
