//! Builders for allocator-aware units used across the check tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use csa_ir::ast::{
    Access, ConstructorDecl, ConversionDecl, CtorFlags, ExprKind, InitTarget, Initializer,
    RecordDecl, RecordFlags, TypedefDecl,
};
use csa_ir::visitor::{walk_constructor, walk_construct_args, walk_unit, Visitor};
use csa_ir::{DeclId, ExprId, QualType, Span, TranslationUnit, UnitBuilder};

use crate::allocator_forward::{AllocatorForward, AllocatorProblem};
use crate::{check_unit, Check, CheckConfig, CheckResult};

/// A user-provided constructor with a body.
pub(crate) const DEFINED: CtorFlags = CtorFlags::USER_PROVIDED.union(CtorFlags::HAS_BODY);

/// An allocator-aware class: `struct Name { Name(Allocator *a = 0); }`.
#[derive(Copy, Clone, Debug)]
pub(crate) struct AllocAware {
    pub(crate) record: DeclId,
    pub(crate) ty: QualType,
    pub(crate) ctor: DeclId,
    pub(crate) alloc_param: DeclId,
}

/// A [`UnitBuilder`] that already declares `BloombergLP::bslma::Allocator`
/// and hands out distinct spans.
pub(crate) struct Fixture {
    pub(crate) b: UnitBuilder,
    pub(crate) alloc_ptr: QualType,
    pub(crate) int: QualType,
    bloomberg: DeclId,
    bslma: DeclId,
    nested_trait: Option<DeclId>,
    uses_allocator: Option<DeclId>,
    integral_constant: Option<DeclId>,
    next_offset: u32,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_allocator(true)
    }

    /// A fixture whose unit never declares the allocator class.
    pub(crate) fn without_allocator() -> Self {
        Self::with_allocator(false)
    }

    fn with_allocator(declare: bool) -> Self {
        let mut b = UnitBuilder::new().with_path("test.cpp");
        let bloomberg = b.namespace("BloombergLP", None);
        let bslma = b.namespace("bslma", Some(bloomberg));
        let name = if declare { "Allocator" } else { "NotAnAllocator" };
        let alloc = b.record(name, Some(bslma), Span::DUMMY);
        let alloc_ty = b.record_type(alloc);
        let alloc_ptr = b.pointer_to(alloc_ty);
        let int = b.builtin("int");
        Fixture {
            b,
            alloc_ptr,
            int,
            bloomberg,
            bslma,
            nested_trait: None,
            uses_allocator: None,
            integral_constant: None,
            next_offset: 100,
        }
    }

    /// A span no other fixture node uses.
    pub(crate) fn span(&mut self) -> Span {
        let start = self.next_offset;
        self.next_offset += 10;
        Span::new(start, start + 4)
    }

    pub(crate) fn record(&mut self, name: &str) -> (DeclId, QualType) {
        let span = self.span();
        let record = self.b.record(name, None, span);
        let ty = self.b.record_type(record);
        (record, ty)
    }

    pub(crate) fn ctor(&mut self, record: DeclId, flags: CtorFlags) -> DeclId {
        self.ctor_with_access(record, Access::Public, flags)
    }

    pub(crate) fn ctor_with_access(
        &mut self,
        record: DeclId,
        access: Access,
        flags: CtorFlags,
    ) -> DeclId {
        let span = self.span();
        self.b.constructor(record, access, flags, span)
    }

    pub(crate) fn param(&mut self, ctor: DeclId, name: &str, ty: QualType) -> DeclId {
        let span = self.span();
        self.b.param(ctor, name, ty, span)
    }

    /// Trailing `Allocator *basicAllocator`, `= 0` when `defaulted`.
    pub(crate) fn alloc_param(&mut self, ctor: DeclId, defaulted: bool) -> DeclId {
        let alloc_ptr = self.alloc_ptr;
        let param = self.param(ctor, "basicAllocator", alloc_ptr);
        if defaulted {
            let span = self.span();
            let null = self.b.expr(ExprKind::NullPointer, alloc_ptr, span);
            self.b.set_default_arg(param, null);
        }
        param
    }

    /// `struct Name { Name(Allocator *basicAllocator = 0) {} };`
    pub(crate) fn alloc_aware(&mut self, name: &str) -> AllocAware {
        let (record, ty) = self.record(name);
        let ctor = self.ctor(record, DEFINED);
        let alloc_param = self.alloc_param(ctor, true);
        AllocAware {
            record,
            ty,
            ctor,
            alloc_param,
        }
    }

    pub(crate) fn field(&mut self, record: DeclId, name: &str, ty: QualType) -> DeclId {
        let span = self.span();
        self.b.field(record, name, ty, span)
    }

    /// Reference to a declaration, typed like a parameter or `ty`.
    pub(crate) fn decl_ref(&mut self, decl: DeclId, ty: QualType) -> ExprId {
        let span = self.span();
        self.b.expr(ExprKind::DeclRef(decl), ty, span)
    }

    /// Some expression of type `Allocator *`.
    pub(crate) fn alloc_value(&mut self) -> ExprId {
        let span = self.span();
        let alloc_ptr = self.alloc_ptr;
        self.b.expr(ExprKind::Opaque, alloc_ptr, span)
    }

    pub(crate) fn construct(&mut self, ctor: DeclId, args: &[ExprId], ty: QualType) -> ExprId {
        let span = self.span();
        self.b.construct(ctor, args, ty, span)
    }

    pub(crate) fn default_arg(&mut self, param: DeclId) -> ExprId {
        let span = self.span();
        self.b.default_arg(param, span)
    }

    pub(crate) fn init_member(&mut self, ctor: DeclId, field: DeclId, init: ExprId, written: bool) {
        self.init(ctor, InitTarget::Member(field), init, written);
    }

    pub(crate) fn init_base(&mut self, ctor: DeclId, base: QualType, init: ExprId, written: bool) {
        self.init(ctor, InitTarget::Base(base), init, written);
    }

    fn init(&mut self, ctor: DeclId, target: InitTarget, init: ExprId, is_written: bool) {
        let span = if is_written { self.span() } else { Span::DUMMY };
        self.b.add_initializer(
            ctor,
            Initializer {
                target,
                init,
                is_written,
                span,
            },
        );
    }

    /// `operator bslalg::TypeTraitUsesBslmaAllocator::NestedTraitDeclaration<R>() const;`
    pub(crate) fn declare_nested_trait(&mut self, record: DeclId) -> DeclId {
        self.nested_trait_conversion(record, record)
    }

    /// The nested trait conversion for `named`, declared inside `owner`.
    pub(crate) fn nested_trait_conversion(&mut self, owner: DeclId, named: DeclId) -> DeclId {
        let template = match self.nested_trait {
            Some(template) => template,
            None => {
                let bslalg = self.b.namespace("bslalg", Some(self.bloomberg));
                let traits =
                    self.b
                        .record("TypeTraitUsesBslmaAllocator", Some(bslalg), Span::DUMMY);
                let template =
                    self.b
                        .class_template("NestedTraitDeclaration", Some(traits), Span::DUMMY);
                self.nested_trait = Some(template);
                template
            }
        };
        let named_ty = self.b.record_type(named);
        let spelled = self.b.template_specialization(template, &[named_ty], None);
        let target = self.b.elaborated(spelled);
        let span = self.span();
        self.b.conversion(owner, target, span)
    }

    /// `bsl::integral_constant`, the record `bsl::true_type` aliases.
    fn true_record(&mut self) -> DeclId {
        if let Some(record) = self.integral_constant {
            return record;
        }
        let bsl = self.b.namespace("bsl", None);
        let record = self.b.record("integral_constant", Some(bsl), Span::DUMMY);
        self.integral_constant = Some(record);
        record
    }

    /// `namespace bsl { typedef integral_constant<bool, true> true_type; }`
    pub(crate) fn declare_true_type(&mut self) -> DeclId {
        let record = self.true_record();
        let bsl = self.b.unit().decl(record).context;
        let underlying = self.b.record_type(record);
        self.b.typedef("true_type", bsl, underlying, Span::DUMMY)
    }

    /// `template <> struct bslma::UsesBslmaAllocator<R> : bsl::true_type {};`
    ///
    /// `empty` clears the flag a real trait specialization carries.
    pub(crate) fn specialize_uses_allocator(&mut self, args: &[QualType], empty: bool) -> DeclId {
        let template = match self.uses_allocator {
            Some(template) => template,
            None => {
                let template =
                    self.b
                        .class_template("UsesBslmaAllocator", Some(self.bslma), Span::DUMMY);
                self.uses_allocator = Some(template);
                template
            }
        };
        let span = self.span();
        let spec = self.b.specialization(template, args, true, span);
        let true_record = self.true_record();
        let base = self.b.record_type(true_record);
        self.b.add_base(spec, base);
        if empty {
            self.b.set_record_flags(spec, RecordFlags::EMPTY);
        }
        spec
    }

    pub(crate) fn finish(self) -> TranslationUnit {
        self.b.finish().expect("fixture builds a valid unit")
    }
}

/// Run the built-in checks with the default configuration.
pub(crate) fn run(unit: &TranslationUnit) -> CheckResult {
    check_unit(unit, &CheckConfig::default())
}

/// Rendered messages of a run, in report order.
pub(crate) fn messages(result: &CheckResult) -> Vec<String> {
    result
        .diagnostics
        .iter()
        .map(|d| format!("{}: {}", d.code, d.message))
        .collect()
}

/// Walk `unit` through a fresh allocator check and return its problems
/// without rendering them.
pub(crate) fn problems(unit: &TranslationUnit) -> Vec<AllocatorProblem> {
    let mut check = AllocatorForward::default();
    walk_unit(&mut Feed(&mut check), unit);
    check.problems(unit)
}

/// Feeds traversal callbacks to a single check.
struct Feed<'c>(&'c mut dyn Check);

impl<'u> Visitor<'u> for Feed<'_> {
    fn visit_record(&mut self, id: DeclId, record: &'u RecordDecl, unit: &'u TranslationUnit) {
        self.0.on_record(id, record, unit);
    }

    fn visit_typedef(&mut self, id: DeclId, typedef: &'u TypedefDecl, unit: &'u TranslationUnit) {
        self.0.on_typedef(id, typedef, unit);
    }

    fn visit_constructor(
        &mut self,
        id: DeclId,
        ctor: &'u ConstructorDecl,
        unit: &'u TranslationUnit,
    ) {
        self.0.on_constructor(id, ctor, unit);
        walk_constructor(self, ctor, unit);
    }

    fn visit_conversion(
        &mut self,
        id: DeclId,
        conversion: &'u ConversionDecl,
        unit: &'u TranslationUnit,
    ) {
        self.0.on_conversion(id, conversion, unit);
    }

    fn visit_construct_expr(&mut self, id: ExprId, args: &'u [ExprId], unit: &'u TranslationUnit) {
        self.0.on_construct_expr(id, unit);
        walk_construct_args(self, args, unit);
    }
}
