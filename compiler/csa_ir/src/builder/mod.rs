//! Incremental construction of a [`TranslationUnit`].
//!
//! Front ends (the JSON dump loader, test fixtures) feed declarations,
//! types and expressions in source order. Every id handed to the builder
//! must refer to something built earlier, so arenas stay acyclic. Misuse
//! is recorded and reported once by [`UnitBuilder::finish`] instead of
//! panicking mid-construction.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ast::{
    Access, ConstructorDecl, ConversionDecl, CtorFlags, Decl, DeclKind, Expr, ExprKind,
    FieldDecl, InitTarget, Initializer, ParamDecl, RecordDecl, RecordFlags, Specialization,
    TypedefDecl,
};
use crate::ids::to_u32;
use crate::types::{TemplateArgs, TypeArena, TypeKind};
use crate::{DeclId, ExprId, Name, QualType, Span, StringInterner, TranslationUnit, TypeId};

/// Malformed unit description.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("declaration #{id} does not exist")]
    UnknownDecl { id: u32 },
    #[error("expression #{id} does not exist")]
    UnknownExpr { id: u32 },
    #[error("type #{id} does not exist")]
    UnknownType { id: u32 },
    #[error("declaration #{id} is a {found}, expected a {expected}")]
    WrongDeclKind {
        id: u32,
        expected: &'static str,
        found: &'static str,
    },
}

/// Builder for a [`TranslationUnit`].
pub struct UnitBuilder {
    unit: TranslationUnit,
    errors: Vec<BuildError>,
}

impl Default for UnitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitBuilder {
    pub fn new() -> Self {
        UnitBuilder {
            unit: TranslationUnit {
                interner: StringInterner::new(),
                decls: Vec::new(),
                exprs: Vec::new(),
                types: TypeArena::new(),
                statements: Vec::new(),
                redecls: FxHashMap::default(),
                path: None,
                source: None,
            },
            errors: Vec::new(),
        }
    }

    /// Attach the file the unit was produced from, for line/column lookup.
    #[must_use]
    pub fn with_source(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.unit.path = Some(path.into());
        self.unit.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.unit.path = Some(path.into());
        self
    }

    pub fn intern(&mut self, s: &str) -> Name {
        self.unit.interner.intern(s)
    }

    /// Validate and finish the unit.
    pub fn finish(mut self) -> Result<TranslationUnit, BuildError> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }

        for (index, decl) in self.unit.decls.iter().enumerate() {
            if let DeclKind::Constructor(ctor) = &decl.kind {
                self.unit
                    .redecls
                    .entry(ctor.canonical)
                    .or_default()
                    .push(DeclId::new(to_u32(index, "declaration")));
            }
        }

        Ok(self.unit)
    }

    // Validation helpers

    fn check_decl(&mut self, id: DeclId) -> bool {
        if id.index() < self.unit.decls.len() {
            true
        } else {
            self.errors.push(BuildError::UnknownDecl { id: id.raw() });
            false
        }
    }

    fn check_decl_kind(
        &mut self,
        id: DeclId,
        expected: &'static str,
        matches: fn(&DeclKind) -> bool,
    ) -> bool {
        match self.unit.decls.get(id.index()) {
            None => {
                self.errors.push(BuildError::UnknownDecl { id: id.raw() });
                false
            }
            Some(decl) if matches(&decl.kind) => true,
            Some(decl) => {
                let found = decl.kind.describe();
                self.errors.push(BuildError::WrongDeclKind {
                    id: id.raw(),
                    expected,
                    found,
                });
                false
            }
        }
    }

    fn check_type(&mut self, ty: QualType) -> bool {
        if self.unit.types.contains(ty.ty) {
            true
        } else {
            self.errors.push(BuildError::UnknownType { id: ty.ty.raw() });
            false
        }
    }

    fn check_expr(&mut self, id: ExprId) -> bool {
        if id.index() < self.unit.exprs.len() {
            true
        } else {
            self.errors.push(BuildError::UnknownExpr { id: id.raw() });
            false
        }
    }

    fn decl_kind_mut(&mut self, id: DeclId) -> Option<&mut DeclKind> {
        self.unit.decls.get_mut(id.index()).map(|d| &mut d.kind)
    }

    fn push_decl(
        &mut self,
        kind: DeclKind,
        name: &str,
        context: Option<DeclId>,
        span: Span,
    ) -> DeclId {
        if let Some(context) = context {
            self.check_decl(context);
        }
        let id = DeclId::new(to_u32(self.unit.decls.len(), "declaration"));
        let name = self.intern(name);
        self.unit.decls.push(Decl {
            kind,
            name,
            context,
            span,
        });
        id
    }

    // Types

    /// Intern an arbitrary type after checking that everything it
    /// references exists.
    pub fn intern_type(&mut self, kind: TypeKind) -> TypeId {
        let valid = match &kind {
            TypeKind::Builtin(_) => true,
            TypeKind::Record(decl) => {
                self.check_decl_kind(*decl, "record", |k| matches!(k, DeclKind::Record(_)))
            }
            TypeKind::Pointer(inner)
            | TypeKind::LValueReference(inner)
            | TypeKind::RValueReference(inner) => self.check_type(*inner),
            TypeKind::Typedef { decl, underlying } => {
                self.check_decl(*decl) & self.check_type(*underlying)
            }
            TypeKind::Elaborated { named } => self.check_type(*named),
            TypeKind::SubstTemplateParm { replacement } => self.check_type(*replacement),
            TypeKind::TemplateSpecialization {
                template,
                args,
                aliased,
            } => {
                let mut ok = self.check_decl(*template);
                for arg in args {
                    ok &= self.check_type(*arg);
                }
                if let Some(aliased) = aliased {
                    ok &= self.check_type(*aliased);
                }
                ok
            }
        };
        if valid {
            self.unit.types.intern(kind)
        } else {
            TypeId::INVALID
        }
    }

    pub fn builtin(&mut self, spelling: &str) -> QualType {
        let name = self.intern(spelling);
        QualType::new(self.intern_type(TypeKind::Builtin(name)))
    }

    pub fn pointer_to(&mut self, pointee: QualType) -> QualType {
        QualType::new(self.intern_type(TypeKind::Pointer(pointee)))
    }

    pub fn lvalue_ref_to(&mut self, referent: QualType) -> QualType {
        QualType::new(self.intern_type(TypeKind::LValueReference(referent)))
    }

    pub fn rvalue_ref_to(&mut self, referent: QualType) -> QualType {
        QualType::new(self.intern_type(TypeKind::RValueReference(referent)))
    }

    pub fn elaborated(&mut self, named: QualType) -> QualType {
        QualType::new(self.intern_type(TypeKind::Elaborated { named }))
    }

    pub fn substituted(&mut self, replacement: QualType) -> QualType {
        QualType::new(self.intern_type(TypeKind::SubstTemplateParm { replacement }))
    }

    pub fn template_specialization(
        &mut self,
        template: DeclId,
        args: &[QualType],
        aliased: Option<QualType>,
    ) -> QualType {
        QualType::new(self.intern_type(TypeKind::TemplateSpecialization {
            template,
            args: args.iter().copied().collect::<TemplateArgs>(),
            aliased,
        }))
    }

    /// The type named by a typedef declaration.
    pub fn typedef_type(&mut self, typedef: DeclId) -> QualType {
        let underlying = match self.unit.decls.get(typedef.index()).map(|d| &d.kind) {
            Some(DeclKind::Typedef(t)) => t.underlying,
            _ => {
                self.check_decl_kind(typedef, "typedef", |k| matches!(k, DeclKind::Typedef(_)));
                return QualType::new(TypeId::INVALID);
            }
        };
        QualType::new(self.intern_type(TypeKind::Typedef {
            decl: typedef,
            underlying,
        }))
    }

    /// The `Record` type of a record declaration.
    pub fn record_type(&mut self, record: DeclId) -> QualType {
        match self.unit.record(record) {
            Some(r) => QualType::new(r.ty),
            None => {
                self.check_decl_kind(record, "record", |k| matches!(k, DeclKind::Record(_)));
                QualType::new(TypeId::INVALID)
            }
        }
    }

    // Declarations

    pub fn namespace(&mut self, name: &str, context: Option<DeclId>) -> DeclId {
        self.push_decl(DeclKind::Namespace, name, context, Span::DUMMY)
    }

    pub fn class_template(&mut self, name: &str, context: Option<DeclId>, span: Span) -> DeclId {
        self.push_decl(DeclKind::ClassTemplate, name, context, span)
    }

    /// Declare a class, struct or union and its `Record` type.
    pub fn record(&mut self, name: &str, context: Option<DeclId>, span: Span) -> DeclId {
        self.push_record(name, context, span, None)
    }

    /// Declare a specialization of `template`, named and scoped like it.
    pub fn specialization(
        &mut self,
        template: DeclId,
        args: &[QualType],
        is_explicit: bool,
        span: Span,
    ) -> DeclId {
        for arg in args {
            self.check_type(*arg);
        }
        let (name, context) = match self.unit.decls.get(template.index()) {
            Some(decl) if matches!(decl.kind, DeclKind::ClassTemplate) => {
                (self.unit.lookup(decl.name).to_owned(), decl.context)
            }
            _ => {
                self.check_decl_kind(template, "class template", |k| {
                    matches!(k, DeclKind::ClassTemplate)
                });
                (String::new(), None)
            }
        };
        let spec = Specialization {
            template,
            args: args.iter().copied().collect(),
            is_explicit,
        };
        self.push_record(&name, context, span, Some(spec))
    }

    fn push_record(
        &mut self,
        name: &str,
        context: Option<DeclId>,
        span: Span,
        specialization: Option<Specialization>,
    ) -> DeclId {
        let id = DeclId::new(to_u32(self.unit.decls.len(), "declaration"));
        let ty = self.unit.types.intern(TypeKind::Record(id));
        self.push_decl(
            DeclKind::Record(RecordDecl {
                ty,
                bases: Vec::new(),
                ctors: Vec::new(),
                flags: RecordFlags::empty(),
                specialization,
            }),
            name,
            context,
            span,
        )
    }

    pub fn set_record_flags(&mut self, record: DeclId, flags: RecordFlags) {
        if !self.check_decl_kind(record, "record", |k| matches!(k, DeclKind::Record(_))) {
            return;
        }
        if let Some(DeclKind::Record(r)) = self.decl_kind_mut(record) {
            r.flags = flags;
        }
    }

    pub fn add_base(&mut self, record: DeclId, base: QualType) {
        if !self.check_type(base)
            || !self.check_decl_kind(record, "record", |k| matches!(k, DeclKind::Record(_)))
        {
            return;
        }
        if let Some(DeclKind::Record(r)) = self.decl_kind_mut(record) {
            r.bases.push(base);
        }
    }

    pub fn typedef(
        &mut self,
        name: &str,
        context: Option<DeclId>,
        underlying: QualType,
        span: Span,
    ) -> DeclId {
        self.check_type(underlying);
        self.push_decl(
            DeclKind::Typedef(TypedefDecl { underlying }),
            name,
            context,
            span,
        )
    }

    pub fn field(&mut self, record: DeclId, name: &str, ty: QualType, span: Span) -> DeclId {
        self.check_type(ty);
        self.check_decl_kind(record, "record", |k| matches!(k, DeclKind::Record(_)));
        self.push_decl(DeclKind::Field(FieldDecl { ty }), name, Some(record), span)
    }

    /// Declare a constructor of `record`. It becomes visible to
    /// constructor lookup on the record.
    pub fn constructor(
        &mut self,
        record: DeclId,
        access: Access,
        flags: CtorFlags,
        span: Span,
    ) -> DeclId {
        let valid = self.check_decl_kind(record, "record", |k| matches!(k, DeclKind::Record(_)));
        let id = DeclId::new(to_u32(self.unit.decls.len(), "declaration"));
        let name = if valid {
            self.unit.name(record).to_owned()
        } else {
            String::new()
        };
        self.push_decl(
            DeclKind::Constructor(ConstructorDecl {
                record,
                params: SmallVec::new(),
                inits: Vec::new(),
                access,
                flags,
                canonical: id,
            }),
            &name,
            Some(record),
            span,
        );
        if let Some(DeclKind::Record(r)) = self.decl_kind_mut(record) {
            r.ctors.push(id);
        }
        id
    }

    /// Redeclare (typically: define out of line) an existing constructor.
    ///
    /// Parameters must be added again, since each declaration owns its own.
    pub fn redeclare_constructor(
        &mut self,
        canonical: DeclId,
        flags: CtorFlags,
        span: Span,
    ) -> DeclId {
        let Some(first) = self.unit.constructor(canonical).cloned() else {
            self.check_decl_kind(canonical, "constructor", |k| {
                matches!(k, DeclKind::Constructor(_))
            });
            return DeclId::INVALID;
        };
        let name = self.unit.name(canonical).to_owned();
        self.push_decl(
            DeclKind::Constructor(ConstructorDecl {
                record: first.record,
                params: SmallVec::new(),
                inits: Vec::new(),
                access: first.access,
                flags,
                canonical: first.canonical,
            }),
            &name,
            Some(first.record),
            span,
        )
    }

    /// Append a parameter whose written type equals its adjusted type.
    pub fn param(&mut self, ctor: DeclId, name: &str, ty: QualType, span: Span) -> DeclId {
        self.param_as_written(ctor, name, ty, ty, span)
    }

    /// Append a parameter with distinct adjusted and as-written types.
    pub fn param_as_written(
        &mut self,
        ctor: DeclId,
        name: &str,
        ty: QualType,
        original_ty: QualType,
        span: Span,
    ) -> DeclId {
        self.check_type(ty);
        self.check_type(original_ty);
        let index = match self.unit.constructor(ctor) {
            Some(c) => to_u32(c.params.len(), "parameter"),
            None => {
                self.check_decl_kind(ctor, "constructor", |k| {
                    matches!(k, DeclKind::Constructor(_))
                });
                return DeclId::INVALID;
            }
        };
        let id = self.push_decl(
            DeclKind::Parameter(ParamDecl {
                ty,
                original_ty,
                index,
                default_arg: None,
            }),
            name,
            Some(ctor),
            span,
        );
        if let Some(DeclKind::Constructor(c)) = self.decl_kind_mut(ctor) {
            c.params.push(id);
        }
        id
    }

    pub fn set_default_arg(&mut self, param: DeclId, default: ExprId) {
        if !self.check_expr(default)
            || !self.check_decl_kind(param, "parameter", |k| matches!(k, DeclKind::Parameter(_)))
        {
            return;
        }
        if let Some(DeclKind::Parameter(p)) = self.decl_kind_mut(param) {
            p.default_arg = Some(default);
        }
    }

    pub fn add_initializer(&mut self, ctor: DeclId, init: Initializer) {
        let target_ok = match init.target {
            InitTarget::Base(base) => self.check_type(base),
            InitTarget::Member(field) => {
                self.check_decl_kind(field, "field", |k| matches!(k, DeclKind::Field(_)))
            }
        };
        if !target_ok
            || !self.check_expr(init.init)
            || !self.check_decl_kind(ctor, "constructor", |k| {
                matches!(k, DeclKind::Constructor(_))
            })
        {
            return;
        }
        if let Some(DeclKind::Constructor(c)) = self.decl_kind_mut(ctor) {
            c.inits.push(init);
        }
    }

    pub fn conversion(&mut self, record: DeclId, target: QualType, span: Span) -> DeclId {
        self.check_type(target);
        self.check_decl_kind(record, "record", |k| matches!(k, DeclKind::Record(_)));
        self.push_decl(
            DeclKind::Conversion(ConversionDecl { target }),
            "operator",
            Some(record),
            span,
        )
    }

    // Expressions

    pub fn expr(&mut self, kind: ExprKind, ty: QualType, span: Span) -> ExprId {
        self.check_type(ty);
        for &child in kind.children() {
            self.check_expr(child);
        }
        match &kind {
            ExprKind::Construct { ctor, .. } => {
                self.check_decl_kind(*ctor, "constructor", |k| {
                    matches!(k, DeclKind::Constructor(_))
                });
            }
            ExprKind::DefaultArgument(param) => {
                self.check_decl_kind(*param, "parameter", |k| {
                    matches!(k, DeclKind::Parameter(_))
                });
            }
            ExprKind::DeclRef(decl) => {
                self.check_decl(*decl);
            }
            _ => {}
        }
        let id = ExprId::new(to_u32(self.unit.exprs.len(), "expression"));
        self.unit.exprs.push(Expr { kind, ty, span });
        id
    }

    pub fn construct(&mut self, ctor: DeclId, args: &[ExprId], ty: QualType, span: Span) -> ExprId {
        self.expr(
            ExprKind::Construct {
                ctor,
                args: args.iter().copied().collect(),
            },
            ty,
            span,
        )
    }

    /// Argument slot filled from `param`'s default. Typed like the parameter.
    pub fn default_arg(&mut self, param: DeclId, span: Span) -> ExprId {
        let ty = self
            .unit
            .param(param)
            .map_or(QualType::new(TypeId::INVALID), |p| p.ty);
        if !ty.ty.is_valid() {
            self.check_decl_kind(param, "parameter", |k| matches!(k, DeclKind::Parameter(_)));
            return ExprId::INVALID;
        }
        self.expr(ExprKind::DefaultArgument(param), ty, span)
    }

    /// Implicit conversion of `sub` to `ty`, spanning `sub`.
    pub fn implicit_cast(&mut self, sub: ExprId, ty: QualType) -> ExprId {
        let span = self.unit.expr_span(sub);
        self.expr(ExprKind::ImplicitCast(sub), ty, span)
    }

    /// Record a statement-level expression.
    pub fn statement(&mut self, expr: ExprId) {
        if self.check_expr(expr) {
            self.unit.statements.push(expr);
        }
    }

    /// Read access to the unit under construction.
    pub fn unit(&self) -> &TranslationUnit {
        &self.unit
    }
}
