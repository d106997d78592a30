//! The translation unit and the semantic queries the checks rely on.
//!
//! A `TranslationUnit` is immutable once built (see [`UnitBuilder`]).
//! Every query is total over ids the unit allocated; asking about an id of
//! the wrong kind yields `None`/`false` rather than a panic.
//!
//! [`UnitBuilder`]: crate::UnitBuilder

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ast::{
    ConstructorDecl, ConversionDecl, CtorFlags, Decl, DeclKind, Expr, ExprKind, FieldDecl,
    ParamDecl, RecordDecl, TypedefDecl,
};
use crate::stack::ensure_sufficient_stack;
use crate::types::{TypeArena, TypeKind};
use crate::{DeclId, ExprId, Name, QualType, Span, StringInterner, TypeId};

/// An already-parsed, already-resolved translation unit.
#[derive(Clone, Debug)]
pub struct TranslationUnit {
    pub(crate) interner: StringInterner,
    pub(crate) decls: Vec<Decl>,
    pub(crate) exprs: Vec<Expr>,
    pub(crate) types: TypeArena,
    /// Expressions appearing in statements (function bodies, globals).
    pub(crate) statements: Vec<ExprId>,
    /// Canonical constructor -> every declaration of it, in order.
    pub(crate) redecls: FxHashMap<DeclId, SmallVec<[DeclId; 2]>>,
    pub(crate) path: Option<String>,
    pub(crate) source: Option<String>,
}

impl TranslationUnit {
    // Arena access

    /// # Panics
    /// Panics if `id` was not allocated by this unit.
    #[inline]
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn get_decl(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id.index())
    }

    /// # Panics
    /// Panics if `id` was not allocated by this unit.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn get_expr(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index())
    }

    /// All declarations in declaration order.
    pub fn decl_ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        (0..self.decls.len()).map(|i| DeclId::new(crate::ids::to_u32(i, "declaration")))
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Statement-level expressions in source order.
    pub fn statements(&self) -> &[ExprId] {
        &self.statements
    }

    #[inline]
    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    #[inline]
    pub fn type_kind(&self, ty: TypeId) -> Option<&TypeKind> {
        self.types.get(ty)
    }

    #[inline]
    pub fn lookup(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    /// Unqualified name of a declaration.
    pub fn name(&self, id: DeclId) -> &str {
        self.get_decl(id).map_or("", |d| self.lookup(d.name))
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Source text under `span`. `None` for empty spans, spans outside the
    /// source, or when the unit carries no source.
    pub fn snippet(&self, span: Span) -> Option<&str> {
        if span.is_empty() {
            return None;
        }
        self.source()?.get(span.start as usize..span.end as usize)
    }

    pub fn decl_span(&self, id: DeclId) -> Span {
        self.get_decl(id).map_or(Span::DUMMY, |d| d.span)
    }

    pub fn expr_span(&self, id: ExprId) -> Span {
        self.get_expr(id).map_or(Span::DUMMY, |e| e.span)
    }

    // Kind-checked declaration access

    pub fn record(&self, id: DeclId) -> Option<&RecordDecl> {
        match &self.get_decl(id)?.kind {
            DeclKind::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn constructor(&self, id: DeclId) -> Option<&ConstructorDecl> {
        match &self.get_decl(id)?.kind {
            DeclKind::Constructor(ctor) => Some(ctor),
            _ => None,
        }
    }

    pub fn param(&self, id: DeclId) -> Option<&ParamDecl> {
        match &self.get_decl(id)?.kind {
            DeclKind::Parameter(param) => Some(param),
            _ => None,
        }
    }

    pub fn field(&self, id: DeclId) -> Option<&FieldDecl> {
        match &self.get_decl(id)?.kind {
            DeclKind::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn typedef(&self, id: DeclId) -> Option<&TypedefDecl> {
        match &self.get_decl(id)?.kind {
            DeclKind::Typedef(typedef) => Some(typedef),
            _ => None,
        }
    }

    pub fn conversion(&self, id: DeclId) -> Option<&ConversionDecl> {
        match &self.get_decl(id)?.kind {
            DeclKind::Conversion(conversion) => Some(conversion),
            _ => None,
        }
    }

    // Names

    /// Fully qualified name (`ns::Outer::Inner`).
    ///
    /// Anonymous scopes are spelled `(anonymous)`.
    pub fn qualified_name(&self, id: DeclId) -> String {
        let mut segments: SmallVec<[&str; 8]> = SmallVec::new();
        let mut current = Some(id);
        // Context chains are acyclic (checked by the builder), bounded anyway.
        let mut remaining = self.decls.len() + 1;
        while let Some(decl_id) = current {
            let Some(decl) = self.get_decl(decl_id) else {
                break;
            };
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            let name = self.lookup(decl.name);
            segments.push(if name.is_empty() { "(anonymous)" } else { name });
            current = decl.context;
        }

        let mut out = String::new();
        for (i, segment) in segments.iter().rev().enumerate() {
            if i > 0 {
                out.push_str("::");
            }
            out.push_str(segment);
        }
        out
    }

    // Types

    #[inline]
    pub fn canonical(&self, ty: QualType) -> QualType {
        self.types.canonical(ty)
    }

    #[inline]
    pub fn desugar_once(&self, ty: QualType) -> Option<QualType> {
        self.types.desugar_once(ty)
    }

    /// Record declaration a type denotes after stripping all sugar.
    pub fn as_record_decl(&self, ty: QualType) -> Option<DeclId> {
        match self.type_kind(self.canonical(ty).ty)? {
            TypeKind::Record(decl) => Some(*decl),
            _ => None,
        }
    }

    /// The `Record` type naming a record declaration.
    pub fn record_type(&self, record: DeclId) -> Option<QualType> {
        self.record(record).map(|r| QualType::new(r.ty))
    }

    /// Pointee of a (possibly sugared) pointer type.
    pub fn pointee(&self, ty: QualType) -> Option<QualType> {
        match self.type_kind(self.canonical(ty).ty)? {
            TypeKind::Pointer(pointee) => Some(*pointee),
            _ => None,
        }
    }

    /// Referenced type of a (possibly sugared) lvalue or rvalue reference.
    pub fn referenced_type(&self, ty: QualType) -> Option<QualType> {
        match self.type_kind(self.canonical(ty).ty)? {
            TypeKind::LValueReference(referent) | TypeKind::RValueReference(referent) => {
                Some(*referent)
            }
            _ => None,
        }
    }

    /// Spelling of a type for messages.
    pub fn type_to_string(&self, ty: QualType) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    fn write_type(&self, out: &mut String, ty: QualType) {
        ensure_sufficient_stack(|| {
            let Some(kind) = self.type_kind(ty.ty) else {
                out.push_str("<unknown type>");
                return;
            };
            match kind {
                TypeKind::Pointer(inner) => {
                    self.write_type(out, *inner);
                    out.push_str(" *");
                    if ty.is_const {
                        out.push_str("const");
                    }
                }
                TypeKind::LValueReference(inner) => {
                    self.write_type(out, *inner);
                    out.push_str(" &");
                }
                TypeKind::RValueReference(inner) => {
                    self.write_type(out, *inner);
                    out.push_str(" &&");
                }
                TypeKind::Elaborated { named } => self.write_type(out, named.with_const(ty.is_const)),
                TypeKind::SubstTemplateParm { replacement } => {
                    self.write_type(out, replacement.with_const(ty.is_const));
                }
                TypeKind::Builtin(name) => {
                    Self::write_const(out, ty);
                    out.push_str(self.lookup(*name));
                }
                TypeKind::Typedef { decl, .. } => {
                    Self::write_const(out, ty);
                    out.push_str(&self.qualified_name(*decl));
                }
                TypeKind::Record(decl) => {
                    Self::write_const(out, ty);
                    out.push_str(&self.qualified_name(*decl));
                    if let Some(spec) = self.record(*decl).and_then(|r| r.specialization.as_ref())
                    {
                        self.write_template_args(out, &spec.args);
                    }
                }
                TypeKind::TemplateSpecialization { template, args, .. } => {
                    Self::write_const(out, ty);
                    out.push_str(&self.qualified_name(*template));
                    self.write_template_args(out, args);
                }
            }
        });
    }

    fn write_const(out: &mut String, ty: QualType) {
        if ty.is_const {
            out.push_str("const ");
        }
    }

    fn write_template_args(&self, out: &mut String, args: &[QualType]) {
        out.push('<');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(out, *arg);
        }
        out.push('>');
    }

    // Records

    /// Constructors found by constructor lookup in `record`.
    pub fn constructors_of(&self, record: DeclId) -> &[DeclId] {
        self.record(record).map_or(&[], |r| r.ctors.as_slice())
    }

    /// Whether `derived` has `base` as a direct or indirect base class.
    ///
    /// A record is not derived from itself.
    pub fn is_derived_from(&self, derived: DeclId, base: DeclId) -> bool {
        let mut stack: SmallVec<[DeclId; 8]> = SmallVec::new();
        let mut visited = rustc_hash::FxHashSet::default();
        stack.push(derived);
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(record) = self.record(current) else {
                continue;
            };
            for base_ty in &record.bases {
                let Some(base_decl) = self.as_record_decl(*base_ty) else {
                    continue;
                };
                if base_decl == base {
                    return true;
                }
                stack.push(base_decl);
            }
        }
        false
    }

    // Constructors

    /// Every declaration of the constructor whose canonical declaration
    /// is `ctor`'s canonical declaration.
    pub fn redeclarations(&self, ctor: DeclId) -> &[DeclId] {
        let canonical = self.constructor(ctor).map_or(ctor, |c| c.canonical);
        self.redecls.get(&canonical).map_or(&[], |r| r.as_slice())
    }

    /// Whether any declaration of `ctor` carries a definition.
    pub fn has_body(&self, ctor: DeclId) -> bool {
        let declares_body = |id: DeclId| {
            self.constructor(id)
                .is_some_and(|c| c.flags.contains(CtorFlags::HAS_BODY))
        };
        declares_body(ctor) || self.redeclarations(ctor).iter().any(|&d| declares_body(d))
    }

    // Expressions

    /// Skip implicit conversions.
    pub fn ignore_implicit_casts(&self, mut expr: ExprId) -> ExprId {
        while let Some(ExprKind::ImplicitCast(sub)) = self.get_expr(expr).map(|e| &e.kind) {
            expr = *sub;
        }
        expr
    }
}

#[cfg(test)]
mod tests;
