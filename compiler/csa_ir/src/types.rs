//! Type representation and the hash-consed type arena.
//!
//! Every type is interned once. Sugar kinds (typedef names, elaborated
//! spellings, template-specialization spellings, substituted template
//! parameters) keep their own id so that the spelling survives, and each
//! type records its canonical form at intern time. Two spellings of the
//! same type therefore share a canonical id and compare equal by `TypeId`.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ids::to_u32;
use crate::{DeclId, Name, TypeId};

/// A type together with its top-level `const` qualifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct QualType {
    pub ty: TypeId,
    pub is_const: bool,
}

impl QualType {
    /// Unqualified type.
    #[inline]
    pub const fn new(ty: TypeId) -> Self {
        QualType {
            ty,
            is_const: false,
        }
    }

    /// `const`-qualified type.
    #[inline]
    pub const fn constant(ty: TypeId) -> Self {
        QualType { ty, is_const: true }
    }

    /// Add (never remove) a `const` qualifier.
    #[inline]
    #[must_use]
    pub const fn with_const(self, is_const: bool) -> Self {
        QualType {
            ty: self.ty,
            is_const: self.is_const || is_const,
        }
    }
}

crate::static_assert_size!(QualType, 8);

/// Template arguments of a specialization spelling.
pub type TemplateArgs = SmallVec<[QualType; 2]>;

/// Kinds of types the checks can observe.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    /// Fundamental type, named by its spelling (`int`, `bool`, ...).
    Builtin(Name),
    /// Class, struct or union type.
    Record(DeclId),
    Pointer(QualType),
    LValueReference(QualType),
    RValueReference(QualType),
    /// Type named through a typedef or alias declaration.
    Typedef { decl: DeclId, underlying: QualType },
    /// Elaborated spelling (`struct X`, `ns::X`) of another type.
    Elaborated { named: QualType },
    /// `Template<Args...>` as written.
    ///
    /// `aliased` is the type the spelling denotes. Dependent or
    /// uninstantiated specializations have none and are canonical.
    TemplateSpecialization {
        template: DeclId,
        args: TemplateArgs,
        aliased: Option<QualType>,
    },
    /// Template parameter replaced by its argument in an instantiation.
    SubstTemplateParm { replacement: QualType },
}

impl TypeKind {
    /// Whether this kind is a spelling of some other type.
    pub fn is_sugar(&self) -> bool {
        match self {
            TypeKind::Typedef { .. }
            | TypeKind::Elaborated { .. }
            | TypeKind::SubstTemplateParm { .. } => true,
            TypeKind::TemplateSpecialization { aliased, .. } => aliased.is_some(),
            TypeKind::Builtin(_)
            | TypeKind::Record(_)
            | TypeKind::Pointer(_)
            | TypeKind::LValueReference(_)
            | TypeKind::RValueReference(_) => false,
        }
    }
}

/// Hash-consed storage for all types of a unit.
#[derive(Clone, Debug, Default)]
pub struct TypeArena {
    kinds: Vec<TypeKind>,
    /// Canonical form of each type, parallel to `kinds`.
    canonical: Vec<QualType>,
    interned: FxHashMap<TypeKind, TypeId>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a type, returning the existing id for an identical kind.
    ///
    /// Every id referenced by `kind` must already belong to this arena.
    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.interned.get(&kind) {
            return id;
        }

        let canonical = match &kind {
            TypeKind::Builtin(_) | TypeKind::Record(_) => None,
            TypeKind::Pointer(pointee) => self.canonical_wrapper(*pointee, TypeKind::Pointer),
            TypeKind::LValueReference(pointee) => {
                self.canonical_wrapper(*pointee, TypeKind::LValueReference)
            }
            TypeKind::RValueReference(pointee) => {
                self.canonical_wrapper(*pointee, TypeKind::RValueReference)
            }
            TypeKind::Typedef { underlying, .. } => Some(self.canonical(*underlying)),
            TypeKind::Elaborated { named } => Some(self.canonical(*named)),
            TypeKind::SubstTemplateParm { replacement } => Some(self.canonical(*replacement)),
            TypeKind::TemplateSpecialization {
                aliased: Some(aliased),
                ..
            } => Some(self.canonical(*aliased)),
            TypeKind::TemplateSpecialization {
                template,
                args,
                aliased: None,
            } => {
                let canonical_args: TemplateArgs =
                    args.iter().map(|arg| self.canonical(*arg)).collect();
                if canonical_args == *args {
                    None
                } else {
                    let id = self.intern(TypeKind::TemplateSpecialization {
                        template: *template,
                        args: canonical_args,
                        aliased: None,
                    });
                    Some(QualType::new(id))
                }
            }
        };

        let id = TypeId::new(to_u32(self.kinds.len(), "type"));
        self.kinds.push(kind.clone());
        self.canonical.push(canonical.unwrap_or(QualType::new(id)));
        self.interned.insert(kind, id);
        id
    }

    /// Canonical form of a wrapper type whose pointee may be sugared.
    fn canonical_wrapper(
        &mut self,
        pointee: QualType,
        wrap: fn(QualType) -> TypeKind,
    ) -> Option<QualType> {
        let canonical_pointee = self.canonical(pointee);
        if canonical_pointee == pointee {
            None
        } else {
            Some(QualType::new(self.intern(wrap(canonical_pointee))))
        }
    }

    /// Kind of a type.
    ///
    /// # Panics
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id.index()]
    }

    /// Kind of a type, or `None` for ids this arena never allocated.
    #[inline]
    pub fn get(&self, id: TypeId) -> Option<&TypeKind> {
        self.kinds.get(id.index())
    }

    /// Canonical, sugar-free form of `ty`, keeping every `const` seen on
    /// the way down.
    #[inline]
    pub fn canonical(&self, ty: QualType) -> QualType {
        match self.canonical.get(ty.ty.index()) {
            Some(canonical) => canonical.with_const(ty.is_const),
            None => ty,
        }
    }

    /// Strip exactly one level of sugar, or `None` if `ty` is not sugar.
    pub fn desugar_once(&self, ty: QualType) -> Option<QualType> {
        let inner = match self.get(ty.ty)? {
            TypeKind::Typedef { underlying, .. } => *underlying,
            TypeKind::Elaborated { named } => *named,
            TypeKind::SubstTemplateParm { replacement } => *replacement,
            TypeKind::TemplateSpecialization { aliased, .. } => (*aliased)?,
            _ => return None,
        };
        Some(inner.with_const(ty.is_const))
    }

    pub fn contains(&self, id: TypeId) -> bool {
        id.index() < self.kinds.len()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
