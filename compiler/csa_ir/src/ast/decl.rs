//! Declaration nodes.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::{DeclId, ExprId, Name, QualType, Span, Spanned, TypeId};

/// A declaration in the unit.
///
/// `context` is the enclosing namespace or record, used to build
/// qualified names. Top-level declarations have none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decl {
    pub kind: DeclKind,
    pub name: Name,
    pub context: Option<DeclId>,
    pub span: Span,
}

impl Spanned for Decl {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclKind {
    Namespace,
    /// Class, struct or union, including class-template specializations.
    Record(RecordDecl),
    /// Primary class template. Only its name and context matter here.
    ClassTemplate,
    Constructor(ConstructorDecl),
    Parameter(ParamDecl),
    Field(FieldDecl),
    Typedef(TypedefDecl),
    /// User-defined conversion operator (`operator T()`).
    Conversion(ConversionDecl),
}

impl DeclKind {
    /// Short human name of the kind, for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            DeclKind::Namespace => "namespace",
            DeclKind::Record(_) => "record",
            DeclKind::ClassTemplate => "class template",
            DeclKind::Constructor(_) => "constructor",
            DeclKind::Parameter(_) => "parameter",
            DeclKind::Field(_) => "field",
            DeclKind::Typedef(_) => "typedef",
            DeclKind::Conversion(_) => "conversion",
        }
    }
}

bitflags! {
    /// Properties of a record declaration.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RecordFlags: u8 {
        /// Declared inside a function body.
        const LOCAL = 1 << 0;
        /// No non-static data members, no virtual functions, only empty bases.
        const EMPTY = 1 << 1;
    }
}

/// Template-specialization info carried by a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Specialization {
    /// The primary class template.
    pub template: DeclId,
    pub args: SmallVec<[QualType; 2]>,
    /// Written by the user (`template <> struct T<X> ...`) rather than
    /// implicitly instantiated.
    pub is_explicit: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordDecl {
    /// The `Record` type naming this declaration.
    pub ty: TypeId,
    /// Direct bases in declaration order.
    pub bases: Vec<QualType>,
    /// Canonical constructor declarations in declaration order.
    pub ctors: Vec<DeclId>,
    pub flags: RecordFlags,
    pub specialization: Option<Specialization>,
}

impl RecordDecl {
    #[inline]
    pub fn is_local(&self) -> bool {
        self.flags.contains(RecordFlags::LOCAL)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.contains(RecordFlags::EMPTY)
    }
}

/// Member access.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

bitflags! {
    /// Properties of a constructor declaration.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CtorFlags: u8 {
        /// This declaration carries the definition.
        const HAS_BODY = 1 << 0;
        /// Written by the user, not synthesized by the compiler.
        const USER_PROVIDED = 1 << 1;
        const DEFAULT_CTOR = 1 << 2;
        const COPY_CTOR = 1 << 3;
        const MOVE_CTOR = 1 << 4;
    }
}

/// Which special member a compiler-synthesized constructor is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImplicitCtorKind {
    Default,
    /// Copy or move constructor.
    Copy,
    /// Any other implicit constructor (inherited, converting).
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorDecl {
    /// Owning record.
    pub record: DeclId,
    /// Parameters in order.
    pub params: SmallVec<[DeclId; 4]>,
    pub inits: Vec<Initializer>,
    pub access: Access,
    pub flags: CtorFlags,
    /// First declaration of this constructor. Equal to the constructor's
    /// own id unless it is a redeclaration.
    pub canonical: DeclId,
}

impl ConstructorDecl {
    #[inline]
    pub fn is_user_provided(&self) -> bool {
        self.flags.contains(CtorFlags::USER_PROVIDED)
    }

    #[inline]
    pub fn is_copy_or_move(&self) -> bool {
        self.flags
            .intersects(CtorFlags::COPY_CTOR | CtorFlags::MOVE_CTOR)
    }

    pub fn implicit_kind(&self) -> ImplicitCtorKind {
        if self.flags.contains(CtorFlags::DEFAULT_CTOR) {
            ImplicitCtorKind::Default
        } else if self.is_copy_or_move() {
            ImplicitCtorKind::Copy
        } else {
            ImplicitCtorKind::Other
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    /// Type after array/function decay.
    pub ty: QualType,
    /// Type exactly as written.
    pub original_ty: QualType,
    /// Zero-based position.
    pub index: u32,
    pub default_arg: Option<ExprId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub ty: QualType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedefDecl {
    pub underlying: QualType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionDecl {
    /// Type converted to, as written.
    pub target: QualType,
}

/// What a constructor initializer initializes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InitTarget {
    Base(QualType),
    /// A field of the constructor's record.
    Member(DeclId),
}

/// One entry of a constructor's member-initializer list, written or implicit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Initializer {
    pub target: InitTarget,
    pub init: ExprId,
    /// Present in source rather than synthesized.
    pub is_written: bool,
    pub span: Span,
}

impl Spanned for Initializer {
    fn span(&self) -> Span {
        self.span
    }
}
