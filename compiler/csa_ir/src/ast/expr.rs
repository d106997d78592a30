//! Expression nodes.
//!
//! Only the shapes the allocator checks look through are modelled
//! precisely. Everything else is `Opaque`.

use smallvec::SmallVec;

use crate::{DeclId, ExprId, QualType, Span, Spanned};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Static type of the expression.
    pub ty: QualType,
    pub span: Span,
}

impl Expr {
    /// Argument slot filled from the parameter's default.
    #[inline]
    pub fn is_default_argument(&self) -> bool {
        matches!(self.kind, ExprKind::DefaultArgument(_))
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// Constructor call, explicit or implicit.
    Construct {
        ctor: DeclId,
        args: SmallVec<[ExprId; 4]>,
    },
    /// Temporary bound to a reference.
    MaterializeTemporary(ExprId),
    /// Temporary with a non-trivial destructor.
    BindTemporary(ExprId),
    /// Implicit conversion inserted by the front end.
    ImplicitCast(ExprId),
    /// Default argument of the given parameter.
    DefaultArgument(DeclId),
    DeclRef(DeclId),
    IntegerLiteral(u64),
    NullPointer,
    Opaque,
}

impl ExprKind {
    /// Direct sub-expressions in source order.
    pub fn children(&self) -> &[ExprId] {
        match self {
            ExprKind::Construct { args, .. } => args,
            ExprKind::MaterializeTemporary(sub)
            | ExprKind::BindTemporary(sub)
            | ExprKind::ImplicitCast(sub) => std::slice::from_ref(sub),
            ExprKind::DefaultArgument(_)
            | ExprKind::DeclRef(_)
            | ExprKind::IntegerLiteral(_)
            | ExprKind::NullPointer
            | ExprKind::Opaque => &[],
        }
    }
}
