//! Byte ranges into the source file a unit was parsed from.

use std::fmt;

/// Half-open byte range `[start, end)`.
///
/// Declarations the compiler synthesized (implicit constructors, their
/// parameters) carry [`Span::DUMMY`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

crate::static_assert_size!(Span, 8);

impl Span {
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Width in bytes. Inverted spans are empty.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Nodes that know where they were written.
pub trait Spanned {
    fn span(&self) -> Span;
}
