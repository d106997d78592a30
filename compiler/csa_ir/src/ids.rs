//! Arena indices for declarations, types and expressions.
//!
//! - `DeclId(u32)`, `TypeId(u32)`, `ExprId(u32)` instead of references
//! - Equality: O(1) integer compare
//! - Valid only for the unit that allocated them

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Invalid ID (sentinel value).
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Get the index into the arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw u32 value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", stringify!($name), self.0)
                } else {
                    write!(f, "{}::INVALID", stringify!($name))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

define_id!(
    /// Index into the declaration arena of a `TranslationUnit`.
    DeclId
);

define_id!(
    /// Index into the type arena of a `TranslationUnit`.
    ///
    /// Types are hash-consed: structurally identical types share one id.
    TypeId
);

define_id!(
    /// Index into the expression arena of a `TranslationUnit`.
    ExprId
);

/// Convert an arena length to a `u32` index.
///
/// # Panics
/// Panics if the arena holds more than `u32::MAX` entries.
#[inline]
pub(crate) fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("{what} arena exceeded u32::MAX entries"))
}

crate::static_assert_size!(DeclId, 4);
crate::static_assert_size!(TypeId, 4);
crate::static_assert_size!(ExprId, 4);
