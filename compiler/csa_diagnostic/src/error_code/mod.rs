//! Finding codes for all checks.
//!
//! Each code is a unique identifier (e.g. `MA01`) used for `--explain`
//! lookups and for filtering. The two-letter prefix names the check family:
//! - MAxx: memory-allocator usage

use std::fmt;

/// Finding codes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Allocator not forwarded to an allocator-aware base or member
    MA01,
    /// Allocator trait mismatch, or allocator argument routed into a
    /// non-allocator parameter
    MA02,
    /// Constructor has no allocator-taking counterpart
    MA04,
}

impl ErrorCode {
    /// All codes, in numeric order.
    pub const ALL: &'static [ErrorCode] = &[ErrorCode::MA01, ErrorCode::MA02, ErrorCode::MA04];

    /// Get the code as a string (e.g. `"MA01"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MA01 => "MA01",
            ErrorCode::MA02 => "MA02",
            ErrorCode::MA04 => "MA04",
        }
    }

    /// One-line summary.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::MA01 => "allocator not passed to base or member",
            ErrorCode::MA02 => "allocator trait or allocator argument mismatch",
            ErrorCode::MA04 => "constructor cannot be called with an allocator",
        }
    }

    /// Whether the code belongs to the memory-allocator family.
    pub fn is_allocator_finding(&self) -> bool {
        self.as_str().starts_with("MA")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a code string like `"MA01"`.
///
/// Case-insensitive. Derived from [`ErrorCode::ALL`] and [`ErrorCode::as_str()`].
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
