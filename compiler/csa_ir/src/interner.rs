//! String interner for identifier storage.
//!
//! One interner per translation unit. Units are analysed independently,
//! so the table is owned rather than shared and needs no locking.

use rustc_hash::FxHashMap;

use crate::Name;

/// String interner mapping identifiers to [`Name`]s.
///
/// Provides O(1) lookup and equality comparison for interned strings.
#[derive(Clone, Debug)]
pub struct StringInterner {
    /// Map from string content to index.
    map: FxHashMap<Box<str>, u32>,
    /// Storage for string contents, indexed by `Name::raw`.
    strings: Vec<Box<str>>,
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned.
    pub fn new() -> Self {
        let mut interner = StringInterner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        let empty = interner.intern("");
        debug_assert_eq!(empty, Name::EMPTY);
        interner
    }

    /// Intern a string, returning its `Name`.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` distinct strings are interned.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&idx) = self.map.get(s) {
            return Name::from_raw(idx);
        }
        let idx = u32::try_from(self.strings.len()).unwrap_or_else(|_| {
            panic!(
                "string interner exceeded capacity: {} strings",
                self.strings.len()
            )
        });
        let owned: Box<str> = s.into();
        self.strings.push(owned.clone());
        self.map.insert(owned, idx);
        Name::from_raw(idx)
    }

    /// Look up a previously interned name without inserting.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).map(|&idx| Name::from_raw(idx))
    }

    /// Look up the string for a `Name`.
    ///
    /// Unknown names resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &str {
        self.strings.get(name.index()).map_or("", |s| s)
    }

    /// Number of interned strings (including the empty string).
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}
