//! Interned resource/job identifiers.
//!
//! [`Name`] is the primary key for every resource, job, and semaphore the
//! render graph tracks. It is a hashed `u64`, `Copy`, and comparable in O(1) —
//! cheap enough to pass by value through `BuildContext` and `JobGraph` alike.

use std::fmt;

use xxhash_rust::xxh3::xxh3_64;

/// An interned, hashed identifier.
///
/// Two `Name`s constructed from the same string are always equal; the
/// original string is not retained, so `Name` carries no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u64);

impl Name {
    /// Hashes `s` into a `Name`.
    #[must_use]
    pub fn new(s: &str) -> Self {
        Self(xxh3_64(s.as_bytes()))
    }

    /// Raw hash value, useful as a dense array index or map key.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:#018x})", self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Builds a [`Name`] from a string literal at the call site.
///
/// ```ignore
/// let albedo = name!("gbuffer.albedo");
/// ```
#[macro_export]
macro_rules! name {
    ($s:expr) => {
        $crate::name::Name::new($s)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_hashes_equal() {
        assert_eq!(Name::new("gbuffer.albedo"), Name::new("gbuffer.albedo"));
    }

    #[test]
    fn different_strings_hash_differently() {
        assert_ne!(Name::new("gbuffer.albedo"), Name::new("gbuffer.normal"));
    }
}
