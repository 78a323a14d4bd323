//! Strongly typed identifier wrappers.
//!
//! `TypeId` and `ExternalId` are `Copy + Ord + Hash` so they can be used as
//! map keys and sorted collection elements without ceremony.  `FileOffset` is
//! a plain `u64` alias because index code does arithmetic on it constantly
//! (delta coding, bitmap slot addressing).

use std::fmt;

/// Byte position into a flat data file; the stable identity of a record.
pub type FileOffset = u64;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Index of a record type in the upstream type configuration.
    pub struct TypeId(u16);
}

typed_id! {
    /// Identifier of a raw coordinate in the source dataset (OSM node id).
    /// May be negative for synthetic ids.
    pub struct ExternalId(i64);
}

impl TypeId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ExternalId {
    /// Order-preserving mapping of the signed id onto `u64`, used as the
    /// sorter key in the second deduplication pass.
    #[inline]
    pub fn sort_key(self) -> u64 {
        (self.0 as u64) ^ (1u64 << 63)
    }

    /// Inverse of [`sort_key`](Self::sort_key).
    #[inline]
    pub fn from_sort_key(key: u64) -> ExternalId {
        ExternalId((key ^ (1u64 << 63)) as i64)
    }
}
