//! Strongly typed, zero-cost identifier wrappers.
//!
//! Resource, process, and metric ids are dense indices assigned in
//! declaration order when a configuration is validated, so they index
//! directly into the `Vec`s owned by a run.  Entity and unit ids are
//! monotonically increasing sequence numbers.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a resource in declaration order.
    pub struct ResourceId(u32);
}

typed_id! {
    /// Index of a process in declaration order.
    pub struct ProcessId(u32);
}

typed_id! {
    /// Index of a declared metric in declaration order.
    pub struct MetricId(u32);
}

typed_id! {
    /// Sequence number of a generated entity.
    pub struct EntityId(u64);
}

typed_id! {
    /// Handle of a scheduled unit (entity generator or process interpreter).
    pub struct UnitId(u64);
}
