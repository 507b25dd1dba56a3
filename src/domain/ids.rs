// Typed indices into the problem axes
// Keeps operation, sub-operation and city positions from being mixed up

use std::fmt;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(usize);

        impl $name {
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> usize {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

typed_id!(
    /// Column of the operations matrix
    OperationId,
    "operation"
);
typed_id!(
    /// Row of the operations, times and costs matrices
    SubOperationId,
    "sub-operation"
);
typed_id!(
    /// Row/column of the distances matrix, column of times and costs
    CityId,
    "city"
);
