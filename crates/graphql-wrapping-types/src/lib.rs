//! Compact representation of the list and non-null wrappers around a GraphQL named type.
//!
//! Wrappers are recorded from the inside out: the innermost type first, then every list
//! wrapping it. Each layer is independently nullable, so `[[T!]]!` and `[[T]!]` are distinct
//! values.

use std::fmt;

const INNER_IS_REQUIRED: u32 = 1;
const LIST_COUNT_SHIFT: u32 = 1;
const LIST_COUNT_MASK: u32 = 0b1_1111 << LIST_COUNT_SHIFT;
const LIST_FLAGS_SHIFT: u32 = 6;

/// How many lists can wrap a single named type.
pub const MAX_LIST_WRAPPINGS: usize = (u32::BITS - LIST_FLAGS_SHIFT) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ListWrapping {
    RequiredList,
    NullableList,
}

#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Wrapping(u32);

impl Wrapping {
    /// A bare nullable type: `T`.
    pub fn nullable() -> Self {
        Wrapping(0)
    }

    /// A bare required type: `T!`.
    pub fn required() -> Self {
        Wrapping(INNER_IS_REQUIRED)
    }

    pub fn inner_is_required(self) -> bool {
        self.0 & INNER_IS_REQUIRED != 0
    }

    pub fn is_list(self) -> bool {
        self.list_count() > 0
    }

    /// Whether the outermost layer is required, be it a list or the inner type.
    pub fn is_required(self) -> bool {
        match self.list_count() {
            0 => self.inner_is_required(),
            count => self.list_is_required(count - 1),
        }
    }

    /// Wraps the current type in a nullable list. `None` once [`MAX_LIST_WRAPPINGS`] is reached.
    pub fn list(self) -> Option<Self> {
        let count = self.list_count();

        if count >= MAX_LIST_WRAPPINGS {
            return None;
        }

        let without_count = self.0 & !LIST_COUNT_MASK;

        Some(Wrapping(without_count | (((count + 1) as u32) << LIST_COUNT_SHIFT)))
    }

    /// Wraps the current type in a required list.
    pub fn list_non_null(self) -> Option<Self> {
        self.list().map(Wrapping::non_null)
    }

    /// Makes the outermost layer required.
    #[must_use]
    pub fn non_null(self) -> Self {
        match self.list_count() {
            0 => Wrapping(self.0 | INNER_IS_REQUIRED),
            count => Wrapping(self.0 | list_flag(count - 1)),
        }
    }

    /// Makes the outermost layer nullable.
    #[must_use]
    pub fn without_non_null(self) -> Self {
        match self.list_count() {
            0 => Wrapping(self.0 & !INNER_IS_REQUIRED),
            count => Wrapping(self.0 & !list_flag(count - 1)),
        }
    }

    /// List wrappers, innermost first.
    pub fn list_wrappings(self) -> impl DoubleEndedIterator<Item = ListWrapping> + ExactSizeIterator {
        (0..self.list_count()).map(move |idx| {
            if self.list_is_required(idx) {
                ListWrapping::RequiredList
            } else {
                ListWrapping::NullableList
            }
        })
    }

    /// Displays `name` wrapped with the GraphQL bracket and bang syntax.
    pub fn display(self, name: &str) -> WrappedType<'_> {
        WrappedType { name, wrapping: self }
    }

    fn list_count(self) -> usize {
        ((self.0 & LIST_COUNT_MASK) >> LIST_COUNT_SHIFT) as usize
    }

    fn list_is_required(self, idx: usize) -> bool {
        self.0 & list_flag(idx) != 0
    }
}

fn list_flag(idx: usize) -> u32 {
    1 << (LIST_FLAGS_SHIFT + idx as u32)
}

impl fmt::Debug for Wrapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wrapping({})", self.display("T"))
    }
}

pub struct WrappedType<'a> {
    name: &'a str,
    wrapping: Wrapping,
}

impl fmt::Display for WrappedType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in self.wrapping.list_wrappings() {
            f.write_str("[")?;
        }

        f.write_str(self.name)?;

        if self.wrapping.inner_is_required() {
            f.write_str("!")?;
        }

        for list in self.wrapping.list_wrappings() {
            f.write_str("]")?;

            if list == ListWrapping::RequiredList {
                f.write_str("!")?;
            }
        }

        Ok(())
    }
}
