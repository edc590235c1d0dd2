use crate::TagType;
use std::{
    error::Error,
    fmt::{self, Debug, Display, Formatter},
};

/// The category of an [`NbtStructureError`], for callers which need to react to a specific
/// violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureErrorKind {
    /// The handle does not refer to a live tag in the tree.
    InvalidHandle,
    /// The tag already belongs to a compound or list.
    AlreadyParented,
    /// The tag would become its own ancestor.
    Cycle,
    /// An unnamed tag was given to a compound.
    UnnamedInCompound,
    /// The compound already holds a member with that name.
    DuplicateName,
    /// The tag's name differs from the key it is being stored under.
    NameMismatch,
    /// The tag's type differs from the list's element type.
    ListTypeMismatch,
    /// No member with the given name exists.
    MissingTag,
    /// A list index was out of range.
    InvalidIndex,
    /// The tag is of a different type than the operation requires.
    TypeMismatch,
    /// The operation requires a tag without a parent.
    NotDetached,
    /// The tag is the root of a document, which must stay a detached, named compound.
    PinnedRoot,
}

/// An error raised when an operation would break the ownership or typing rules of an
/// [`NbtTree`](crate::NbtTree), or when a query does not match the structure of the tree.
///
/// These errors are raised by the call which attempts the violation; the tree is left unchanged.
#[repr(transparent)]
pub struct NbtStructureError {
    repr: NbtStructureErrorRepr,
}

impl NbtStructureError {
    /// Returns the category of this error.
    ///
    /// ```
    /// # use ember_nbt::*;
    /// let mut tree = NbtTree::new();
    /// let list = tree.create(NbtList::new());
    /// let int = tree.create(TagValue::Int(1));
    /// let string = tree.create(TagValue::from("a"));
    ///
    /// tree.push(list, int).unwrap();
    /// let error = tree.push(list, string).unwrap_err();
    /// assert_eq!(error.kind(), StructureErrorKind::ListTypeMismatch);
    /// ```
    pub fn kind(&self) -> StructureErrorKind {
        match &self.repr {
            NbtStructureErrorRepr::InvalidHandle => StructureErrorKind::InvalidHandle,
            NbtStructureErrorRepr::AlreadyParented => StructureErrorKind::AlreadyParented,
            NbtStructureErrorRepr::Cycle => StructureErrorKind::Cycle,
            NbtStructureErrorRepr::UnnamedInCompound => StructureErrorKind::UnnamedInCompound,
            NbtStructureErrorRepr::DuplicateName { .. } => StructureErrorKind::DuplicateName,
            NbtStructureErrorRepr::NameMismatch { .. } => StructureErrorKind::NameMismatch,
            NbtStructureErrorRepr::ListTypeMismatch { .. } => StructureErrorKind::ListTypeMismatch,
            NbtStructureErrorRepr::MissingTag { .. } => StructureErrorKind::MissingTag,
            NbtStructureErrorRepr::InvalidIndex { .. } => StructureErrorKind::InvalidIndex,
            NbtStructureErrorRepr::TypeMismatch { .. } => StructureErrorKind::TypeMismatch,
            NbtStructureErrorRepr::NotDetached => StructureErrorKind::NotDetached,
            NbtStructureErrorRepr::PinnedRoot => StructureErrorKind::PinnedRoot,
        }
    }

    pub(crate) fn invalid_handle() -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::InvalidHandle,
        }
    }

    pub(crate) fn already_parented() -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::AlreadyParented,
        }
    }

    pub(crate) fn cycle() -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::Cycle,
        }
    }

    pub(crate) fn unnamed_in_compound() -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::UnnamedInCompound,
        }
    }

    pub(crate) fn duplicate_name<T: Into<String>>(name: T) -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::DuplicateName {
                name: name.into().into_boxed_str(),
            },
        }
    }

    pub(crate) fn name_mismatch<K: Into<String>, N: Into<String>>(key: K, name: N) -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::NameMismatch {
                key: key.into().into_boxed_str(),
                name: name.into().into_boxed_str(),
            },
        }
    }

    pub(crate) fn list_type_mismatch(expected: TagType, found: TagType) -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::ListTypeMismatch { expected, found },
        }
    }

    pub(crate) fn missing_tag<T: Into<String>>(tag_name: T) -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::MissingTag {
                tag_name: tag_name.into().into_boxed_str(),
            },
        }
    }

    pub(crate) fn invalid_index(index: usize, length: usize) -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::InvalidIndex { index, length },
        }
    }

    pub(crate) fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::TypeMismatch { expected, found },
        }
    }

    pub(crate) fn not_detached() -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::NotDetached,
        }
    }

    pub(crate) fn pinned_root() -> Self {
        NbtStructureError {
            repr: NbtStructureErrorRepr::PinnedRoot,
        }
    }
}

impl Debug for NbtStructureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.repr, f)
    }
}

impl Display for NbtStructureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.repr {
            NbtStructureErrorRepr::InvalidHandle =>
                write!(f, "Tag handle does not refer to a live tag"),
            NbtStructureErrorRepr::AlreadyParented =>
                write!(f, "Tag already belongs to a compound or list"),
            NbtStructureErrorRepr::Cycle => write!(f, "A tag cannot be added to itself or to one of its descendants"),
            NbtStructureErrorRepr::UnnamedInCompound =>
                write!(f, "Only named tags may be added to a compound"),
            NbtStructureErrorRepr::DuplicateName { name } =>
                write!(f, "A tag named \"{}\" already exists in the compound", name),
            NbtStructureErrorRepr::NameMismatch { key, name } => write!(
                f,
                "Tag named \"{}\" cannot be stored under the key \"{}\"",
                name, key
            ),
            NbtStructureErrorRepr::ListTypeMismatch { expected, found } => write!(
                f,
                "List element type mismatch: expected {} but found {}",
                expected, found
            ),
            NbtStructureErrorRepr::MissingTag { tag_name } =>
                write!(f, "Missing tag \"{}\"", tag_name),
            NbtStructureErrorRepr::InvalidIndex { index, length } =>
                write!(f, "Index out of range: {} >= {}", index, length),
            NbtStructureErrorRepr::TypeMismatch { expected, found } => write!(
                f,
                "Tag type mismatch: expected {} but found {}",
                expected, found
            ),
            NbtStructureErrorRepr::NotDetached =>
                write!(f, "Tag must be detached from its parent first"),
            NbtStructureErrorRepr::PinnedRoot => write!(
                f,
                "The root of a document cannot be attached, unnamed or freed"
            ),
        }
    }
}

impl Error for NbtStructureError {}

#[derive(Debug)]
enum NbtStructureErrorRepr {
    InvalidHandle,
    AlreadyParented,
    Cycle,
    UnnamedInCompound,
    DuplicateName {
        name: Box<str>,
    },
    NameMismatch {
        key: Box<str>,
        name: Box<str>,
    },
    ListTypeMismatch {
        expected: TagType,
        found: TagType,
    },
    MissingTag {
        tag_name: Box<str>,
    },
    InvalidIndex {
        index: usize,
        length: usize,
    },
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    NotDetached,
    PinnedRoot,
}
