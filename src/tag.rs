use crate::{NbtStructureError, TagId};
use indexmap::IndexMap;
use std::{
    convert::TryFrom,
    fmt::{self, Display, Formatter},
};

/// The type code of an NBT tag, as it appears on the wire.
///
/// [`Unknown`](TagType::Unknown) is an in-memory sentinel used by lists which have not yet had their
/// element type fixed. It is never encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    /// Terminates the encoding of a compound.
    End = 0x0,
    /// An unsigned, one-byte integer.
    Byte = 0x1,
    /// A signed, two-byte integer.
    Short = 0x2,
    /// A signed, four-byte integer.
    Int = 0x3,
    /// A signed, eight-byte integer.
    Long = 0x4,
    /// A 32-bit floating point value.
    Float = 0x5,
    /// A 64-bit floating point value.
    Double = 0x6,
    /// A length-prefixed array of bytes.
    ByteArray = 0x7,
    /// A length-prefixed UTF-8 string.
    String = 0x8,
    /// A homogenous, ordered sequence of unnamed tags.
    List = 0x9,
    /// A set of uniquely named tags.
    Compound = 0xA,
    /// A length-prefixed array of signed, four-byte integers.
    IntArray = 0xB,
    /// The element type of a list which has not been fixed yet.
    Unknown = 0xFF,
}

impl TagType {
    /// Returns the wire code of this tag type.
    ///
    /// ```
    /// # use ember_nbt::TagType;
    /// assert_eq!(TagType::Compound.id(), 0x0A);
    /// ```
    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Maps a wire code to its tag type. Only codes which may legitimately appear in an encoded
    /// document are accepted, so `0xFF` yields `None`.
    ///
    /// ```
    /// # use ember_nbt::TagType;
    /// assert_eq!(TagType::from_id(0x08), Some(TagType::String));
    /// assert_eq!(TagType::from_id(0x0C), None);
    /// assert_eq!(TagType::from_id(0xFF), None);
    /// ```
    pub const fn from_id(id: u8) -> Option<Self> {
        let tag_type = match id {
            0x0 => TagType::End,
            0x1 => TagType::Byte,
            0x2 => TagType::Short,
            0x3 => TagType::Int,
            0x4 => TagType::Long,
            0x5 => TagType::Float,
            0x6 => TagType::Double,
            0x7 => TagType::ByteArray,
            0x8 => TagType::String,
            0x9 => TagType::List,
            0xA => TagType::Compound,
            0xB => TagType::IntArray,
            _ => return None,
        };

        Some(tag_type)
    }

    /// Returns the conventional name of this tag type, such as `TAG_Byte_Array`.
    pub const fn canonical_name(self) -> &'static str {
        match self {
            TagType::End => "TAG_End",
            TagType::Byte => "TAG_Byte",
            TagType::Short => "TAG_Short",
            TagType::Int => "TAG_Int",
            TagType::Long => "TAG_Long",
            TagType::Float => "TAG_Float",
            TagType::Double => "TAG_Double",
            TagType::ByteArray => "TAG_Byte_Array",
            TagType::String => "TAG_String",
            TagType::List => "TAG_List",
            TagType::Compound => "TAG_Compound",
            TagType::IntArray => "TAG_Int_Array",
            TagType::Unknown => "TAG_Unknown",
        }
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            TagType::End => "End",
            TagType::Byte => "Byte",
            TagType::Short => "Short",
            TagType::Int => "Int",
            TagType::Long => "Long",
            TagType::Float => "Float",
            TagType::Double => "Double",
            TagType::ByteArray => "ByteArray",
            TagType::String => "String",
            TagType::List => "List",
            TagType::Compound => "Compound",
            TagType::IntArray => "IntArray",
            TagType::Unknown => "Unknown",
        }
    }

    /// The encoded size of a payload of this type, if it does not depend on the payload.
    pub(crate) const fn fixed_size(self) -> Option<u64> {
        match self {
            TagType::Byte => Some(1),
            TagType::Short => Some(2),
            TagType::Int | TagType::Float => Some(4),
            TagType::Long | TagType::Double => Some(8),
            _ => None,
        }
    }

    /// Returns whether this type holds other tags.
    #[inline]
    pub const fn is_container(self) -> bool {
        matches!(self, TagType::List | TagType::Compound)
    }
}

impl Display for TagType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// The payload of a single tag.
///
/// Payloads are not `Clone`: a container payload names tags by handle, and a copy would give
/// those tags a second owner. Use [`NbtTree::deep_clone`](crate::NbtTree::deep_clone) instead.
///
/// Containers do not own their children directly: a [`List`](TagValue::List) or
/// [`Compound`](TagValue::Compound) holds the handles of tags living in the same
/// [`NbtTree`](crate::NbtTree). Comparing container payloads with `==` therefore compares handles,
/// not contents; use [`NbtTree::structurally_eq`](crate::NbtTree::structurally_eq) for that.
#[derive(Debug, PartialEq)]
pub enum TagValue {
    /// An unsigned, one-byte integer.
    Byte(u8),
    /// A signed, two-byte integer.
    Short(i16),
    /// A signed, four-byte integer.
    Int(i32),
    /// A signed, eight-byte integer.
    Long(i64),
    /// A 32-bit floating point value.
    Float(f32),
    /// A 64-bit floating point value.
    Double(f64),
    /// An owned buffer of bytes.
    ByteArray(Vec<u8>),
    /// A UTF-8 string.
    String(String),
    /// An NBT tag list.
    List(NbtList),
    /// An NBT tag compound.
    Compound(NbtCompound),
    /// An owned buffer of signed, four-byte integers.
    IntArray(Vec<i32>),
}

impl TagValue {
    /// Returns the zero or empty payload of the given type, or `None` for `End` and `Unknown`,
    /// which have no payload.
    ///
    /// ```
    /// # use ember_nbt::{TagType, TagValue};
    /// assert_eq!(TagValue::default_for(TagType::Int), Some(TagValue::Int(0)));
    /// assert_eq!(TagValue::default_for(TagType::End), None);
    /// ```
    pub fn default_for(tag_type: TagType) -> Option<Self> {
        let value = match tag_type {
            TagType::Byte => TagValue::Byte(0),
            TagType::Short => TagValue::Short(0),
            TagType::Int => TagValue::Int(0),
            TagType::Long => TagValue::Long(0),
            TagType::Float => TagValue::Float(0.0),
            TagType::Double => TagValue::Double(0.0),
            TagType::ByteArray => TagValue::ByteArray(Vec::new()),
            TagType::String => TagValue::String(String::new()),
            TagType::List => TagValue::List(NbtList::new()),
            TagType::Compound => TagValue::Compound(NbtCompound::new()),
            TagType::IntArray => TagValue::IntArray(Vec::new()),
            TagType::End | TagType::Unknown => return None,
        };

        Some(value)
    }

    /// Returns the type of this payload.
    pub const fn tag_type(&self) -> TagType {
        match self {
            TagValue::Byte(_) => TagType::Byte,
            TagValue::Short(_) => TagType::Short,
            TagValue::Int(_) => TagType::Int,
            TagValue::Long(_) => TagType::Long,
            TagValue::Float(_) => TagType::Float,
            TagValue::Double(_) => TagType::Double,
            TagValue::ByteArray(_) => TagType::ByteArray,
            TagValue::String(_) => TagType::String,
            TagValue::List(_) => TagType::List,
            TagValue::Compound(_) => TagType::Compound,
            TagValue::IntArray(_) => TagType::IntArray,
        }
    }

    /// Returns this value as a byte. Only byte tags convert.
    pub fn as_byte(&self) -> Result<u8, NbtStructureError> {
        match *self {
            TagValue::Byte(value) => Ok(value),
            _ => Err(self.mismatch("Byte")),
        }
    }

    /// Returns this value widened to a short. Bytes are zero-extended.
    pub fn as_short(&self) -> Result<i16, NbtStructureError> {
        match *self {
            TagValue::Byte(value) => Ok(i16::from(value)),
            TagValue::Short(value) => Ok(value),
            _ => Err(self.mismatch("Byte or Short")),
        }
    }

    /// Returns this value widened to an int.
    pub fn as_int(&self) -> Result<i32, NbtStructureError> {
        match *self {
            TagValue::Byte(value) => Ok(i32::from(value)),
            TagValue::Short(value) => Ok(i32::from(value)),
            TagValue::Int(value) => Ok(value),
            _ => Err(self.mismatch("Byte, Short or Int")),
        }
    }

    /// Returns this value widened to a long.
    pub fn as_long(&self) -> Result<i64, NbtStructureError> {
        match *self {
            TagValue::Byte(value) => Ok(i64::from(value)),
            TagValue::Short(value) => Ok(i64::from(value)),
            TagValue::Int(value) => Ok(i64::from(value)),
            TagValue::Long(value) => Ok(value),
            _ => Err(self.mismatch("Byte, Short, Int or Long")),
        }
    }

    /// Returns this value as a float. Ints and longs are rounded to the nearest representable
    /// float, which loses precision for magnitudes above 2^24.
    ///
    /// ```
    /// # use ember_nbt::TagValue;
    /// assert_eq!(TagValue::Long(16_777_217).as_float().unwrap(), 16_777_216.0);
    /// assert!(TagValue::Double(1.0).as_float().is_err());
    /// ```
    pub fn as_float(&self) -> Result<f32, NbtStructureError> {
        match *self {
            TagValue::Byte(value) => Ok(f32::from(value)),
            TagValue::Short(value) => Ok(f32::from(value)),
            TagValue::Int(value) => Ok(value as f32),
            TagValue::Long(value) => Ok(value as f32),
            TagValue::Float(value) => Ok(value),
            _ => Err(self.mismatch("Byte, Short, Int, Long or Float")),
        }
    }

    /// Returns this value as a double. Longs above 2^53 in magnitude are rounded.
    pub fn as_double(&self) -> Result<f64, NbtStructureError> {
        match *self {
            TagValue::Byte(value) => Ok(f64::from(value)),
            TagValue::Short(value) => Ok(f64::from(value)),
            TagValue::Int(value) => Ok(f64::from(value)),
            TagValue::Long(value) => Ok(value as f64),
            TagValue::Float(value) => Ok(f64::from(value)),
            TagValue::Double(value) => Ok(value),
            _ => Err(self.mismatch("Byte, Short, Int, Long, Float or Double")),
        }
    }

    /// Renders any scalar or string payload as text. Arrays and containers do not convert.
    ///
    /// ```
    /// # use ember_nbt::TagValue;
    /// assert_eq!(TagValue::Short(-4).as_string().unwrap(), "-4");
    /// assert_eq!(TagValue::Double(0.5).as_string().unwrap(), "0.5");
    /// assert!(TagValue::IntArray(vec![1]).as_string().is_err());
    /// ```
    pub fn as_string(&self) -> Result<String, NbtStructureError> {
        match self {
            TagValue::Byte(value) => Ok(value.to_string()),
            TagValue::Short(value) => Ok(value.to_string()),
            TagValue::Int(value) => Ok(value.to_string()),
            TagValue::Long(value) => Ok(value.to_string()),
            TagValue::Float(value) => Ok(value.to_string()),
            TagValue::Double(value) => Ok(value.to_string()),
            TagValue::String(value) => Ok(value.clone()),
            _ => Err(self.mismatch("a scalar or String")),
        }
    }

    /// Copies a payload which does not refer to other tags. Containers come back empty, keeping a
    /// list's element type.
    pub(crate) fn clone_leaf(&self) -> TagValue {
        match self {
            &TagValue::Byte(value) => TagValue::Byte(value),
            &TagValue::Short(value) => TagValue::Short(value),
            &TagValue::Int(value) => TagValue::Int(value),
            &TagValue::Long(value) => TagValue::Long(value),
            &TagValue::Float(value) => TagValue::Float(value),
            &TagValue::Double(value) => TagValue::Double(value),
            TagValue::ByteArray(value) => TagValue::ByteArray(value.clone()),
            TagValue::String(value) => TagValue::String(value.clone()),
            TagValue::IntArray(value) => TagValue::IntArray(value.clone()),
            TagValue::List(list) => TagValue::List(NbtList::with_type(list.element_type)),
            TagValue::Compound(_) => TagValue::Compound(NbtCompound::new()),
        }
    }

    #[inline]
    fn mismatch(&self, expected: &'static str) -> NbtStructureError {
        NbtStructureError::type_mismatch(expected, self.tag_type().name())
    }
}

// Implement the from trait for all the payload's internal types
macro_rules! value_from {
    ($($type:ty, $tag:ident);*) => {
        $(
            impl From<$type> for TagValue {
                fn from(value: $type) -> TagValue {
                    TagValue::$tag(value)
                }
            }
        )*
    };
}

value_from!(
    u8, Byte;
    i16, Short;
    i32, Int;
    i64, Long;
    f32, Float;
    f64, Double;
    Vec<u8>, ByteArray;
    String, String;
    NbtList, List;
    NbtCompound, Compound;
    Vec<i32>, IntArray
);

impl From<&str> for TagValue {
    fn from(value: &str) -> TagValue {
        TagValue::String(value.to_owned())
    }
}

impl From<&String> for TagValue {
    fn from(value: &String) -> TagValue {
        TagValue::String(value.clone())
    }
}

impl From<&[u8]> for TagValue {
    fn from(value: &[u8]) -> TagValue {
        TagValue::ByteArray(value.to_vec())
    }
}

impl From<&[i32]> for TagValue {
    fn from(value: &[i32]) -> TagValue {
        TagValue::IntArray(value.to_vec())
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> TagValue {
        TagValue::Byte(if value { 1 } else { 0 })
    }
}

impl From<i8> for TagValue {
    fn from(value: i8) -> Self {
        TagValue::Byte(value as u8)
    }
}

macro_rules! prim_from_value {
    ($($type:ty, $tag:ident);*) => {
        $(
            impl TryFrom<&TagValue> for $type {
                type Error = NbtStructureError;

                fn try_from(value: &TagValue) -> Result<Self, Self::Error> {
                    if let TagValue::$tag(value) = value {
                        Ok(*value)
                    } else {
                        Err(value.mismatch(stringify!($tag)))
                    }
                }
            }
        )*
    };
}

prim_from_value!(
    u8, Byte;
    i16, Short;
    i32, Int;
    i64, Long;
    f32, Float;
    f64, Double
);

macro_rules! ref_from_value {
    ($($type:ty, $tag:ident);*) => {
        $(
            impl<'a> TryFrom<&'a TagValue> for &'a $type {
                type Error = NbtStructureError;

                fn try_from(value: &'a TagValue) -> Result<Self, Self::Error> {
                    if let TagValue::$tag(inner) = value {
                        Ok(inner)
                    } else {
                        Err(value.mismatch(stringify!($tag)))
                    }
                }
            }
        )*
    };
}

ref_from_value!(
    [u8], ByteArray;
    str, String;
    [i32], IntArray;
    NbtList, List;
    NbtCompound, Compound
);

/// The payload of a list tag: the element type together with the handles of its elements, in
/// order.
///
/// Lists are only modified through their [`NbtTree`](crate::NbtTree), which keeps the element
/// type and the parent links of the elements consistent.
#[derive(Debug, PartialEq)]
pub struct NbtList {
    pub(crate) element_type: TagType,
    pub(crate) items: Vec<TagId>,
}

impl NbtList {
    /// Returns an empty list whose element type will be fixed by the first element added.
    pub const fn new() -> Self {
        Self::with_type(TagType::Unknown)
    }

    /// Returns an empty list which only accepts elements of the given type.
    pub const fn with_type(element_type: TagType) -> Self {
        NbtList {
            element_type,
            items: Vec::new(),
        }
    }

    /// Returns the element type of this list, which is `Unknown` until fixed.
    #[inline]
    pub fn element_type(&self) -> TagType {
        self.element_type
    }

    /// Returns the length of this list.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if this list has a length of zero, false otherwise.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the handle of the element at the given index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<TagId> {
        self.items.get(index).copied()
    }

    /// Returns the position of the given element in this list.
    pub fn index_of(&self, tag: TagId) -> Option<usize> {
        self.items.iter().position(|&item| item == tag)
    }

    /// Iterates over the handles of the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = TagId> + '_ {
        self.items.iter().copied()
    }

    /// Whether an element of the given type may be added. Empty lists typed `End` accept anything,
    /// since that is how empty lists are commonly encoded.
    pub(crate) fn accepts(&self, tag_type: TagType) -> bool {
        match self.element_type {
            TagType::Unknown => true,
            TagType::End => self.items.is_empty(),
            element_type => element_type == tag_type,
        }
    }
}

impl Default for NbtList {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[TagId]> for NbtList {
    fn as_ref(&self) -> &[TagId] {
        &self.items
    }
}

/// The payload of a compound tag: a mapping from member names to handles.
///
/// Members iterate in insertion order, so encoding a compound is deterministic.
#[derive(Debug, PartialEq)]
pub struct NbtCompound {
    pub(crate) entries: IndexMap<String, TagId>,
}

impl NbtCompound {
    /// Returns an empty compound.
    pub fn new() -> Self {
        NbtCompound {
            entries: IndexMap::new(),
        }
    }

    /// Returns the number of members in this compound.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the length of this compound is zero, false otherwise.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the handle of the member with the given name, if any.
    #[inline]
    pub fn get(&self, name: &str) -> Option<TagId> {
        self.entries.get(name).copied()
    }

    /// Returns whether or not this compound has a member with the given name.
    #[inline]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over the member names.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the member handles.
    pub fn children(&self) -> impl Iterator<Item = TagId> + '_ {
        self.entries.values().copied()
    }

    /// Iterates over `(name, handle)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TagId)> + '_ {
        self.entries
            .iter()
            .map(|(name, &tag)| (name.as_str(), tag))
    }
}

impl Default for NbtCompound {
    fn default() -> Self {
        Self::new()
    }
}
