use super::{NbtIoError, NbtRead};
use crate::{raw, tree::Tag, NbtCompound, NbtList, NbtTree, TagId, TagType, TagValue};
use std::collections::HashSet;
use tracing::trace;

/// What is known about a tag when the selector is consulted: its name, its type and where it would
/// be placed. The payload has not been read yet.
#[derive(Debug, Clone, Copy)]
pub struct TagProbe<'a> {
    tree: &'a NbtTree,
    parent: TagId,
    name: Option<&'a str>,
    tag_type: TagType,
    index: Option<usize>,
}

impl<'a> TagProbe<'a> {
    /// Returns the name of the tag, or `None` for list elements.
    #[inline]
    pub fn name(&self) -> Option<&'a str> {
        self.name
    }

    /// Returns the type of the tag.
    #[inline]
    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    /// Returns the compound or list the tag would be added to.
    #[inline]
    pub fn parent(&self) -> TagId {
        self.parent
    }

    /// Returns the position of the tag within the encoded list holding it, or `None` for compound
    /// members.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Returns the partially decoded tree, in which every ancestor of the tag is already present.
    #[inline]
    pub fn tree(&self) -> &'a NbtTree {
        self.tree
    }

    /// Returns the path the tag would have once decoded, in the format of
    /// [`NbtTree::path`](crate::NbtTree::path).
    ///
    /// ```
    /// # use ember_nbt::{io::{self, Flavor}, *};
    /// # use std::io::Cursor;
    /// let mut tree = NbtTree::new();
    /// let root = tree.create_named("level", NbtCompound::new());
    /// let player = tree.create_named("player", NbtCompound::new());
    /// let name = tree.create_named("name", "Steve");
    /// tree.add(root, player).unwrap();
    /// tree.add(player, name).unwrap();
    ///
    /// let mut bytes = Vec::new();
    /// io::write_nbt(&mut bytes, &tree, root, Flavor::Uncompressed).unwrap();
    ///
    /// let mut seen = Vec::new();
    /// io::read_nbt_with(&mut Cursor::new(bytes), Flavor::Uncompressed, |probe| {
    ///     seen.push(probe.path());
    ///     true
    /// })
    /// .unwrap();
    /// assert_eq!(seen, ["level.player", "level.player.name"]);
    /// ```
    pub fn path(&self) -> String {
        let mut path = self.tree.path(self.parent).unwrap_or_default();
        match (self.index, self.name) {
            (Some(index), _) => path.push_str(&format!("[{}]", index)),
            (None, Some(name)) => {
                path.push('.');
                path.push_str(name);
            }
            (None, None) => (),
        }
        path
    }
}

/// Drives the recursive decoding of one document into a tree.
pub(crate) struct Decoder<'a, R, S> {
    reader: &'a mut R,
    tree: &'a mut NbtTree,
    selector: S,
    scratch: Vec<u8>,
}

impl<'a, R, S> Decoder<'a, R, S>
where
    R: NbtRead,
    S: FnMut(&TagProbe<'_>) -> bool,
{
    pub(crate) fn new(reader: &'a mut R, tree: &'a mut NbtTree, selector: S) -> Self {
        Decoder {
            reader,
            tree,
            selector,
            scratch: Vec::new(),
        }
    }

    /// Reads the named root compound, which is never offered to the selector.
    pub(crate) fn read_root(&mut self) -> Result<TagId, NbtIoError> {
        let name = read_root_header(self.reader)?;
        let root = self.tree.insert(Tag {
            name: Some(name),
            parent: None,
            value: TagValue::Compound(NbtCompound::new()),
        });

        self.read_compound(root)?;
        Ok(root)
    }

    fn select(
        &mut self,
        parent: TagId,
        name: Option<&str>,
        tag_type: TagType,
        index: Option<usize>,
    ) -> bool {
        let probe = TagProbe {
            tree: &*self.tree,
            parent,
            name,
            tag_type,
            index,
        };

        let keep = (self.selector)(&probe);
        if !keep {
            trace!(
                name = name.unwrap_or_default(),
                index,
                tag_type = tag_type.name(),
                "Skipping tag rejected by selector"
            );
        }
        keep
    }

    fn read_compound(&mut self, compound: TagId) -> Result<(), NbtIoError> {
        // Names of skipped members count as well
        let mut seen = HashSet::new();

        loop {
            let id = raw::read_u8(self.reader)?;
            if id == TagType::End.id() {
                return Ok(());
            }

            let tag_type = TagType::from_id(id).ok_or(NbtIoError::InvalidTagId(id))?;
            let name = raw::read_string(self.reader)?;

            if !seen.insert(name.clone()) {
                return Err(NbtIoError::DuplicateName(name));
            }

            if self.select(compound, Some(&name), tag_type, None) {
                self.read_tag(compound, Some(name), tag_type)?;
            } else {
                self.skip_payload(tag_type)?;
            }
        }
    }

    fn read_list(
        &mut self,
        list: TagId,
        element_type: TagType,
        len: usize,
    ) -> Result<(), NbtIoError> {
        for index in 0 .. len {
            if self.select(list, None, element_type, Some(index)) {
                self.read_tag(list, None, element_type)?;
            } else {
                self.skip_payload(element_type)?;
            }
        }

        Ok(())
    }

    /// Reads a payload of the given type and attaches it to `parent`.
    fn read_tag(
        &mut self,
        parent: TagId,
        name: Option<String>,
        tag_type: TagType,
    ) -> Result<TagId, NbtIoError> {
        let id = match tag_type {
            TagType::Compound => {
                let id = self.attach(parent, name, TagValue::Compound(NbtCompound::new()))?;
                self.read_compound(id)?;
                id
            }
            TagType::List => {
                let (element_type, len) = read_list_header(self.reader)?;
                let id = self.attach(parent, name, TagValue::List(NbtList::with_type(element_type)))?;
                self.read_list(id, element_type, len)?;
                id
            }
            _ => {
                let value = self.read_value(tag_type)?;
                self.attach(parent, name, value)?
            }
        };

        Ok(id)
    }

    fn read_value(&mut self, tag_type: TagType) -> Result<TagValue, NbtIoError> {
        let reader = &mut *self.reader;

        let value = match tag_type {
            TagType::Byte => TagValue::Byte(raw::read_u8(reader)?),
            TagType::Short => TagValue::Short(raw::read_i16(reader)?),
            TagType::Int => TagValue::Int(raw::read_i32(reader)?),
            TagType::Long => TagValue::Long(raw::read_i64(reader)?),
            TagType::Float => TagValue::Float(raw::read_f32(reader)?),
            TagType::Double => TagValue::Double(raw::read_f64(reader)?),
            TagType::ByteArray => {
                let len = raw::read_len(reader)?;
                TagValue::ByteArray(raw::read_bytes(reader, len)?)
            }
            TagType::String => TagValue::String(raw::read_string(reader)?),
            TagType::IntArray => {
                let len = raw::read_len(reader)?;
                TagValue::IntArray(raw::read_int_array(reader, len)?)
            }
            TagType::End | TagType::List | TagType::Compound | TagType::Unknown =>
                return Err(NbtIoError::InvalidTagId(tag_type.id())),
        };

        Ok(value)
    }

    fn attach(
        &mut self,
        parent: TagId,
        name: Option<String>,
        value: TagValue,
    ) -> Result<TagId, NbtIoError> {
        let id = self.tree.insert(Tag {
            name,
            parent: None,
            value,
        });
        self.tree.attach_unchecked(parent, id)?;
        Ok(id)
    }

    /// Advances past a payload of the given type without materializing it.
    fn skip_payload(&mut self, tag_type: TagType) -> Result<(), NbtIoError> {
        if let Some(size) = tag_type.fixed_size() {
            raw::skip(self.reader, size, &mut self.scratch)?;
            return Ok(());
        }

        match tag_type {
            TagType::ByteArray => {
                let len = raw::read_len(self.reader)?;
                raw::skip(self.reader, len as u64, &mut self.scratch)?;
            }
            TagType::IntArray => {
                let len = raw::read_len(self.reader)?;
                raw::skip(self.reader, len as u64 * 4, &mut self.scratch)?;
            }
            TagType::String => raw::skip_string(self.reader, &mut self.scratch)?,
            TagType::List => {
                let (element_type, len) = read_list_header(self.reader)?;
                match element_type.fixed_size() {
                    Some(size) => raw::skip(self.reader, size * len as u64, &mut self.scratch)?,
                    None =>
                        for _ in 0 .. len {
                            self.skip_payload(element_type)?;
                        },
                }
            }
            TagType::Compound => loop {
                let id = raw::read_u8(self.reader)?;
                if id == TagType::End.id() {
                    break;
                }

                let tag_type = TagType::from_id(id).ok_or(NbtIoError::InvalidTagId(id))?;
                raw::skip_string(self.reader, &mut self.scratch)?;
                self.skip_payload(tag_type)?;
            },
            // An empty list of End elements has nothing to skip
            TagType::End => (),
            _ => return Err(NbtIoError::InvalidTagId(tag_type.id())),
        }

        Ok(())
    }
}

/// Reads the type code and name of a document's root tag, which must be a compound.
pub(crate) fn read_root_header<R: NbtRead>(reader: &mut R) -> Result<String, NbtIoError> {
    let id = raw::read_u8(reader)?;
    if id != TagType::Compound.id() {
        return Err(NbtIoError::TagTypeMismatch(TagType::Compound.id(), id));
    }

    raw::read_string(reader)
}

fn read_list_header<R: NbtRead>(reader: &mut R) -> Result<(TagType, usize), NbtIoError> {
    let id = raw::read_u8(reader)?;
    let len = raw::read_len(reader)?;

    match TagType::from_id(id) {
        // A list of End tags has no elements to encode, so only an empty one is meaningful
        Some(TagType::End) if len > 0 => Err(NbtIoError::InvalidTagId(id)),
        Some(element_type) => Ok((element_type, len)),
        None => Err(NbtIoError::InvalidTagId(id)),
    }
}
