use super::NbtIoError;
use crate::{raw, NbtTree, TagId, TagType, TagValue};
use std::io::Write;

/// Writes tags of a tree to a sink in their wire encoding.
pub(crate) struct Encoder<'a, W> {
    writer: W,
    tree: &'a NbtTree,
}

impl<'a, W: Write> Encoder<'a, W> {
    pub(crate) fn new(writer: W, tree: &'a NbtTree) -> Self {
        Encoder { writer, tree }
    }

    pub(crate) fn into_inner(self) -> W {
        self.writer
    }

    /// Writes the given compound as the named root of a document.
    pub(crate) fn write_root(&mut self, root: TagId) -> Result<(), NbtIoError> {
        let tag = self.tree.tag(root)?;
        if tag.tag_type() != TagType::Compound {
            return Err(NbtIoError::TagTypeMismatch(
                TagType::Compound.id(),
                tag.tag_type().id(),
            ));
        }
        if tag.name().is_none() {
            return Err(NbtIoError::UnnamedRoot);
        }

        self.write_named(root)
    }

    /// Writes the type code, name and payload of a tag.
    fn write_named(&mut self, id: TagId) -> Result<(), NbtIoError> {
        let tree = self.tree;
        let tag = tree.tag(id)?;
        raw::write_u8(&mut self.writer, tag.tag_type().id())?;
        raw::write_string(&mut self.writer, tag.name().unwrap_or_default())?;
        self.write_payload(tag.value())
    }

    /// Writes a payload only, as used for list elements.
    fn write_payload(&mut self, value: &TagValue) -> Result<(), NbtIoError> {
        let tree = self.tree;
        let writer = &mut self.writer;

        match value {
            &TagValue::Byte(value) => raw::write_u8(writer, value)?,
            &TagValue::Short(value) => raw::write_i16(writer, value)?,
            &TagValue::Int(value) => raw::write_i32(writer, value)?,
            &TagValue::Long(value) => raw::write_i64(writer, value)?,
            &TagValue::Float(value) => raw::write_f32(writer, value)?,
            &TagValue::Double(value) => raw::write_f64(writer, value)?,
            TagValue::ByteArray(value) => {
                raw::write_len(writer, "ByteArray", value.len())?;
                writer.write_all(value)?;
            }
            TagValue::String(value) => raw::write_string(writer, value)?,
            TagValue::IntArray(value) => {
                raw::write_len(writer, "IntArray", value.len())?;
                for &int in value.iter() {
                    raw::write_i32(writer, int)?;
                }
            }
            TagValue::List(list) => {
                if list.element_type() == TagType::Unknown {
                    return Err(NbtIoError::UnknownListType);
                }

                raw::write_u8(writer, list.element_type().id())?;
                raw::write_len(writer, "List", list.len())?;
                for element in list.iter() {
                    let tag = tree.tag(element)?;
                    self.write_payload(tag.value())?;
                }
            }
            TagValue::Compound(compound) => {
                for member in compound.children() {
                    self.write_named(member)?;
                }

                raw::write_u8(&mut self.writer, TagType::End.id())?;
            }
        }

        Ok(())
    }
}
