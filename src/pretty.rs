use crate::{NbtTree, Tag, TagId, TagValue};
use std::fmt::{self, Display, Formatter};

const DEFAULT_INDENT: &str = "  ";

/// Renders a tag and everything below it in a human-readable, line-based layout.
///
/// Each tag is written as `TAG_Kind("name"): value`, with the name omitted for unnamed tags and
/// tags with an empty name. Lists and compounds report their size and nest their members inside
/// braces.
///
/// ```
/// # use ember_nbt::*;
/// let mut tree = NbtTree::new();
/// let root = tree.create_named("root", NbtCompound::new());
/// let hp = tree.create_named("hp", 100i32);
/// let tags = tree.create_named("tags", NbtList::new());
/// let a = tree.create("a");
/// let b = tree.create("b");
/// tree.add(root, hp).unwrap();
/// tree.add(root, tags).unwrap();
/// tree.push(tags, a).unwrap();
/// tree.push(tags, b).unwrap();
///
/// assert_eq!(
///     tree.display(root).to_string(),
///     concat!(
///         "TAG_Compound(\"root\"): 2 entries {\n",
///         "  TAG_Int(\"hp\"): 100\n",
///         "  TAG_List(\"tags\"): 2 entries {\n",
///         "    TAG_String: \"a\"\n",
///         "    TAG_String: \"b\"\n",
///         "  }\n",
///         "}",
///     )
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TagDisplay<'a> {
    tree: &'a NbtTree,
    id: TagId,
    indent: &'a str,
}

impl<'a> TagDisplay<'a> {
    /// Uses the given string for each level of nesting instead of two spaces.
    pub fn with_indent(self, indent: &'a str) -> Self {
        TagDisplay { indent, ..self }
    }

    fn write_tag(&self, f: &mut Formatter<'_>, tag: &Tag, depth: usize) -> fmt::Result {
        for _ in 0 .. depth {
            f.write_str(self.indent)?;
        }

        f.write_str(tag.tag_type().canonical_name())?;
        match tag.name() {
            Some(name) if !name.is_empty() => write!(f, "({:?})", name)?,
            _ => (),
        }
        f.write_str(": ")?;

        match tag.value() {
            TagValue::Byte(value) => write!(f, "{}", value),
            TagValue::Short(value) => write!(f, "{}", value),
            TagValue::Int(value) => write!(f, "{}", value),
            TagValue::Long(value) => write!(f, "{}", value),
            TagValue::Float(value) => write!(f, "{}", value),
            TagValue::Double(value) => write!(f, "{}", value),
            TagValue::ByteArray(value) => write!(f, "[{} bytes]", value.len()),
            TagValue::String(value) => write!(f, "{:?}", value),
            TagValue::IntArray(value) => write!(f, "[{} ints]", value.len()),
            TagValue::List(list) => self.write_members(f, list.iter(), list.len(), depth),
            TagValue::Compound(compound) =>
                self.write_members(f, compound.children(), compound.len(), depth),
        }
    }

    fn write_members(
        &self,
        f: &mut Formatter<'_>,
        members: impl Iterator<Item = TagId>,
        len: usize,
        depth: usize,
    ) -> fmt::Result {
        write!(f, "{} entries {{", len)?;
        if len == 0 {
            return f.write_str("}");
        }

        for member in members {
            f.write_str("\n")?;
            let tag = self.tree.tag(member).map_err(|_| fmt::Error)?;
            self.write_tag(f, tag, depth + 1)?;
        }

        f.write_str("\n")?;
        for _ in 0 .. depth {
            f.write_str(self.indent)?;
        }
        f.write_str("}")
    }
}

impl Display for TagDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.tree.tag(self.id) {
            Ok(tag) => self.write_tag(f, tag, 0),
            Err(_) => f.write_str("<invalid tag>"),
        }
    }
}

impl NbtTree {
    /// Returns a [`Display`] adapter which pretty-prints the given tag and its descendants.
    pub fn display(&self, id: TagId) -> TagDisplay<'_> {
        TagDisplay {
            tree: self,
            id,
            indent: DEFAULT_INDENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn leaves_and_empty_containers() {
        let mut tree = NbtTree::new();
        let root = tree.create_named("", NbtCompound::new());
        let bytes = tree.create_named("b", vec![1u8, 2, 3]);
        let ints = tree.create_named("i", vec![7i32]);
        let empty = tree.create_named("e", NbtList::new());
        let quoted = tree.create_named("q", "say \"hi\"");
        tree.add(root, bytes).unwrap();
        tree.add(root, ints).unwrap();
        tree.add(root, empty).unwrap();
        tree.add(root, quoted).unwrap();

        let rendered = tree.display(root).with_indent("\t").to_string();
        assert_eq!(
            rendered,
            concat!(
                "TAG_Compound: 4 entries {\n",
                "\tTAG_Byte_Array(\"b\"): [3 bytes]\n",
                "\tTAG_Int_Array(\"i\"): [1 ints]\n",
                "\tTAG_List(\"e\"): 0 entries {}\n",
                "\tTAG_String(\"q\"): \"say \\\"hi\\\"\"\n",
                "}",
            )
        );
    }

    #[test]
    fn unnamed_root() {
        let mut tree = NbtTree::new();
        let root = tree.create(NbtCompound::new());
        let byte = tree.create_named("x", 5u8);
        tree.add(root, byte).unwrap();

        assert_eq!(
            tree.display(root).to_string(),
            "TAG_Compound: 1 entries {\n  TAG_Byte(\"x\"): 5\n}"
        );
    }
}
