#![deny(rust_2018_idioms)]
#![warn(missing_debug_implementations, missing_docs)]

/*!
Provides support for encoding and decoding Minecraft's NBT format. This crate supports both
zlib and gz compression, can detect which of the two a document uses, and can skip over parts
of a document while it is being read.

# Basic Usage

The basic unit of NBT data is the tag. Every tag lives in an [`NbtTree`], which owns all of its
tags and hands out [`TagId`] handles to address them. Compounds (named members) and lists
(ordered, homogenously typed elements) refer to their members by handle, and each member knows
its parent.

## Creating NBT Data

```
# use ember_nbt::*;
let mut tree = NbtTree::new();
let root = tree.create_named("root", NbtCompound::new());

let hp = tree.create_named("hp", 100i32);
tree.add(root, hp).unwrap();

let tags = tree.create_named("tags", NbtList::new());
tree.add(root, tags).unwrap();
for name in ["a", "b"] {
    let tag = tree.create(name);
    tree.push(tags, tag).unwrap();
}

assert_eq!(tree.compound(root).unwrap().len(), 2);
assert_eq!(tree.list(tags).unwrap().element_type(), TagType::String);
assert_eq!(tree.path(tree.resolve(root, "tags[1]").unwrap()).unwrap(), "root.tags[1]");
```

## Reading and Writing NBT

```
# use ember_nbt::*;
use ember_nbt::io::{self, Flavor};
use std::io::Cursor;

let mut tree = NbtTree::new();
let root = tree.create_named("root-tag", NbtCompound::new());
let foo = tree.create_named("foo", 123i32);
let bar = tree.create_named("bar", -3.6f32);
tree.add(root, foo).unwrap();
tree.add(root, bar).unwrap();

let mut binary: Vec<u8> = Vec::new();
io::write_nbt(&mut binary, &tree, root, Flavor::GzCompressed).unwrap();

let (read_tree, read_root) = io::read_nbt(&mut Cursor::new(binary), Flavor::AutoDetect).unwrap();
assert_eq!(read_tree.tag(read_root).unwrap().name(), Some("root-tag"));
assert!(tree.structurally_eq(root, &read_tree, read_root));
```

The [`NbtFile`] type bundles a tree with its root compound and offers file and buffer based
loading and saving on top of the functions in [`io`].

# Ownership Rules

A tag belongs to at most one container. Adding a tag which already has a parent is an error, as is
adding a tag to itself or to one of its own descendants. Compound members must be named and their
names must be unique, and list elements must all share the list's element type. Violations are
reported by the call which attempts them, as an [`NbtStructureError`]. The root compound of an
[`NbtFile`] is pinned: it cannot be added to a container, lose its name or be freed.

```
# use ember_nbt::*;
let mut tree = NbtTree::new();
let root = tree.create_named("root", NbtCompound::new());
let child = tree.create_named("child", NbtCompound::new());
tree.add(root, child).unwrap();

// Already parented
let error = tree.add(root, child).unwrap_err();
assert_eq!(error.kind(), StructureErrorKind::AlreadyParented);

// The root is an ancestor of child
let error = tree.add(child, root).unwrap_err();
assert_eq!(error.kind(), StructureErrorKind::Cycle);

// Unnamed tags cannot live in a compound
let unnamed = tree.create(5i16);
let error = tree.add(root, unnamed).unwrap_err();
assert_eq!(error.kind(), StructureErrorKind::UnnamedInCompound);
```

# Querying Tags

Payloads are read through the tree. Numeric payloads can be widened along the chain
byte, short, int, long, float, double, and every scalar can be rendered as a string. An error
converting a payload is represented by an [`NbtStructureError`].

```
# use ember_nbt::*;
use std::convert::TryFrom;

let value: TagValue = 7u8.into();
assert_eq!(value.as_int().unwrap(), 7);
assert_eq!(value.as_double().unwrap(), 7.0);
assert_eq!(value.as_string().unwrap(), "7");

assert!(i32::try_from(&value).is_err()); // Exact conversions only
assert!(TagValue::Float(1.5).as_long().is_err()); // No narrowing
```

# Selective Loading

A selector passed to [`io::read_nbt_with`] is consulted before each tag below the root is read,
and sees the tag's name, type and position. Rejected tags are skipped over together with their
contents, by seeking where the source allows it.

```
# use ember_nbt::{io::{self, Flavor}, *};
# use std::io::Cursor;
let mut tree = NbtTree::new();
let root = tree.create_named("chunk", NbtCompound::new());
let blocks = tree.create_named("blocks", vec![0u8; 4096]);
let version = tree.create_named("version", 3i32);
tree.add(root, blocks).unwrap();
tree.add(root, version).unwrap();

let mut bytes = Vec::new();
io::write_nbt(&mut bytes, &tree, root, Flavor::Uncompressed).unwrap();

let (read, root) = io::read_nbt_with(&mut Cursor::new(bytes), Flavor::Uncompressed, |probe| {
    probe.tag_type() != TagType::ByteArray
})
.unwrap();
assert_eq!(read.get(root, "blocks").unwrap(), None);
assert!(read.get(root, "version").unwrap().is_some());
```

[`NbtCompound`]: crate::NbtCompound
[`NbtFile`]: crate::NbtFile
[`NbtList`]: crate::NbtList
[`NbtTree`]: crate::NbtTree
[`TagId`]: crate::TagId
*/

mod error;
mod file;
/// Provides the encoding and decoding of whole documents, compression handling and the sources
/// the decoder reads from.
pub mod io;
mod pretty;
mod raw;
mod tag;
mod tree;

pub use error::*;
pub use file::*;
pub use pretty::*;
pub use tag::*;
pub use tree::*;
