use crate::{
    io::{self, Flavor, NbtIoError, NbtRead, TagProbe},
    NbtCompound,
    NbtStructureError,
    NbtTree,
    Tag,
    TagId,
    TagType,
};
use std::{
    fmt::{self, Display, Formatter},
    fs::File,
    io::{BufReader, BufWriter, Cursor, Write},
    path::Path,
};
use tracing::debug;

/// An NBT document: a tree together with its named root compound.
///
/// Loading replaces the document only once the whole input has been decoded successfully; a failed
/// load leaves the previous contents untouched.
///
/// ```
/// # use ember_nbt::{io::Flavor, *};
/// let mut file = NbtFile::with_root_name("level");
/// let root = file.root();
/// let seed = file.tree_mut().create_named("seed", 1234i64);
/// file.tree_mut().add(root, seed).unwrap();
///
/// let bytes = file.save_to_bytes(Flavor::ZlibCompressed).unwrap();
///
/// let mut loaded = NbtFile::new();
/// loaded.load_from_bytes(&bytes, Flavor::AutoDetect).unwrap();
/// assert_eq!(loaded.root_name(), "level");
///
/// let seed = loaded.lookup("seed").unwrap();
/// assert_eq!(loaded.tree().tag(seed).unwrap().value().as_long().unwrap(), 1234);
/// ```
#[derive(Debug)]
pub struct NbtFile {
    tree: NbtTree,
    root: TagId,
}

impl NbtFile {
    /// Returns a document holding an empty root compound with an empty name.
    pub fn new() -> Self {
        Self::with_root_name("")
    }

    /// Returns a document holding an empty root compound with the given name.
    pub fn with_root_name<N: Into<String>>(name: N) -> Self {
        let mut tree = NbtTree::new();
        let root = tree.create_named(name, NbtCompound::new());
        Self::pinned(tree, root)
    }

    /// Wraps an existing tree. The root must be a detached, named compound.
    pub fn from_parts(tree: NbtTree, root: TagId) -> Result<Self, NbtStructureError> {
        let tag = tree.tag(root)?;
        if tag.tag_type() != TagType::Compound {
            return Err(NbtStructureError::type_mismatch(
                "Compound",
                tag.tag_type().name(),
            ));
        }
        if tag.parent().is_some() {
            return Err(NbtStructureError::not_detached());
        }
        if tag.name().is_none() {
            return Err(NbtStructureError::unnamed_in_compound());
        }

        Ok(Self::pinned(tree, root))
    }

    /// Decodes a document from the given reader.
    pub fn from_reader<R: NbtRead>(reader: &mut R, flavor: Flavor) -> Result<Self, NbtIoError> {
        let (tree, root) = io::read_nbt(reader, flavor)?;
        Ok(Self::pinned(tree, root))
    }

    fn pinned(mut tree: NbtTree, root: TagId) -> Self {
        tree.pin_root(Some(root));
        NbtFile { tree, root }
    }

    /// Returns the handle of the root compound.
    #[inline]
    pub fn root(&self) -> TagId {
        self.root
    }

    /// Returns the tree holding the document.
    #[inline]
    pub fn tree(&self) -> &NbtTree {
        &self.tree
    }

    /// Returns the tree holding the document for modification. The root stays pinned: the tree
    /// refuses to attach it to a container, clear its name or free it.
    ///
    /// ```
    /// # use ember_nbt::*;
    /// let mut file = NbtFile::with_root_name("root");
    /// let root = file.root();
    /// let tree = file.tree_mut();
    ///
    /// let holder = tree.create_named("holder", NbtCompound::new());
    /// let error = tree.add(holder, root).unwrap_err();
    /// assert_eq!(error.kind(), StructureErrorKind::PinnedRoot);
    /// assert!(tree.clear_name(root).is_err());
    /// ```
    #[inline]
    pub fn tree_mut(&mut self) -> &mut NbtTree {
        &mut self.tree
    }

    /// Splits the document into its tree and root handle. The root is no longer pinned afterwards.
    pub fn into_parts(mut self) -> (NbtTree, TagId) {
        self.tree.pin_root(None);
        (self.tree, self.root)
    }

    /// Returns the name of the root compound.
    pub fn root_name(&self) -> &str {
        self.tree
            .tag(self.root)
            .ok()
            .and_then(Tag::name)
            .unwrap_or_default()
    }

    /// Renames the root compound in place.
    pub fn rename_root_tag<N: Into<String>>(&mut self, name: N) -> Result<(), NbtStructureError> {
        let name = name.into();
        debug!(from = self.root_name(), to = %name, "Renaming root tag");
        self.tree.set_name(self.root, name)
    }

    /// Resolves a path relative to the root compound, as [`NbtTree::resolve`] does.
    pub fn lookup(&self, path: &str) -> Result<TagId, NbtStructureError> {
        self.tree.resolve(self.root, path)
    }

    /// Replaces this document with one decoded from the given reader.
    pub fn load_from_reader<R: NbtRead>(
        &mut self,
        reader: &mut R,
        flavor: Flavor,
    ) -> Result<(), NbtIoError> {
        *self = Self::from_reader(reader, flavor)?;
        Ok(())
    }

    /// Replaces this document with one decoded from the given reader, skipping every tag below the
    /// root for which `selector` returns false.
    pub fn load_with_selector<R, S>(
        &mut self,
        reader: &mut R,
        flavor: Flavor,
        selector: S,
    ) -> Result<(), NbtIoError>
    where
        R: NbtRead,
        S: FnMut(&TagProbe<'_>) -> bool,
    {
        let (tree, root) = io::read_nbt_with(reader, flavor, selector)?;
        *self = Self::pinned(tree, root);
        Ok(())
    }

    /// Replaces this document with the contents of the file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P, flavor: Flavor) -> Result<(), NbtIoError> {
        let mut reader = BufReader::new(File::open(path)?);
        self.load_from_reader(&mut reader, flavor)
    }

    /// Replaces this document with one decoded from the given bytes.
    pub fn load_from_bytes(&mut self, bytes: &[u8], flavor: Flavor) -> Result<(), NbtIoError> {
        self.load_from_reader(&mut Cursor::new(bytes), flavor)
    }

    /// Encodes this document to the given writer.
    pub fn save_to_writer<W: Write>(&self, writer: &mut W, flavor: Flavor) -> Result<(), NbtIoError> {
        io::write_nbt(writer, &self.tree, self.root, flavor)
    }

    /// Encodes this document to the file at the given path, replacing its contents.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, flavor: Flavor) -> Result<(), NbtIoError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to_writer(&mut writer, flavor)?;
        writer.flush()?;
        Ok(())
    }

    /// Encodes this document into a new buffer.
    pub fn save_to_bytes(&self, flavor: Flavor) -> Result<Vec<u8>, NbtIoError> {
        let mut bytes = Vec::new();
        self.save_to_writer(&mut bytes, flavor)?;
        Ok(bytes)
    }

    /// Reads the name of the root compound of an encoded document, without decoding the rest.
    ///
    /// ```
    /// # use ember_nbt::{io::Flavor, *};
    /// # use std::io::Cursor;
    /// let bytes = NbtFile::with_root_name("hello").save_to_bytes(Flavor::GzCompressed).unwrap();
    /// let name = NbtFile::read_root_tag_name(&mut Cursor::new(bytes), Flavor::AutoDetect).unwrap();
    /// assert_eq!(name, "hello");
    /// ```
    pub fn read_root_tag_name<R: NbtRead>(reader: &mut R, flavor: Flavor) -> Result<String, NbtIoError> {
        io::read_root_name(reader, flavor)
    }

    /// Reads the name of the root compound of the file at the given path.
    pub fn read_root_tag_name_from_file<P: AsRef<Path>>(
        path: P,
        flavor: Flavor,
    ) -> Result<String, NbtIoError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_root_tag_name(&mut reader, flavor)
    }
}

impl Default for NbtFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for NbtFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.tree.display(self.root), f)
    }
}
