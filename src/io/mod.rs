mod adler;
mod compression;
mod decode;
mod encode;
mod source;

pub use adler::Adler32;
pub use decode::TagProbe;
pub use source::{NbtRead, Streaming};

use crate::{NbtStructureError, NbtTree, TagId};
use compression::{resolve_flavor, Compressed, Decompressed};
use decode::{read_root_header, Decoder};
use encode::Encoder;
use flate2::Compression;
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    io::{self, Write},
};
use tracing::debug;

/// Describes the flavors of NBT data: uncompressed, Zlib compressed and Gz compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Uncompressed NBT data.
    Uncompressed,
    /// Zlib compressed NBT data. When writing, the default compression level will be used.
    ZlibCompressed,
    /// Zlib compressed NBT data with the given compression level.
    ZlibCompressedWith(Compression),
    /// Gz compressed NBT data. When writing, the default compression level will be used.
    GzCompressed,
    /// Gz compressed NBT data with the given compression level.
    GzCompressedWith(Compression),
    /// Read-only: the flavor is determined from the first byte of a seekable source. Byte `0x0A`
    /// means uncompressed, `0x1F` means Gz and `0x78` means Zlib.
    AutoDetect,
}

/// Reads the given flavor of NBT data from the given reader, returning a new tree together with the
/// handle of the root compound.
///
/// ```
/// # use ember_nbt::{io::{self, Flavor}, *};
/// # use std::io::Cursor;
/// let bytes = [0x0A, 0x00, 0x01, b'r', 0x03, 0x00, 0x02, b'h', b'p', 0x00, 0x00, 0x00, 0x64, 0x00];
///
/// let (tree, root) = io::read_nbt(&mut Cursor::new(bytes), Flavor::Uncompressed).unwrap();
/// assert_eq!(tree.tag(root).unwrap().name(), Some("r"));
///
/// let hp = tree.get(root, "hp").unwrap().unwrap();
/// assert_eq!(tree.tag(hp).unwrap().value(), &TagValue::Int(100));
/// ```
pub fn read_nbt<R: NbtRead>(reader: &mut R, flavor: Flavor) -> Result<(NbtTree, TagId), NbtIoError> {
    read_nbt_with(reader, flavor, |_: &TagProbe<'_>| true)
}

/// Reads NBT data like [`read_nbt`], consulting `selector` before each tag below the root is read.
/// Tags for which the selector returns false are skipped over, together with everything they
/// contain, and are absent from the returned tree.
///
/// ```
/// # use ember_nbt::{io::{self, Flavor, Streaming}, *};
/// let mut tree = NbtTree::new();
/// let root = tree.create_named("", NbtCompound::new());
/// for (name, value) in [("a", 1i32), ("b", 2), ("c", 3)] {
///     let tag = tree.create_named(name, value);
///     tree.add(root, tag).unwrap();
/// }
///
/// let mut bytes = Vec::new();
/// io::write_nbt(&mut bytes, &tree, root, Flavor::GzCompressed).unwrap();
///
/// let mut source = Streaming::new(bytes.as_slice());
/// let (read, root) = io::read_nbt_with(&mut source, Flavor::GzCompressed, |probe| {
///     probe.name() != Some("b")
/// })
/// .unwrap();
///
/// let names: Vec<_> = read.compound(root).unwrap().names().collect();
/// assert_eq!(names, ["a", "c"]);
/// ```
pub fn read_nbt_with<R, S>(
    reader: &mut R,
    flavor: Flavor,
    selector: S,
) -> Result<(NbtTree, TagId), NbtIoError>
where
    R: NbtRead,
    S: FnMut(&TagProbe<'_>) -> bool,
{
    let flavor = resolve_flavor(reader, flavor)?;
    let mut source = Decompressed::open(&mut *reader, flavor)?;

    let mut tree = NbtTree::new();
    let root = Decoder::new(&mut source, &mut tree, selector).read_root()?;
    source.finish()?;

    debug!(?flavor, tags = tree.len(), "Read NBT document");
    Ok((tree, root))
}

/// Reads only the name of the root compound, without decoding anything past it.
pub fn read_root_name<R: NbtRead>(reader: &mut R, flavor: Flavor) -> Result<String, NbtIoError> {
    let flavor = resolve_flavor(reader, flavor)?;
    let mut source = Decompressed::open(&mut *reader, flavor)?;
    read_root_header(&mut source)
}

/// Writes the given root compound and everything it contains to the given writer, using the given
/// flavor of compression. The root must be a named compound, though its name may be empty.
///
/// ```
/// # use ember_nbt::{io::{self, Flavor}, *};
/// let mut tree = NbtTree::new();
/// let root = tree.create_named("root", NbtCompound::new());
/// let hp = tree.create_named("hp", 100i32);
/// tree.add(root, hp).unwrap();
///
/// let mut bytes = Vec::new();
/// io::write_nbt(&mut bytes, &tree, root, Flavor::Uncompressed).unwrap();
/// assert_eq!(bytes, [
///     0x0A, 0x00, 0x04, b'r', b'o', b'o', b't',
///     0x03, 0x00, 0x02, b'h', b'p', 0x00, 0x00, 0x00, 0x64,
///     0x00,
/// ]);
///
/// assert!(io::write_nbt(&mut Vec::<u8>::new(), &tree, root, Flavor::AutoDetect).is_err());
/// ```
pub fn write_nbt<W: Write>(
    writer: &mut W,
    tree: &NbtTree,
    root: TagId,
    flavor: Flavor,
) -> Result<(), NbtIoError> {
    let mut encoder = Encoder::new(Compressed::open(&mut *writer, flavor)?, tree);
    encoder.write_root(root)?;
    encoder.into_inner().finish()?.flush()?;

    debug!(?flavor, "Wrote NBT document");
    Ok(())
}

/// Describes an error which occurred during the reading or writing of NBT data.
#[derive(Debug)]
pub enum NbtIoError {
    /// A native I/O error, including a source which ended early.
    StdIo(io::Error),
    /// The first tag ID was expected, but the second was found. Raised when a document does not
    /// start with a compound.
    TagTypeMismatch(u8, u8),
    /// An invalid tag ID was encountered.
    InvalidTagId(u8),
    /// A length or count field was negative.
    NegativeLength(i32),
    /// A string, array or list is too long to be encoded.
    LengthOverflow {
        /// The kind of value being encoded.
        kind: &'static str,
        /// The length which could not be encoded.
        length: usize,
    },
    /// An empty list whose element type was never fixed cannot be written.
    UnknownListType,
    /// The root compound has no name. An empty name is allowed.
    UnnamedRoot,
    /// A compound in the input contains two members with the same name.
    DuplicateName(String),
    /// The first byte of the input does not identify a known flavor, or the input is empty.
    UnrecognizedCompression(Option<u8>),
    /// Flavor detection was requested on a source which cannot be rewound.
    UnseekableSource,
    /// [`Flavor::AutoDetect`] was requested for writing.
    AutoDetectOnWrite,
    /// The two bytes of a zlib header are malformed.
    InvalidZlibHeader(u8, u8),
    /// The Adler-32 trailer of a zlib stream does not match the decompressed data.
    ChecksumMismatch {
        /// The checksum stored in the stream.
        expected: u32,
        /// The checksum of the data actually read.
        found: u32,
    },
    /// The tree being written violates one of its own rules, or a handle is stale.
    Structure(NbtStructureError),
}

impl From<io::Error> for NbtIoError {
    fn from(error: io::Error) -> Self {
        NbtIoError::StdIo(error)
    }
}

impl From<NbtStructureError> for NbtIoError {
    fn from(error: NbtStructureError) -> Self {
        NbtIoError::Structure(error)
    }
}

impl Display for NbtIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NbtIoError::StdIo(error) => write!(f, "{}", error),
            &NbtIoError::TagTypeMismatch(expected, found) => write!(
                f,
                "Tag type mismatch: expected 0x{:X} but found 0x{:X}",
                expected, found
            ),
            &NbtIoError::InvalidTagId(id) => write!(
                f,
                "Encountered invalid tag ID 0x{:X} during deserialization",
                id
            ),
            NbtIoError::NegativeLength(length) =>
                write!(f, "Encountered negative length {}", length),
            NbtIoError::LengthOverflow { kind, length } => write!(
                f,
                "{} of length {} is too long to be encoded",
                kind, length
            ),
            NbtIoError::UnknownListType =>
                write!(f, "Cannot write an empty list with no element type"),
            NbtIoError::UnnamedRoot => write!(f, "The root tag must be named"),
            NbtIoError::DuplicateName(name) =>
                write!(f, "Compound contains more than one tag named \"{}\"", name),
            NbtIoError::UnrecognizedCompression(Some(byte)) => write!(
                f,
                "Could not detect the compression of data starting with 0x{:02X}",
                byte
            ),
            NbtIoError::UnrecognizedCompression(None) =>
                write!(f, "Could not detect the compression of empty data"),
            NbtIoError::UnseekableSource =>
                write!(f, "Compression detection requires a seekable source"),
            NbtIoError::AutoDetectOnWrite =>
                write!(f, "A concrete compression flavor must be chosen for writing"),
            &NbtIoError::InvalidZlibHeader(cmf, flg) =>
                write!(f, "Invalid zlib header 0x{:02X} 0x{:02X}", cmf, flg),
            NbtIoError::ChecksumMismatch { expected, found } => write!(
                f,
                "Adler-32 mismatch: stream says 0x{:08X} but data sums to 0x{:08X}",
                expected, found
            ),
            NbtIoError::Structure(error) => write!(f, "{}", error),
        }
    }
}

impl Error for NbtIoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NbtIoError::StdIo(error) => Some(error),
            NbtIoError::Structure(error) => Some(error),
            _ => None,
        }
    }
}
