use super::{
    adler::{AdlerReader, AdlerWriter},
    Flavor,
    NbtIoError,
    NbtRead,
};
use crate::raw;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::{
    bufread::{DeflateDecoder, GzDecoder},
    write::{DeflateEncoder, GzEncoder},
    Compression,
};
use std::io::{self, BufReader, BufWriter, Read, Write};
use tracing::debug;

/// Capacity of the buffers placed around compressed streams.
pub(crate) const BUFFER_SIZE: usize = 8 * 1024;

const GZIP_MAGIC: u8 = 0x1F;
const ZLIB_CMF: u8 = 0x78;

/// Resolves [`Flavor::AutoDetect`] by peeking at the first byte of a seekable source. Other
/// flavors are returned unchanged.
pub(crate) fn resolve_flavor<R: NbtRead>(
    reader: &mut R,
    flavor: Flavor,
) -> Result<Flavor, NbtIoError> {
    if flavor != Flavor::AutoDetect {
        return Ok(flavor);
    }

    if !reader.is_seekable() {
        return Err(NbtIoError::UnseekableSource);
    }

    let mut first = [0u8; 1];
    if reader.read(&mut first)? == 0 {
        return Err(NbtIoError::UnrecognizedCompression(None));
    }
    reader.seek_relative(-1)?;

    let detected = match first[0] {
        0x0A => Flavor::Uncompressed,
        GZIP_MAGIC => Flavor::GzCompressed,
        ZLIB_CMF => Flavor::ZlibCompressed,
        other => return Err(NbtIoError::UnrecognizedCompression(Some(other))),
    };

    debug!(flavor = ?detected, "Detected NBT compression");
    Ok(detected)
}

/// The zlib header flag byte paired with `0x78` for the given compression level.
fn zlib_flags(compression: Compression) -> u8 {
    match compression.level() {
        0 ..= 1 => 0x01,
        2 ..= 5 => 0x5E,
        6 => 0x9C,
        _ => 0xDA,
    }
}

fn check_zlib_header(cmf: u8, flg: u8) -> Result<(), NbtIoError> {
    let deflate = cmf & 0x0F == 8;
    let window_ok = cmf >> 4 <= 7;
    let check_ok = (u16::from(cmf) << 8 | u16::from(flg)) % 31 == 0;
    let no_dictionary = flg & 0x20 == 0;

    if deflate && window_ok && check_ok && no_dictionary {
        Ok(())
    } else {
        Err(NbtIoError::InvalidZlibHeader(cmf, flg))
    }
}

/// The decompressed view of an NBT source.
pub(crate) enum Decompressed<R: Read> {
    Plain(R),
    Gz(BufReader<GzDecoder<BufReader<R>>>),
    Zlib(BufReader<AdlerReader<DeflateDecoder<BufReader<R>>>>),
}

impl<R: Read> Decompressed<R> {
    /// Wraps the source according to a resolved flavor, consuming the zlib header if there is one.
    pub(crate) fn open(mut reader: R, flavor: Flavor) -> Result<Self, NbtIoError> {
        let decompressed = match flavor {
            Flavor::Uncompressed => Decompressed::Plain(reader),
            Flavor::GzCompressed | Flavor::GzCompressedWith(_) => Decompressed::Gz(
                BufReader::with_capacity(
                    BUFFER_SIZE,
                    GzDecoder::new(BufReader::with_capacity(BUFFER_SIZE, reader)),
                ),
            ),
            Flavor::ZlibCompressed | Flavor::ZlibCompressedWith(_) => {
                let cmf = raw::read_u8(&mut reader)?;
                let flg = raw::read_u8(&mut reader)?;
                check_zlib_header(cmf, flg)?;

                Decompressed::Zlib(BufReader::with_capacity(
                    BUFFER_SIZE,
                    AdlerReader::new(DeflateDecoder::new(BufReader::with_capacity(
                        BUFFER_SIZE,
                        reader,
                    ))),
                ))
            }
            Flavor::AutoDetect => return Err(NbtIoError::UnseekableSource),
        };

        Ok(decompressed)
    }

    /// Completes decoding. For compressed sources the remainder of the body is consumed and the
    /// trailer is verified: the CRC-32 and length of a gzip member, or the Adler-32 of a zlib stream.
    pub(crate) fn finish(self) -> Result<(), NbtIoError> {
        match self {
            Decompressed::Plain(_) => Ok(()),
            Decompressed::Gz(mut reader) => {
                // flate2 checks the gzip trailer once the member is read to its end
                io::copy(&mut reader, &mut io::sink())?;
                Ok(())
            }
            Decompressed::Zlib(mut reader) => {
                io::copy(&mut reader, &mut io::sink())?;

                let adler = reader.get_mut();
                let found = adler.checksum();
                let expected = adler.get_mut().get_mut().read_u32::<BigEndian>()?;

                if expected == found {
                    Ok(())
                } else {
                    Err(NbtIoError::ChecksumMismatch { expected, found })
                }
            }
        }
    }
}

impl<R: Read> Read for Decompressed<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Decompressed::Plain(reader) => reader.read(buf),
            Decompressed::Gz(reader) => reader.read(buf),
            Decompressed::Zlib(reader) => reader.read(buf),
        }
    }
}

impl<R: NbtRead> NbtRead for Decompressed<R> {
    fn is_seekable(&self) -> bool {
        match self {
            Decompressed::Plain(reader) => reader.is_seekable(),
            _ => false,
        }
    }

    fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
        match self {
            Decompressed::Plain(reader) => reader.seek_relative(offset),
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "cannot seek within a compressed stream",
            )),
        }
    }
}

/// The compressing view of an NBT sink.
pub(crate) enum Compressed<W: Write> {
    Plain(W),
    Gz(BufWriter<GzEncoder<W>>),
    Zlib(BufWriter<AdlerWriter<DeflateEncoder<W>>>),
}

impl<W: Write> Compressed<W> {
    /// Wraps the sink according to the flavor, writing the zlib header if there is one.
    pub(crate) fn open(mut writer: W, flavor: Flavor) -> Result<Self, NbtIoError> {
        let compressed = match flavor {
            Flavor::Uncompressed => Compressed::Plain(writer),
            Flavor::GzCompressed => Compressed::Gz(BufWriter::with_capacity(
                BUFFER_SIZE,
                GzEncoder::new(writer, Compression::default()),
            )),
            Flavor::GzCompressedWith(compression) => Compressed::Gz(BufWriter::with_capacity(
                BUFFER_SIZE,
                GzEncoder::new(writer, compression),
            )),
            Flavor::ZlibCompressed | Flavor::ZlibCompressedWith(_) => {
                let compression = match flavor {
                    Flavor::ZlibCompressedWith(compression) => compression,
                    _ => Compression::default(),
                };

                writer.write_all(&[ZLIB_CMF, zlib_flags(compression)])?;
                Compressed::Zlib(BufWriter::with_capacity(
                    BUFFER_SIZE,
                    AdlerWriter::new(DeflateEncoder::new(writer, compression)),
                ))
            }
            Flavor::AutoDetect => return Err(NbtIoError::AutoDetectOnWrite),
        };

        Ok(compressed)
    }

    /// Flushes all buffered data, completes the compressed stream and returns the sink.
    pub(crate) fn finish(self) -> Result<W, NbtIoError> {
        match self {
            Compressed::Plain(writer) => Ok(writer),
            Compressed::Gz(writer) => {
                let encoder = writer.into_inner().map_err(|error| error.into_error())?;
                Ok(encoder.finish()?)
            }
            Compressed::Zlib(writer) => {
                let adler = writer.into_inner().map_err(|error| error.into_error())?;
                let (encoder, checksum) = adler.into_parts();
                let mut writer = encoder.finish()?;
                writer.write_u32::<BigEndian>(checksum)?;
                Ok(writer)
            }
        }
    }
}

impl<W: Write> Write for Compressed<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Compressed::Plain(writer) => writer.write(buf),
            Compressed::Gz(writer) => writer.write(buf),
            Compressed::Zlib(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Compressed::Plain(writer) => writer.flush(),
            Compressed::Gz(writer) => writer.flush(),
            Compressed::Zlib(writer) => writer.flush(),
        }
    }
}
