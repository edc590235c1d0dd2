use crate::io::{NbtIoError, NbtRead};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::{
    convert::TryFrom,
    io::{Error, ErrorKind, Read, Result, Write},
};

/// Upper bound on how much is allocated up front for a length read off the wire. Longer payloads
/// grow their buffers as bytes actually arrive.
const MAX_PREALLOCATION: usize = 64 * 1024;

/// Size of the scratch buffer used to discard bytes from sources which cannot seek.
pub const SCRATCH_SIZE: usize = 8 * 1024;

#[inline]
pub fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    reader.read_u8()
}

#[inline]
pub fn read_i16<R: Read>(reader: &mut R) -> Result<i16> {
    reader.read_i16::<BigEndian>()
}

#[inline]
pub fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    reader.read_i32::<BigEndian>()
}

#[inline]
pub fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    reader.read_i64::<BigEndian>()
}

#[inline]
pub fn read_f32<R: Read>(reader: &mut R) -> Result<f32> {
    reader.read_f32::<BigEndian>()
}

#[inline]
pub fn read_f64<R: Read>(reader: &mut R) -> Result<f64> {
    reader.read_f64::<BigEndian>()
}

/// Reads a signed 32-bit length or count, rejecting negative values.
pub fn read_len<R: Read>(reader: &mut R) -> std::result::Result<usize, NbtIoError> {
    let len = read_i32(reader)?;
    usize::try_from(len).map_err(|_| NbtIoError::NegativeLength(len))
}

/// Reads a signed 16-bit string length, rejecting negative values.
pub fn read_string_len<R: Read>(reader: &mut R) -> std::result::Result<usize, NbtIoError> {
    let len = read_i16(reader)?;
    usize::try_from(len).map_err(|_| NbtIoError::NegativeLength(i32::from(len)))
}

/// Reads exactly `len` bytes without trusting `len` for the initial allocation.
pub fn read_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(len.min(MAX_PREALLOCATION));
    let read = reader.take(len as u64).read_to_end(&mut bytes)?;

    if read < len {
        return Err(Error::new(
            ErrorKind::UnexpectedEof,
            "stream ended inside a length-prefixed payload",
        ));
    }

    Ok(bytes)
}

pub fn read_int_array<R: Read>(reader: &mut R, len: usize) -> Result<Vec<i32>> {
    let mut array = Vec::with_capacity(len.min(MAX_PREALLOCATION / 4));

    for _ in 0 .. len {
        array.push(read_i32(reader)?);
    }

    Ok(array)
}

/// Reads a length-prefixed string. Malformed UTF-8 is replaced rather than rejected.
pub fn read_string<R: Read>(reader: &mut R) -> std::result::Result<String, NbtIoError> {
    let len = read_string_len(reader)?;
    let bytes = read_bytes(reader, len)?;

    Ok(match String::from_utf8(bytes) {
        Ok(string) => string,
        Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
    })
}

/// Advances past `count` bytes, seeking when the source allows it and otherwise reading into the
/// given scratch buffer.
pub fn skip<R: NbtRead>(reader: &mut R, count: u64, scratch: &mut Vec<u8>) -> Result<()> {
    if count == 0 {
        return Ok(());
    }

    if reader.is_seekable() {
        let offset = i64::try_from(count)
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "skip distance too large"))?;
        return reader.seek_relative(offset);
    }

    if scratch.is_empty() {
        scratch.resize(SCRATCH_SIZE, 0);
    }

    let mut remaining = count;
    while remaining > 0 {
        let chunk = remaining.min(scratch.len() as u64) as usize;
        reader.read_exact(&mut scratch[.. chunk])?;
        remaining -= chunk as u64;
    }

    Ok(())
}

/// Advances past a length-prefixed string without decoding it.
pub fn skip_string<R: NbtRead>(
    reader: &mut R,
    scratch: &mut Vec<u8>,
) -> std::result::Result<(), NbtIoError> {
    let len = read_string_len(reader)?;
    skip(reader, len as u64, scratch)?;
    Ok(())
}

#[inline]
pub fn write_u8<W: Write>(writer: &mut W, value: u8) -> Result<()> {
    writer.write_u8(value)
}

#[inline]
pub fn write_i16<W: Write>(writer: &mut W, value: i16) -> Result<()> {
    writer.write_i16::<BigEndian>(value)
}

#[inline]
pub fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<()> {
    writer.write_i32::<BigEndian>(value)
}

#[inline]
pub fn write_i64<W: Write>(writer: &mut W, value: i64) -> Result<()> {
    writer.write_i64::<BigEndian>(value)
}

#[inline]
pub fn write_f32<W: Write>(writer: &mut W, value: f32) -> Result<()> {
    writer.write_f32::<BigEndian>(value)
}

#[inline]
pub fn write_f64<W: Write>(writer: &mut W, value: f64) -> Result<()> {
    writer.write_f64::<BigEndian>(value)
}

/// Writes a signed 32-bit length, failing if `len` does not fit.
pub fn write_len<W: Write>(
    writer: &mut W,
    kind: &'static str,
    len: usize,
) -> std::result::Result<(), NbtIoError> {
    let encoded =
        i32::try_from(len).map_err(|_| NbtIoError::LengthOverflow { kind, length: len })?;
    write_i32(writer, encoded)?;
    Ok(())
}

pub fn write_string<W: Write>(writer: &mut W, string: &str) -> std::result::Result<(), NbtIoError> {
    let len = i16::try_from(string.len()).map_err(|_| NbtIoError::LengthOverflow {
        kind: "String",
        length: string.len(),
    })?;

    write_i16(writer, len)?;
    writer.write_all(string.as_bytes())?;
    Ok(())
}
