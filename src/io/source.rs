use std::{
    fs::File,
    io::{self, BufReader, Cursor, Read, Seek, SeekFrom},
};

/// A byte source for NBT decoding which can say whether it supports relative seeking.
///
/// Seekable sources let the decoder jump over tags rejected by a selector instead of reading them,
/// and are required by [`Flavor::AutoDetect`](crate::io::Flavor::AutoDetect), which peeks at the
/// first byte and then rewinds. Sources which cannot seek are read from front to back only.
///
/// The trait is implemented for in-memory cursors, files and buffered seekable readers. Any other
/// reader can be used through the [`Streaming`] wrapper.
pub trait NbtRead: Read {
    /// Returns whether [`seek_relative`](NbtRead::seek_relative) is supported.
    fn is_seekable(&self) -> bool {
        false
    }

    /// Moves the read position by `offset` bytes from the current position.
    fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
        let _ = offset;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "source does not support seeking",
        ))
    }
}

impl<T: AsRef<[u8]>> NbtRead for Cursor<T> {
    fn is_seekable(&self) -> bool {
        true
    }

    fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
        self.seek(SeekFrom::Current(offset)).map(drop)
    }
}

impl NbtRead for File {
    fn is_seekable(&self) -> bool {
        true
    }

    fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
        self.seek(SeekFrom::Current(offset)).map(drop)
    }
}

impl<R: Read + Seek> NbtRead for BufReader<R> {
    fn is_seekable(&self) -> bool {
        true
    }

    fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
        BufReader::seek_relative(self, offset)
    }
}

impl<R: NbtRead + ?Sized> NbtRead for &mut R {
    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }

    fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
        (**self).seek_relative(offset)
    }
}

/// Adapts any reader into a forward-only [`NbtRead`] source, such as a socket or a pipe.
///
/// ```
/// # use ember_nbt::io::{NbtRead, Streaming};
/// let source = Streaming::new(&[0x0Au8, 0x00, 0x00, 0x00][..]);
/// assert!(!source.is_seekable());
/// ```
#[derive(Debug)]
pub struct Streaming<R> {
    inner: R,
}

impl<R: Read> Streaming<R> {
    /// Wraps the given reader.
    pub fn new(inner: R) -> Self {
        Streaming { inner }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for Streaming<R> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> NbtRead for Streaming<R> {}
