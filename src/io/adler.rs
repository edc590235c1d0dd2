use std::io::{self, Read, Write};

const MODULUS: u32 = 65521;

// The largest number of bytes which can be summed before `b` may overflow a u32.
const NMAX: usize = 5552;

/// A running Adler-32 checksum, as used by the zlib trailer.
///
/// ```
/// # use ember_nbt::io::Adler32;
/// let mut adler = Adler32::new();
/// adler.update(b"a");
/// assert_eq!(adler.checksum(), 0x0062_0062);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Returns the checksum of an empty input.
    pub const fn new() -> Self {
        Adler32 { a: 1, b: 0 }
    }

    /// Feeds the given bytes into the checksum.
    pub fn update(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(NMAX) {
            for &byte in chunk {
                self.a += u32::from(byte);
                self.b += self.a;
            }

            self.a %= MODULUS;
            self.b %= MODULUS;
        }
    }

    /// Returns the checksum of every byte fed so far.
    #[inline]
    pub const fn checksum(&self) -> u32 {
        (self.b << 16) | self.a
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Checksums every byte read through it.
#[derive(Debug)]
pub(crate) struct AdlerReader<R> {
    inner: R,
    adler: Adler32,
}

impl<R: Read> AdlerReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        AdlerReader {
            inner,
            adler: Adler32::new(),
        }
    }

    pub(crate) fn checksum(&self) -> u32 {
        self.adler.checksum()
    }

    pub(crate) fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: Read> Read for AdlerReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.adler.update(&buf[.. read]);
        Ok(read)
    }
}

/// Checksums every byte before handing it to the wrapped writer.
#[derive(Debug)]
pub(crate) struct AdlerWriter<W> {
    inner: W,
    adler: Adler32,
}

impl<W: Write> AdlerWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        AdlerWriter {
            inner,
            adler: Adler32::new(),
        }
    }

    pub(crate) fn into_parts(self) -> (W, u32) {
        (self.inner, self.adler.checksum())
    }
}

impl<W: Write> Write for AdlerWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.adler.update(&buf[.. written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
