//! Base module containing common structs and traits

use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

/// Trait that defines a remote imagery model.
pub trait Model {
    /// Type of self of implemented model.
    type MyType;
    /// Error returned when the model cannot be built.
    type Error;
    /// Returns Result<self type> for given file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the model's file.
    fn open<P: AsRef<Path>>(path: P) -> Result<Self::MyType, Self::Error>;
}

/// Random access to an immutable run of bytes.
///
/// Reads take `&self` so a parsed model can be queried from several threads
/// at once.
pub trait ByteSource: Send + Sync {
    /// Total number of bytes available.
    fn len(&self) -> u64;

    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if the range runs past
    /// [`len`](Self::len).
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ByteSource for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let range = usize::try_from(offset)
            .ok()
            .and_then(|start| Some(start..start.checked_add(buf.len())?));
        match range.and_then(|range| self.get(range)) {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read past end of buffer",
            )),
        }
    }
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.as_slice().read_at(offset, buf)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_at(offset, buf)
    }
}

/// [`ByteSource`] over a seekable handle such as a [`std::fs::File`].
///
/// The handle sits behind a mutex; every read seeks before reading, so the
/// handle's own position carries no meaning between calls.
pub struct ReaderSource<R> {
    reader: Mutex<R>,
    len: u64,
}

impl<R: Read + Seek + Send> ReaderSource<R> {
    pub fn new(mut reader: R) -> io::Result<Self> {
        let len = reader.seek(SeekFrom::End(0))?;
        Ok(Self {
            reader: Mutex::new(reader),
            len,
        })
    }

    /// Give back the wrapped handle.
    pub fn into_inner(self) -> R {
        match self.reader.into_inner() {
            Ok(reader) => reader,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<R: Read + Seek + Send> ByteSource for ReaderSource<R> {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut reader = self
            .reader
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "reader lock poisoned"))?;
        reader.seek(SeekFrom::Start(offset))?;
        reader.read_exact(buf)
    }
}

impl<R> std::fmt::Debug for ReaderSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderSource").field("len", &self.len).finish()
    }
}

/// Streaming [`Read`] over a byte range of a [`ByteSource`].
pub struct SegmentReader<'a, S: ?Sized> {
    source: &'a S,
    position: u64,
    end: u64,
}

impl<'a, S: ByteSource + ?Sized> SegmentReader<'a, S> {
    pub fn new(source: &'a S, offset: u64, len: u64) -> Self {
        Self {
            source,
            position: offset,
            end: offset.saturating_add(len),
        }
    }

    /// Bytes left before the end of the range.
    pub fn remaining(&self) -> u64 {
        self.end - self.position
    }
}

impl<S: ByteSource + ?Sized> Read for SegmentReader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(usize::try_from(self.remaining()).unwrap_or(usize::MAX));
        if n == 0 {
            return Ok(0);
        }
        self.source.read_at(self.position, &mut buf[..n])?;
        self.position += n as u64;
        Ok(n)
    }
}
