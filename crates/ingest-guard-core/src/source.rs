//! Byte sources the checker pulls from.
//!
//! [`std::io::Read`] folds "no bytes", "end of stream" and "error" into
//! `io::Result<usize>`, and can never hand back bytes together with an error.
//! The checker's loop needs all three signals independently, so it reads
//! through [`ByteSource`] instead. [`ReadSource`] adapts any reader.

use std::io::{self, ErrorKind, Read};

/// Outcome of a single pull from a [`ByteSource`].
///
/// `filled` bytes at the front of the caller's buffer are valid even when
/// `end_of_stream` or `error` is also set.
#[derive(Debug, Default)]
pub struct Pull {
    /// Number of bytes written into the buffer.
    pub filled: usize,
    /// No further bytes will ever be produced.
    pub end_of_stream: bool,
    /// An I/O failure reported alongside (or instead of) the bytes.
    pub error: Option<io::Error>,
}

impl Pull {
    /// A pull that delivered `filled` bytes and nothing else.
    pub const fn data(filled: usize) -> Self {
        Self {
            filled,
            end_of_stream: false,
            error: None,
        }
    }

    /// A pull that delivered `filled` bytes and then reached end-of-stream.
    pub const fn end(filled: usize) -> Self {
        Self {
            filled,
            end_of_stream: true,
            error: None,
        }
    }

    /// A pull that delivered `filled` bytes and then failed.
    pub const fn failed(filled: usize, error: io::Error) -> Self {
        Self {
            filled,
            end_of_stream: false,
            error: Some(error),
        }
    }
}

/// A streaming source of bytes.
///
/// `Pull::data(0)` means nothing happened and the caller should try again; it
/// is not end-of-stream.
pub trait ByteSource {
    /// Write up to `buf.len()` bytes into `buf`.
    fn pull(&mut self, buf: &mut [u8]) -> Pull;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn pull(&mut self, buf: &mut [u8]) -> Pull {
        (**self).pull(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn pull(&mut self, buf: &mut [u8]) -> Pull {
        (**self).pull(buf)
    }
}

/// Adapts a [`Read`] implementation into a [`ByteSource`].
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R: Read> ReadSource<R> {
    /// Wrap a reader.
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn pull(&mut self, buf: &mut [u8]) -> Pull {
        match self.inner.read(buf) {
            // Ok(0) only means end-of-stream when there was room to read into.
            Ok(0) if buf.is_empty() => Pull::data(0),
            Ok(0) => Pull::end(0),
            Ok(n) => Pull::data(n.min(buf.len())),
            Err(e) if e.kind() == ErrorKind::Interrupted => Pull::data(0),
            Err(e) => Pull::failed(0, e),
        }
    }
}
