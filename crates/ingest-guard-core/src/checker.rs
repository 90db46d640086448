//! Streaming size and line-count enforcement.
//!
//! [`TextFileChecker`] reads a [`ByteSource`] to the end through one fixed
//! 16 KiB scratch buffer, counting bytes and `\n`-delimited lines as it goes,
//! and stops at the first chunk that pushes either count over its limit.
//!
//! If the caller also needs the content, wrap the reader so it copies what it
//! reads (for example with a tee) before handing it to the checker.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroU64;
//! use ingest_guard_core::checker::{LineLimit, TextFileChecker};
//!
//! let limit = NonZeroU64::new(1024).unwrap();
//! let checker = TextFileChecker::from_reader(&b"ab\ncd"[..], limit, LineLimit::Unbounded);
//! let size = checker.try_read_all().unwrap();
//! assert_eq!((size.bytes, size.lines), (5, 2));
//! ```

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{LimitError, LimitResult};
use crate::source::{ByteSource, Pull, ReadSource};

/// Size of the scratch buffer each checker reads through.
pub const SCRATCH_BUFFER_SIZE: usize = 16 * 1024;

const DELIMITER: u8 = b'\n';

/// Byte and line counts for (part of) an input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct InputSize {
    /// Bytes consumed.
    pub bytes: u64,
    /// Lines consumed, including a final line without a trailing `\n`.
    pub lines: u64,
}

/// Maximum number of lines an input may contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineLimit {
    /// Lines are counted but never rejected.
    #[default]
    Unbounded,
    /// At most this many lines are accepted.
    AtMost(NonZeroU64),
}

/// Pass as the line limit to enforce only the byte size limit.
pub const NO_LINE_LIMIT: LineLimit = LineLimit::Unbounded;

impl LineLimit {
    /// Returns `true` if `lines` is more than this limit allows.
    pub const fn is_exceeded_by(self, lines: u64) -> bool {
        match self {
            Self::Unbounded => false,
            Self::AtMost(max) => lines > max.get(),
        }
    }

    /// Returns the numeric limit, or `None` when unbounded.
    pub const fn get(self) -> Option<u64> {
        match self {
            Self::Unbounded => None,
            Self::AtMost(max) => Some(max.get()),
        }
    }
}

impl From<Option<NonZeroU64>> for LineLimit {
    fn from(value: Option<NonZeroU64>) -> Self {
        value.map_or(Self::Unbounded, Self::AtMost)
    }
}

/// Reads a byte source to the end while enforcing a byte size limit and a
/// line count limit.
#[derive(Debug)]
pub struct TextFileChecker<S> {
    checker: Checker<S>,
}

impl<S: ByteSource> TextFileChecker<S> {
    /// Create a checker over `source`.
    ///
    /// Pass [`NO_LINE_LIMIT`] to skip the line limit while still getting an
    /// accurate line count back.
    pub fn new(source: S, size_limit: NonZeroU64, line_limit: LineLimit) -> Self {
        Self {
            checker: Checker::new(source, size_limit, line_limit, true),
        }
    }

    /// Read the whole source, failing at the first limit violation or I/O
    /// error.
    pub fn try_read_all(self) -> LimitResult<InputSize> {
        self.checker.read_all()
    }
}

impl<R: std::io::Read> TextFileChecker<ReadSource<R>> {
    /// Create a checker over any [`std::io::Read`].
    pub fn from_reader(reader: R, size_limit: NonZeroU64, line_limit: LineLimit) -> Self {
        Self::new(ReadSource::new(reader), size_limit, line_limit)
    }
}

#[derive(Debug)]
struct Checker<S> {
    scratch: Box<[u8]>,
    source: S,
    size_limit: NonZeroU64,
    line_limit: LineLimit,
    count_lines: bool,
    last_byte: u8,
}

impl<S: ByteSource> Checker<S> {
    fn new(source: S, size_limit: NonZeroU64, line_limit: LineLimit, count_lines: bool) -> Self {
        Self {
            scratch: vec![0; SCRATCH_BUFFER_SIZE].into_boxed_slice(),
            source,
            size_limit,
            line_limit,
            count_lines,
            last_byte: 0,
        }
    }

    #[tracing::instrument(
        name = "read_all",
        skip(self),
        fields(size_limit = self.size_limit.get(), line_limit = ?self.line_limit.get())
    )]
    fn read_all(mut self) -> LimitResult<InputSize> {
        let mut so_far = InputSize::default();
        loop {
            let Pull {
                filled,
                end_of_stream,
                error,
            } = self.source.pull(&mut self.scratch);
            let filled = filled.min(self.scratch.len());
            trace!(filled, end_of_stream, failed = error.is_some(), "pulled chunk");

            // Delivered bytes are valid even when an error comes with them,
            // and a limit hit in this chunk wins over that error.
            if filled > 0 {
                let chunk = &self.scratch[..filled];
                self.last_byte = chunk[filled - 1];

                so_far.bytes += filled as u64;
                if so_far.bytes > self.size_limit.get() {
                    debug!(bytes = so_far.bytes, "byte size limit exceeded");
                    return Err(LimitError::ByteSizeExceeded { read: so_far });
                }

                if self.count_lines {
                    so_far.lines += chunk.iter().filter(|&&b| b == DELIMITER).count() as u64;
                    if self.line_limit.is_exceeded_by(so_far.lines) {
                        debug!(lines = so_far.lines, "line count limit exceeded");
                        return Err(LimitError::LineCountExceeded { read: so_far });
                    }
                }
            }

            if let Some(source) = error {
                debug!(bytes = so_far.bytes, error = %source, "read failed");
                return Err(LimitError::Read {
                    read: so_far,
                    source,
                });
            }

            if end_of_stream {
                if self.count_lines && so_far.bytes > 0 && self.last_byte != DELIMITER {
                    so_far.lines += 1;
                    if self.line_limit.is_exceeded_by(so_far.lines) {
                        debug!(lines = so_far.lines, "line count limit exceeded at end of input");
                        return Err(LimitError::LineCountExceeded { read: so_far });
                    }
                }
                debug!(bytes = so_far.bytes, lines = so_far.lines, "input within limits");
                return Ok(so_far);
            }
            // Zero bytes without an error or end-of-stream: nothing happened.
        }
    }
}
