//! A scripted [`ByteSource`] for exercising partial reads and injected errors.

use std::io;

use crate::source::{ByteSource, Pull};

/// One scripted record: bytes to deliver, then an optional error.
#[derive(Debug)]
pub struct ReadEvent {
    /// Bytes delivered for this record, possibly across several pulls.
    pub data: Vec<u8>,
    /// Error attached to the pull that delivers the record's final byte.
    pub error: Option<io::Error>,
}

impl ReadEvent {
    /// A record that delivers `data` cleanly.
    pub fn data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            error: None,
        }
    }

    /// A record that delivers `data` and then reports `error`.
    pub fn failing(data: impl Into<Vec<u8>>, error: io::Error) -> Self {
        Self {
            data: data.into(),
            error: Some(error),
        }
    }
}

/// Replays a fixed sequence of [`ReadEvent`]s.
///
/// Each pull copies as much of the current record as fits (short reads are
/// expected). Once every record is delivered, pulls report end-of-stream.
///
/// By default exhaustion is the only end signal. With
/// [`with_end_on_last_record`](Self::with_end_on_last_record) the pull that
/// delivers the final record's last byte reports end-of-stream too.
#[derive(Debug)]
pub struct FakeSource {
    events: Vec<ReadEvent>,
    event_index: usize,
    data_index: usize,
    max_chunk: Option<usize>,
    stall_every: Option<usize>,
    end_on_last_record: bool,
    pulls: usize,
}

impl FakeSource {
    /// Create a source that replays `events` in order.
    pub const fn new(events: Vec<ReadEvent>) -> Self {
        Self {
            events,
            event_index: 0,
            data_index: 0,
            max_chunk: None,
            stall_every: None,
            end_on_last_record: false,
            pulls: 0,
        }
    }

    /// Never deliver more than `max` bytes per pull, even if the buffer is
    /// larger.
    pub const fn with_max_chunk(mut self, max: usize) -> Self {
        self.max_chunk = Some(max);
        self
    }

    /// Answer every `n`th pull with zero bytes, no error, and no end-of-stream.
    ///
    /// # Panics
    ///
    /// If `n < 2`, since every pull would stall and the source would never
    /// make progress.
    pub const fn with_stalls(mut self, n: usize) -> Self {
        assert!(n >= 2, "stalling every pull never delivers any bytes");
        self.stall_every = Some(n);
        self
    }

    /// Report end-of-stream on the same pull that delivers the last record's
    /// final byte, alongside that record's error if it has one.
    pub const fn with_end_on_last_record(mut self) -> Self {
        self.end_on_last_record = true;
        self
    }

    /// Total number of pulls served so far.
    pub const fn pulls(&self) -> usize {
        self.pulls
    }

    fn exhausted(&self) -> bool {
        self.event_index == self.events.len()
    }
}

impl ByteSource for FakeSource {
    fn pull(&mut self, buf: &mut [u8]) -> Pull {
        self.pulls += 1;
        if self.exhausted() {
            return Pull::end(0);
        }
        if buf.is_empty() {
            return Pull::data(0);
        }
        if self.stall_every.is_some_and(|n| self.pulls % n == 0) {
            return Pull::data(0);
        }

        let event = &mut self.events[self.event_index];
        let remaining = &event.data[self.data_index..];
        let limit = self.max_chunk.map_or(buf.len(), |max| max.min(buf.len()));
        let ncopy = remaining.len().min(limit);
        buf[..ncopy].copy_from_slice(&remaining[..ncopy]);

        if self.data_index + ncopy == event.data.len() {
            let error = event.error.take();
            self.data_index = 0;
            self.event_index += 1;
            Pull {
                filled: ncopy,
                end_of_stream: self.end_on_last_record && self.exhausted(),
                error,
            }
        } else {
            self.data_index += ncopy;
            Pull::data(ncopy)
        }
    }
}
