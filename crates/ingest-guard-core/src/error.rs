//! Error types for ingest-guard-core.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checker::InputSize;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Why a checked read stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LimitErrorKind {
    /// More bytes arrived than the byte size limit allows.
    ExceededByteSizeLimit,
    /// More lines arrived than the line count limit allows.
    ExceededLineCountLimit,
    /// The byte source reported an I/O failure.
    ReadError,
}

impl LimitErrorKind {
    /// Returns a short human-readable description.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ExceededByteSizeLimit => "exceeded byte size limit",
            Self::ExceededLineCountLimit => "exceeded line count limit",
            Self::ReadError => "read error",
        }
    }
}

impl std::fmt::Display for LimitErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A checked read that did not run to completion.
///
/// Every variant carries the counts accumulated at the moment the failure was
/// detected. For the two limit variants, these counts are lower bounds on the
/// real input size but have already crossed the limit that was hit.
#[derive(Error, Debug)]
pub enum LimitError {
    /// The byte size limit was exceeded.
    #[error("exceeded byte size limit after reading {} bytes", .read.bytes)]
    ByteSizeExceeded {
        /// Counts at the point of detection.
        read: InputSize,
    },

    /// The line count limit was exceeded.
    #[error("exceeded line count limit after reading {} lines", .read.lines)]
    LineCountExceeded {
        /// Counts at the point of detection.
        read: InputSize,
    },

    /// The byte source failed.
    #[error("read error after {} bytes: {source}", .read.bytes)]
    Read {
        /// Counts at the point of detection.
        read: InputSize,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

impl LimitError {
    /// Returns which kind of failure this is.
    pub const fn kind(&self) -> LimitErrorKind {
        match self {
            Self::ByteSizeExceeded { .. } => LimitErrorKind::ExceededByteSizeLimit,
            Self::LineCountExceeded { .. } => LimitErrorKind::ExceededLineCountLimit,
            Self::Read { .. } => LimitErrorKind::ReadError,
        }
    }

    /// Returns the partial counts recorded when the read stopped.
    pub const fn read(&self) -> InputSize {
        match self {
            Self::ByteSizeExceeded { read }
            | Self::LineCountExceeded { read }
            | Self::Read { read, .. } => *read,
        }
    }

    /// Returns the I/O failure, if this is a [`LimitError::Read`].
    pub const fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias using [`LimitError`].
pub type LimitResult<T> = Result<T, LimitError>;
