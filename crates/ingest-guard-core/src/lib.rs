//! Core library for ingest-guard.
//!
//! Streams untrusted input through a fixed-size window and rejects it as soon
//! as it grows past a byte size limit or a line count limit.
//!
//! # Modules
//!
//! - [`checker`] - The streaming limit checker
//! - [`source`] - Byte sources the checker reads from
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```
//! use std::num::NonZeroU64;
//! use ingest_guard_core::{LimitErrorKind, LineLimit, TextFileChecker};
//!
//! let input = "one\ntwo\nthree\n";
//! let checker = TextFileChecker::from_reader(
//!     input.as_bytes(),
//!     NonZeroU64::new(1024).unwrap(),
//!     LineLimit::AtMost(NonZeroU64::new(2).unwrap()),
//! );
//! let err = checker.try_read_all().unwrap_err();
//! assert_eq!(err.kind(), LimitErrorKind::ExceededLineCountLimit);
//! ```
#![deny(unsafe_code)]

pub mod checker;

pub mod config;

pub mod error;

#[cfg(any(test, feature = "test-util"))]
pub mod fake_source;

pub mod source;

pub use checker::{InputSize, LineLimit, NO_LINE_LIMIT, TextFileChecker};
pub use config::{Config, ConfigLoader, DEFAULT_MAX_INPUT_BYTES, InputLimits, LogLevel};
pub use error::{ConfigError, ConfigResult, LimitError, LimitErrorKind, LimitResult};
pub use source::{ByteSource, Pull, ReadSource};
