//! Check command — stream a file or stdin through the limit checker.

use std::io::Read;
use std::num::NonZeroU64;

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use ingest_guard_core::{
    InputLimits, InputSize, LimitError, LimitErrorKind, LimitResult, LineLimit, TextFileChecker,
};

/// Display name used for standard input.
const STDIN_NAME: &str = "<stdin>";

/// Arguments for the `check` subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// File to check. Reads stdin when omitted or `-`.
    pub file: Option<Utf8PathBuf>,

    /// Maximum size in bytes (overrides config).
    #[arg(long, value_name = "BYTES")]
    pub max_bytes: Option<NonZeroU64>,

    /// Maximum number of lines (overrides config).
    #[arg(long, value_name = "LINES", conflicts_with = "no_line_limit")]
    pub max_lines: Option<NonZeroU64>,

    /// Count lines but do not limit them.
    #[arg(long)]
    pub no_line_limit: bool,
}

impl CheckArgs {
    /// Apply command-line overrides on top of configured limits.
    fn resolve_limits(&self, configured: InputLimits) -> InputLimits {
        let max_lines = if self.no_line_limit {
            LineLimit::Unbounded
        } else {
            self.max_lines.map_or(configured.max_lines, LineLimit::AtMost)
        };
        InputLimits {
            max_bytes: self.max_bytes.unwrap_or(configured.max_bytes),
            max_lines,
        }
    }

    fn input_path(&self) -> Option<&Utf8PathBuf> {
        self.file.as_ref().filter(|path| path.as_str() != "-")
    }
}

/// Outcome of checking one input.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// File name, or `<stdin>`.
    pub input: String,
    /// Whether the whole input was read within limits.
    pub pass: bool,
    /// Bytes read (partial on failure).
    pub bytes_read: u64,
    /// Lines read (partial on failure).
    pub lines_read: u64,
    /// Byte size limit that was applied.
    pub max_bytes: u64,
    /// Line count limit that was applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u64>,
    /// Why the check failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<LimitErrorKind>,
    /// Human-readable failure detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckReport {
    fn new(input: &str, limits: InputLimits, result: LimitResult<InputSize>) -> Self {
        let (read, failure, message) = match result {
            Ok(size) => (size, None, None),
            Err(err) => (err.read(), Some(err.kind()), Some(describe(&err, limits))),
        };
        Self {
            input: input.to_string(),
            pass: failure.is_none(),
            bytes_read: read.bytes,
            lines_read: read.lines,
            max_bytes: limits.max_bytes.get(),
            max_lines: limits.max_lines.get(),
            failure,
            message,
        }
    }
}

fn describe(err: &LimitError, limits: InputLimits) -> String {
    match err {
        LimitError::ByteSizeExceeded { read } => format!(
            "{} (read at least {} bytes, limit {})",
            err.kind(),
            read.bytes,
            limits.max_bytes
        ),
        LimitError::LineCountExceeded { read } => format!(
            "{} (read at least {} lines, limit {})",
            err.kind(),
            read.lines,
            limits.max_lines.get().unwrap_or(u64::MAX)
        ),
        LimitError::Read { .. } => err.to_string(),
    }
}

/// Stream `reader` through the checker and summarize the outcome.
#[instrument(skip(reader))]
pub fn check_reader<R: Read>(input: &str, reader: R, limits: InputLimits) -> CheckReport {
    let result = TextFileChecker::from_reader(reader, limits.max_bytes, limits.max_lines)
        .try_read_all();
    if let Err(ref err) = result {
        warn!(
            input,
            kind = %err.kind(),
            bytes = err.read().bytes,
            lines = err.read().lines,
            "input rejected"
        );
    }
    CheckReport::new(input, limits, result)
}

/// Check a file (or stdin) against the configured limits.
#[instrument(name = "cmd_check", skip_all, fields(file = ?args.file))]
pub fn cmd_check(
    args: CheckArgs,
    global_json: bool,
    configured: InputLimits,
) -> anyhow::Result<()> {
    let limits = args.resolve_limits(configured);
    debug!(?limits, "executing check command");

    let report = match args.input_path() {
        Some(path) => {
            let file = std::fs::File::open(path.as_std_path())
                .with_context(|| format!("failed to open {path}"))?;
            check_reader(path.as_str(), file, limits)
        }
        None => check_reader(STDIN_NAME, std::io::stdin().lock(), limits),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !report.pass {
            bail!("{} failed limit checks", report.input);
        }
        return Ok(());
    }

    if let Some(message) = report.message {
        bail!("{}: {message}", report.input);
    }

    println!(
        "{} {} is {} bytes, {} lines",
        "PASS:".green(),
        report.input,
        report.bytes_read,
        report.lines_read,
    );
    Ok(())
}
