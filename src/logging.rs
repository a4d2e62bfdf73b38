//! Tracing setup: diagnostics on stderr plus an append-only invocation log.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::filter::{EnvFilter, LevelFilter, filter_fn};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;

/// Target for records that belong in the invocation log only.
pub const INVOCATION: &str = "invocation";

/// Stderr level: `error` when quiet, else `rust_log` or `info`.
fn stderr_filter(quiet: bool, rust_log: Option<&str>) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Stderr diagnostics plus, when `file` is given, bare message lines for the
/// invocation log.
fn subscriber<E, F>(
    stderr_filter: EnvFilter,
    stderr: E,
    ansi: bool,
    file: Option<F>,
) -> impl Subscriber + Send + Sync + 'static
where
    E: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    F: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let stderr_layer = fmt::layer()
        .with_writer(stderr)
        .with_ansi(ansi)
        .without_time()
        .with_target(false)
        .with_filter(stderr_filter)
        .with_filter(filter_fn(|meta| meta.target() != INVOCATION));

    let file_layer = file.map(|file| {
        fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_filter(LevelFilter::INFO)
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
}

/// Install the global subscriber. Returns the error from opening the log
/// file, if any, so the caller can report it once logging is live.
pub fn init(quiet: bool, log_file: Option<&Path>) -> Option<io::Error> {
    let (file, open_error) = match log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (Some(Mutex::new(file)), None),
            Err(e) => (None, Some(e)),
        },
        None => (None, None),
    };

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = stderr_filter(quiet, rust_log.as_deref());

    // Only fails when a global subscriber is already set; that one stays.
    let _ = subscriber(filter, io::stderr, io::stderr().is_terminal(), file).try_init();

    open_error
}
