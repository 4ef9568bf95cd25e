//! Logging configuration for formkeep.
//!
//! Several storage operations degrade instead of failing: a draft that
//! cannot be read comes back as `None`, and a listing that fails comes back
//! empty. Those degraded reads are logged at `warn!`, as are best-effort
//! cleanups that fail, such as deleting an image. A write that fails
//! (saving a draft, committing a submission, copying an image) is logged at
//! `error!` and then returned to the caller. `info!` marks completed writes
//! and `debug!` the per-file detail.
//!
//! With [`Verbosity::Quiet`] only the write failures reach stderr.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Write failures only.
    Quiet,
    /// Completed writes and degraded reads.
    #[default]
    Normal,
    /// Per-file and per-key detail.
    Verbose,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// `EnvFilter` directive scoping this level to formkeep's own events.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        format!("formkeep={}", self.to_level_filter())
    }
}

/// Initialize the logging system.
///
/// The level comes from `verbosity` unless `RUST_LOG` is set, which takes
/// precedence. Calling this more than once is harmless.
///
/// # Examples
///
/// ```no_run
/// use formkeep::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr),
    );

    // Already installed is fine
    let _ = subscriber.try_init();
}

/// Initialize logging for tests.
///
/// Only warnings and errors are shown so degraded reads stay visible in
/// failing test output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
