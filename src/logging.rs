//! # Structured Logging Module
//!
//! Console logging plus a JSON error log written to the configured error log
//! file. Every line carries the `[SCS]` identifier so cache diagnostics can be
//! told apart from the host application's own output.

use chrono::Utc;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    reload,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::CacheConfiguration;
use crate::constants::{DEBUG_IDENTIFIER, DEFAULT_LABEL};

/// Live handles into the installed subscriber, bound to the configuration
/// that initialized logging
struct LoggingHandles {
    config_id: u64,
    /// `RUST_LOG` was set at init and owns the level
    env_override: bool,
    debug_level: AtomicBool,
    level_filter: reload::Handle<EnvFilter, Registry>,
    error_log: ErrorLogWriter,
}

static LOGGING: OnceLock<LoggingHandles> = OnceLock::new();

/// Error log destination that can be reopened at another path while the
/// subscriber is running
#[derive(Clone, Default)]
struct ErrorLogWriter {
    target: Arc<Mutex<Option<ErrorLogTarget>>>,
}

struct ErrorLogTarget {
    path: String,
    file: File,
}

impl ErrorLogWriter {
    /// Switch to `path`. On failure the previous file stays active.
    fn open(&self, path: &str) -> io::Result<()> {
        let file = open_log_file(Path::new(path))?;
        *self.target.lock() = Some(ErrorLogTarget {
            path: path.to_string(),
            file,
        });
        Ok(())
    }

    fn current_path(&self) -> Option<String> {
        self.target.lock().as_ref().map(|target| target.path.clone())
    }
}

impl Write for ErrorLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.target.lock().as_mut() {
            Some(target) => target.file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.target.lock().as_mut() {
            Some(target) => target.file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for ErrorLogWriter {
    type Writer = ErrorLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Initialize structured logging once per process.
///
/// The level follows the configuration's debug flag (`RUST_LOG` overrides
/// it). Warnings and errors are also appended to the error log file. Later
/// changes to the debug flag or log path of the same configuration are
/// picked up through [`refresh`].
pub fn init_structured_logging(config: &CacheConfiguration) {
    LOGGING.get_or_init(|| {
        let debug_mode = config.is_debug_enabled();
        let log_level = get_log_level(debug_mode);
        let log_path = config.log_file_path();

        let error_log = ErrorLogWriter::default();
        let file_error = error_log.open(&log_path).err();

        let (initial_filter, env_override) = match EnvFilter::try_from_default_env() {
            Ok(filter) => (filter, true),
            Err(_) => (EnvFilter::new(log_level), false),
        };
        let (filter_layer, level_filter) = reload::Layer::new(initial_filter);

        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true),
            )
            .with(
                fmt::layer()
                    .with_writer(error_log.clone())
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(LevelFilter::WARN),
            );

        // A host application may already own the global subscriber
        if subscriber.try_init().is_err() {
            tracing::debug!(
                "{DEBUG_IDENTIFIER} global tracing subscriber already initialized, \
                 continuing with existing subscriber"
            );
        }

        match file_error {
            Some(e) => tracing::warn!(
                log_file = %log_path,
                error = %e,
                "{DEBUG_IDENTIFIER} error log file unavailable, logging to console only"
            ),
            None => tracing::info!(
                pid = std::process::id(),
                log_file = %log_path,
                level = log_level,
                "{DEBUG_IDENTIFIER} structured logging initialized"
            ),
        }

        LoggingHandles {
            config_id: config.id(),
            env_override,
            debug_level: AtomicBool::new(debug_mode),
            level_filter,
            error_log,
        }
    });
}

/// Apply the configuration's current debug flag and error log path to the
/// running subscriber. Does nothing unless `config` initialized logging.
pub fn refresh(config: &CacheConfiguration) {
    let Some(handles) = LOGGING.get() else {
        return;
    };
    if handles.config_id != config.id() {
        return;
    }

    let debug_mode = config.is_debug_enabled();
    let debug_changed = handles.debug_level.swap(debug_mode, Ordering::AcqRel) != debug_mode;
    if debug_changed && !handles.env_override {
        let level = get_log_level(debug_mode);
        if let Err(e) = handles.level_filter.reload(EnvFilter::new(level)) {
            tracing::warn!(error = %e, "{DEBUG_IDENTIFIER} failed to reload log level");
        }
    }

    let log_path = config.log_file_path();
    if handles.error_log.current_path().as_deref() != Some(log_path.as_str()) {
        match handles.error_log.open(&log_path) {
            Ok(()) => tracing::info!(
                log_file = %log_path,
                "{DEBUG_IDENTIFIER} error log file switched"
            ),
            Err(e) => tracing::warn!(
                log_file = %log_path,
                error = %e,
                "{DEBUG_IDENTIFIER} error log file unavailable, keeping previous destination"
            ),
        }
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Console level for the given debug flag
fn get_log_level(debug_mode: bool) -> &'static str {
    if debug_mode {
        "debug"
    } else {
        "warn"
    }
}

/// Prefix a message with the cache debug identifier
pub fn format_debug_line(message: &str) -> String {
    format!("{DEBUG_IDENTIFIER} {message}")
}

/// Emit a debug line when the configuration's debug flag is set.
/// Returns whether anything was emitted.
pub fn debug_log(config: &CacheConfiguration, operation: &str, message: &str) -> bool {
    if !config.is_debug_enabled() {
        return false;
    }
    tracing::debug!(
        operation = %operation,
        timestamp = %Utc::now().to_rfc3339(),
        "{}",
        format_debug_line(message)
    );
    true
}

/// Log structured data for a cache operation, gated by debug mode.
/// Unlabeled operations are reported under the default label.
pub fn log_cache_operation(
    config: &CacheConfiguration,
    operation: &str,
    label: Option<&str>,
    status: &str,
    details: Option<&str>,
) -> bool {
    if !config.is_debug_enabled() {
        return false;
    }
    tracing::debug!(
        operation = %operation,
        label = label.unwrap_or(DEFAULT_LABEL),
        status = %status,
        details = details,
        cache_mode = %config.cache_mode(),
        timestamp = %Utc::now().to_rfc3339(),
        "{DEBUG_IDENTIFIER} CACHE_OPERATION"
    );
    true
}

/// Log error with full context. Always emitted, and lands in the error log file.
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "{DEBUG_IDENTIFIER} ERROR"
    );
}
