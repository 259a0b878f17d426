//! Logging setup shared by clients, demos and tests
//!
//! Adapters log through `tracing`. `init_logging` installs a global
//! subscriber once; with the `ftlog` feature the fast ftlog backend is used
//! instead of the tracing formatter.

use std::sync::Once;
use tracing::Level;
#[cfg(not(feature = "ftlog"))]
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// Install the global logger; later calls are no-ops
pub fn init_logging() {
    init_logging_with_level(LogLevel::Info);
}

/// Same as `init_logging`, with the default level used when `RUST_LOG` is unset
pub fn init_logging_with_level(level: LogLevel) {
    INIT.call_once(|| {
        #[cfg(feature = "ftlog")]
        init_ftlog(level);

        #[cfg(not(feature = "ftlog"))]
        init_tracing(level);
    });
}

#[cfg(feature = "ftlog")]
fn init_ftlog(level: LogLevel) {
    let filter = match level {
        LogLevel::Trace => ftlog::LevelFilter::Trace,
        LogLevel::Debug => ftlog::LevelFilter::Debug,
        LogLevel::Info => ftlog::LevelFilter::Info,
        LogLevel::Warn => ftlog::LevelFilter::Warn,
        LogLevel::Error => ftlog::LevelFilter::Error,
    };

    match ftlog::builder().max_log_level(filter).bounded(100_000, false).utc().try_init() {
        Ok(guard) => {
            // The guard flushes on drop; the logger lives for the process
            std::mem::forget(guard);
            tracing::info!("📝 ftlog logging initialized");
        }
        Err(e) => eprintln!("ftlog init failed: {e}"),
    }
}

#[cfg(not(feature = "ftlog"))]
fn init_tracing(level: LogLevel) {
    let default_directive = level.as_directive();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    // Another subscriber may already be installed by the host application
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        tracing::debug!("📝 tracing logging initialized at {}", default_directive);
    }
}

/// Default verbosity when no `RUST_LOG` filter is present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Log a venue call that took `$micros` microseconds
#[macro_export]
macro_rules! log_latency {
    ($venue:expr, $operation:expr, $micros:expr) => {
        if $micros < 1000 {
            tracing::debug!("⚡ {} {} completed in {}μs", $venue, $operation, $micros);
        } else {
            tracing::debug!("⚡ {} {} completed in {:.3}ms", $venue, $operation, $micros as f64 / 1000.0);
        }
    };
}

/// Log an order lifecycle event
#[macro_export]
macro_rules! log_order {
    ($venue:expr, $action:expr, $order_id:expr, $pair:expr) => {
        tracing::info!("📋 {} ORDER {}: {} ({})", $venue, $action, $order_id, $pair);
    };
}
