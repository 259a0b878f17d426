//! Blocking entry point over the monoio runtime
//!
//! Venue clients are async. Callers that want one blocking call per
//! operation wrap it in `VenueRuntime::block_on`, which drives the future on
//! a fresh single-threaded runtime with the timer enabled (request timeouts
//! depend on it). io_uring is used when the kernel supports it, otherwise
//! the legacy epoll driver.

use monoio::{FusionDriver, RuntimeBuilder};
use std::future::Future;
use std::io;
use tracing::debug;

/// Runtime settings
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Name used in log lines
    pub thread_name: String,
    /// io_uring submission queue size
    pub entries: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            thread_name: "coinwire".to_string(),
            entries: 256,
        }
    }
}

/// Drives venue futures to completion on the calling thread
#[derive(Debug, Clone, Default)]
pub struct VenueRuntime {
    config: RuntimeConfig,
}

impl VenueRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Run a future to completion, blocking the current thread
    pub fn block_on<F>(&self, future: F) -> io::Result<F::Output>
    where
        F: Future,
    {
        let mut runtime = RuntimeBuilder::<FusionDriver>::new()
            .with_entries(self.config.entries)
            .enable_timer()
            .build()?;
        debug!("▶️ {} runtime started", self.config.thread_name);
        let output = runtime.block_on(future);
        debug!("⏹️ {} runtime stopped", self.config.thread_name);
        Ok(output)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

/// Run an async closure on a default `VenueRuntime`
pub fn run_blocking<F, Fut>(f: F) -> io::Result<Fut::Output>
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    VenueRuntime::new().block_on(f())
}
