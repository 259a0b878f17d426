//! # coinwire core
//!
//! Primitives shared by every venue adapter:
//!
//! 1. **Exact decimals** - `Fixed` wraps `rust_decimal` for prices and sizes
//! 2. **Monotonic nonces** - per-client generators that survive clock jumps
//! 3. **Timing** - epoch helpers, venue timestamp parsing and `PerfTimer`
//! 4. **Logging** - tracing subscriber, or ftlog behind a feature
//! 5. **Runtime** - `VenueRuntime::block_on` for blocking callers

pub mod fixed;
pub mod id_gen;
pub mod logging;
pub mod nonce;
pub mod runtime;
pub mod timing;

pub use fixed::{Fixed, FixedError};
pub use id_gen::{client_order_id, generate_id};
pub use logging::{LogLevel, init_logging, init_logging_with_level};
pub use nonce::{Clock, ManualClock, NonceGenerator, NonceUnit, SystemClock};
pub use runtime::{RuntimeConfig, VenueRuntime, run_blocking};
pub use timing::{PerfTimer, millis, nanos};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixed::Fixed;
    pub use crate::logging::init_logging;
    pub use crate::nonce::{NonceGenerator, NonceUnit};
    pub use crate::runtime::VenueRuntime;
    pub use crate::timing::{PerfTimer, millis, nanos};

    pub use chrono::{DateTime, Utc};
    pub use monoio;
    pub use serde::{Deserialize, Serialize};
}
