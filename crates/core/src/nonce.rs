//! Monotonic nonce generation
//!
//! Signed venues reject a nonce that is not larger than the last one they
//! accepted for the key. Each generator yields `max(last + 1, clock())`, so
//! the sequence keeps increasing even when the wall clock steps backwards.
//!
//! State lives in one `AtomicU64` per generator. Two generators (two client
//! instances) signing with the same credentials are NOT coordinated; share
//! one client or synchronise externally in that case.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Resolution of the wall-clock seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceUnit {
    Seconds,
    Millis,
    Micros,
}

/// Source of wall-clock time in nanoseconds since the epoch
pub trait Clock: Send + Sync {
    fn now_nanos(&self) -> u64;
}

/// The real system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64
    }
}

/// A settable clock for exercising clock jumps
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub fn new(nanos: u64) -> Self {
        Self {
            nanos: AtomicU64::new(nanos),
        }
    }

    pub fn set_nanos(&self, nanos: u64) {
        self.nanos.store(nanos, Ordering::SeqCst);
    }

    pub fn advance_nanos(&self, delta: u64) {
        self.nanos.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_nanos(&self) -> u64 {
        (**self).now_nanos()
    }
}

/// Per-client nonce source
pub struct NonceGenerator {
    unit: NonceUnit,
    clock: Box<dyn Clock>,
    last: AtomicU64,
}

impl NonceGenerator {
    pub fn new(unit: NonceUnit) -> Self {
        Self::with_clock(unit, SystemClock)
    }

    pub fn with_clock(unit: NonceUnit, clock: impl Clock + 'static) -> Self {
        Self {
            unit,
            clock: Box::new(clock),
            last: AtomicU64::new(0),
        }
    }

    pub fn unit(&self) -> NonceUnit {
        self.unit
    }

    /// Current wall-clock reading in this generator's unit
    pub fn clock_value(&self) -> u64 {
        let nanos = self.clock.now_nanos();
        match self.unit {
            NonceUnit::Seconds => nanos / 1_000_000_000,
            NonceUnit::Millis => nanos / 1_000_000,
            NonceUnit::Micros => nanos / 1_000,
        }
    }

    /// Next nonce; strictly greater than every value handed out before
    pub fn next(&self) -> u64 {
        let now = self.clock_value();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(previous.saturating_add(1))
    }

    /// Last value handed out, 0 before the first call
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for NonceGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceGenerator")
            .field("unit", &self.unit)
            .field("last", &self.last())
            .finish()
    }
}
