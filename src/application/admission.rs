use crate::config::RateLimitConfig;
use crate::error::{CardCostError, Result};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::InMemoryState;
use governor::state::direct::NotKeyed;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;

type DirectRateLimiter<C> =
    RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Process-wide token bucket guarding the cost endpoint.
///
/// Backed by governor's GCRA limiter, which behaves as a token bucket with
/// greedy refill: tokens accrue continuously at `refill_tokens / refill_interval`
/// up to `capacity`. State lives in a single atomic updated by compare-and-swap,
/// so concurrent callers never over-admit.
///
/// Share one instance by `Arc` across all request handlers.
pub struct AdmissionController<C: Clock = DefaultClock> {
    limiter: DirectRateLimiter<C>,
    capacity: NonZeroU32,
}

impl AdmissionController<DefaultClock> {
    /// Creates a controller on the system clock, failing with `ConfigError` for
    /// a config `RateLimitConfig::validate` rejects.
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        Self::with_clock(config, &DefaultClock::default())
    }
}

impl<C: Clock> AdmissionController<C> {
    /// Builds a controller driven by `clock`. Tests use a fake clock to freeze
    /// or advance time.
    pub fn with_clock(config: &RateLimitConfig, clock: &C) -> Result<Self> {
        config.validate()?;
        let capacity = NonZeroU32::new(config.capacity).ok_or_else(|| {
            CardCostError::ConfigError("rate limit capacity must be positive".to_string())
        })?;
        let quota = Quota::with_period(config.refill_period())
            .ok_or_else(|| {
                CardCostError::ConfigError("rate limit refill period is too short".to_string())
            })?
            .allow_burst(capacity);

        Ok(Self {
            limiter: RateLimiter::direct_with_clock(quota, clock),
            capacity,
        })
    }

    /// Takes one token if available. Never waits.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Takes `cost` tokens at once if all of them are available, otherwise
    /// takes none. A zero cost is always admitted.
    pub fn try_acquire_n(&self, cost: u32) -> bool {
        match NonZeroU32::new(cost) {
            None => true,
            Some(n) => matches!(self.limiter.check_n(n), Ok(Ok(()))),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity.get()
    }
}
