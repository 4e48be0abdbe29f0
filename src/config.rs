//! Runtime configuration for the admission controller and the BIN lookup client.
//!
//! Defaults mirror the production setup: a 7000 token burst refilled at 600
//! tokens per minute, and a 3 second lookup timeout against binlist.net.

use crate::error::{CardCostError, Result};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BINLIST_URL: &str = "https://lookup.binlist.net";

/// Longest time a full bucket may take to refill, about 146 years.
pub const MAX_BUCKET_SPAN_NANOS: u64 = u64::MAX / 4;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum burst size.
    pub capacity: u32,
    /// Tokens added per `refill_interval`, accrued continuously.
    pub refill_tokens: u32,
    #[serde(with = "duration_secs")]
    pub refill_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 7000,
            refill_tokens: 600,
            refill_interval: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Rejects zero values and bucket spans longer than `MAX_BUCKET_SPAN_NANOS`.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CardCostError::ConfigError(
                "rate limit capacity must be positive".to_string(),
            ));
        }
        if self.refill_tokens == 0 {
            return Err(CardCostError::ConfigError(
                "rate limit refill tokens must be positive".to_string(),
            ));
        }
        if self.refill_interval.is_zero() {
            return Err(CardCostError::ConfigError(
                "rate limit refill interval must be positive".to_string(),
            ));
        }
        if self.refill_period().is_zero() {
            return Err(CardCostError::ConfigError(
                "rate limit refill period below 1ns".to_string(),
            ));
        }
        // The limiter keeps its state in u64 nanoseconds and may add two full
        // bucket spans to the current time, so leave headroom.
        let full_bucket = self
            .refill_period()
            .checked_mul(self.capacity)
            .filter(|span| span.as_nanos() <= u128::from(MAX_BUCKET_SPAN_NANOS));
        if full_bucket.is_none() {
            return Err(CardCostError::ConfigError(
                "rate limit bucket span too long".to_string(),
            ));
        }
        Ok(())
    }

    /// Time needed to accrue a single token.
    pub fn refill_period(&self) -> Duration {
        self.refill_interval / self.refill_tokens.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Route lookups through proxies taken from the environment.
    pub use_system_proxy: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BINLIST_URL.to_string(),
            timeout_ms: 3_000,
            use_system_proxy: true,
        }
    }
}

impl LookupConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(CardCostError::ConfigError(
                "lookup base url must not be empty".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(CardCostError::ConfigError(
                "lookup timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rate_limit: RateLimitConfig,
    pub lookup: LookupConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.rate_limit.validate()?;
        self.lookup.validate()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
