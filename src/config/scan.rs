//! Engine configuration for a single scan invocation.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-attempt connect timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
/// Default cap on connect attempts per port.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay between attempts.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);
/// Default worker pool size.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// How the delay between retries evolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// The same delay before every retry.
    #[default]
    Fixed,
    /// The delay doubles after each retry.
    Exponential,
}

impl Backoff {
    /// Delay to sleep before retry number `retry` (1-based).
    pub fn delay(self, base: Duration, retry: u32) -> Duration {
        match self {
            Self::Fixed => base,
            Self::Exponential => {
                let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
                base.saturating_mul(factor)
            }
        }
    }
}

/// Configuration for one scan. Immutable once the scan starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Connect timeout for each attempt.
    pub timeout: Duration,
    /// Attempts allowed per port before a silent port is reported unreachable.
    pub max_retries: u32,
    /// Base delay between attempts.
    pub retry_backoff: Duration,
    /// Backoff growth strategy.
    pub backoff: Backoff,
    /// Number of workers probing in parallel.
    pub concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            backoff: Backoff::Fixed,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ScanConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Total attempts a silent port receives. At least one attempt is always made.
    pub fn attempt_limit(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }

    /// Upper bound on how long one port can occupy a worker.
    pub fn worst_case_per_port(&self) -> Duration {
        let attempts = self.attempt_limit();
        let waiting: Duration = (1..attempts)
            .map(|retry| self.backoff.delay(self.retry_backoff, retry))
            .sum();
        self.timeout.saturating_mul(attempts) + waiting
    }
}
