//! Retry orchestration with exponential backoff and jitter
//!
//! The [`RetryOrchestrator`] wraps an arbitrary asynchronous provider
//! operation, normalizes whatever it fails with into the
//! [`ProviderFailure`] taxonomy, decides retry eligibility from a
//! per-kind policy, and keeps running statistics of every failure seen.
//!
//! Delays between attempts honor a provider-supplied retry-after hint when
//! one exists; otherwise they follow capped exponential backoff with
//! uniform jitter in `[0, 0.3 * exponential)` to spread concurrent callers
//! apart.

use crate::providers::error::{BoxedError, FailureKind, ProviderFailure, ProviderResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};
use tracing::{debug, error, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not including the initial attempt)
    pub max_retries: u32,

    /// Base delay for the exponential backoff formula (milliseconds)
    pub base_delay_ms: u64,

    /// Ceiling on any single delay (milliseconds)
    pub max_delay_ms: u64,

    /// Whether RateLimit failures are retried
    pub retry_rate_limit: bool,

    /// Whether Network failures are retried
    pub retry_network: bool,

    /// Whether Timeout failures are retried
    pub retry_timeout: bool,

    /// Whether InvalidResponse failures are retried
    ///
    /// Off by default: a deterministic malformed reply rarely improves on
    /// a second attempt.
    pub retry_invalid_response: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            retry_rate_limit: true,
            retry_network: true,
            retry_timeout: true,
            retry_invalid_response: false,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with a custom retry count and default switches
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Create a policy that never retries
    pub fn no_retry() -> Self {
        Self::new(0)
    }

    /// Whether a failure of this kind is eligible for retry
    ///
    /// Kinds without an explicit switch (Generic) are retryable by default.
    pub fn should_retry(&self, kind: &FailureKind) -> bool {
        match kind {
            FailureKind::RateLimit { .. } => self.retry_rate_limit,
            FailureKind::Network => self.retry_network,
            FailureKind::Timeout => self.retry_timeout,
            FailureKind::InvalidResponse => self.retry_invalid_response,
            FailureKind::Generic => true,
        }
    }

    /// Calculate the delay before the given retry attempt (1-based)
    ///
    /// A rate-limit hint from the provider always wins over the computed
    /// backoff; both paths are capped at `max_delay_ms`.
    pub fn calculate_delay(&self, attempt: u32, failure: &ProviderFailure) -> Duration {
        if let Some(secs) = failure.retry_after_secs() {
            let hinted_ms = secs.saturating_mul(1_000).min(self.max_delay_ms);
            return Duration::from_millis(hinted_ms);
        }

        // First retry uses exponent 0
        let exponential =
            self.base_delay_ms as f64 * 2f64.powi(attempt.saturating_sub(1) as i32);

        let jitter_range = exponential * 0.3;
        let jitter = if jitter_range > 0.0 {
            rand::thread_rng().gen_range(0.0..jitter_range)
        } else {
            0.0
        };

        let delay_ms = (exponential + jitter).min(self.max_delay_ms as f64);
        Duration::from_millis(delay_ms as u64)
    }
}

/// Per-kind failure counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureCounts {
    pub generic: u64,
    pub rate_limit: u64,
    pub network: u64,
    pub timeout: u64,
    pub invalid_response: u64,
}

impl FailureCounts {
    fn record(&mut self, kind: &FailureKind) {
        match kind {
            FailureKind::Generic => self.generic += 1,
            FailureKind::RateLimit { .. } => self.rate_limit += 1,
            FailureKind::Network => self.network += 1,
            FailureKind::Timeout => self.timeout += 1,
            FailureKind::InvalidResponse => self.invalid_response += 1,
        }
    }
}

/// The most recent failure an orchestrator observed
#[derive(Debug, Clone)]
pub struct LastFailure {
    /// The classified failure
    pub failure: ProviderFailure,

    /// When it was recorded
    pub at: SystemTime,
}

/// Running counters owned by one orchestrator instance
#[derive(Debug, Clone, Default)]
pub struct ExecutionStats {
    /// Every failure observed, across all attempts
    pub total_failures: u64,

    /// Failures bucketed by kind
    pub failures_by_kind: FailureCounts,

    /// Retries actually performed (attempts beyond the first)
    pub total_retries: u64,

    /// Successes that required at least one retry
    pub successful_recoveries: u64,

    /// The most recent failure, with its timestamp
    pub last_failure: Option<LastFailure>,
}

impl ExecutionStats {
    fn record_failure(&mut self, failure: &ProviderFailure) {
        self.total_failures += 1;
        self.failures_by_kind.record(&failure.kind);
        self.last_failure = Some(LastFailure {
            failure: failure.clone(),
            at: SystemTime::now(),
        });
    }
}

/// Executes provider operations with classification, retry, and accounting
pub struct RetryOrchestrator {
    policy: RetryPolicy,
    stats: Mutex<ExecutionStats>,
}

impl RetryOrchestrator {
    /// Create an orchestrator with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            stats: Mutex::new(ExecutionStats::default()),
        }
    }

    /// The policy this orchestrator was created with
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    // A poisoned stats mutex only means a panic mid-increment; the
    // counters are still usable.
    fn lock_stats(&self) -> MutexGuard<'_, ExecutionStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Execute an operation against a provider, retrying per policy
    ///
    /// The first success short-circuits immediately. On failure the raw
    /// error is normalized through the taxonomy, recorded, and either
    /// retried after a backoff delay or surfaced unchanged once retries
    /// are exhausted or the kind's switch is off.
    pub async fn execute_with_retry<F, Fut, T>(
        &self,
        mut operation: F,
        provider: &str,
        label: &str,
    ) -> ProviderResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BoxedError>>,
    {
        let mut attempt: u32 = 0;

        loop {
            debug!(provider, operation = label, attempt, "invoking provider operation");

            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        self.lock_stats().successful_recoveries += 1;
                        debug!(
                            provider,
                            operation = label,
                            attempt,
                            "operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(raw) => {
                    let failure = ProviderFailure::normalize(raw, provider);
                    self.lock_stats().record_failure(&failure);

                    let eligible = self.policy.should_retry(&failure.kind);
                    if eligible && attempt < self.policy.max_retries {
                        attempt += 1;
                        self.lock_stats().total_retries += 1;

                        let delay = self.policy.calculate_delay(attempt, &failure);
                        warn!(
                            provider,
                            operation = label,
                            attempt,
                            kind = failure.kind.label(),
                            delay_ms = delay.as_millis() as u64,
                            "retrying after failure"
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        error!(
                            provider,
                            operation = label,
                            attempts = attempt + 1,
                            kind = failure.kind.label(),
                            "giving up: retries exhausted or failure not retryable"
                        );
                        return Err(failure);
                    }
                }
            }
        }
    }

    /// Snapshot copy of the current statistics
    pub fn statistics(&self) -> ExecutionStats {
        self.lock_stats().clone()
    }

    /// Zero all counters and clear the last failure
    pub fn reset_statistics(&self) {
        *self.lock_stats() = ExecutionStats::default();
    }
}
