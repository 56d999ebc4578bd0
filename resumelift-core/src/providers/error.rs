//! Provider failure taxonomy and error normalization
//!
//! Every failure that crosses the orchestrator boundary is a
//! [`ProviderFailure`] carrying one of five [`FailureKind`]s. Raw
//! heterogeneous errors (reqwest errors, serde errors, strings thrown by
//! provider glue) are funneled through [`ProviderFailure::normalize`], which
//! classifies them by inspecting the message text. The marker matching is a
//! heuristic in a fixed priority order; a message that merely mentions
//! "timeout" in passing will classify as Timeout, and that is an accepted
//! approximation rather than a bug.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderFailure>;

/// Boxed error type accepted by the normalization entry point
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// The closed set of failure classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Uncategorized failure; retryable by default
    Generic,

    /// Provider throttling, optionally with a retry-after hint
    RateLimit {
        /// Seconds the provider asked us to wait before retrying
        retry_after_secs: Option<u64>,
    },

    /// Connectivity failure
    Network,

    /// The operation exceeded its deadline
    Timeout,

    /// The provider replied, but with malformed or unexpected output
    InvalidResponse,
}

impl FailureKind {
    /// Stable label used for statistics bucketing and log fields
    pub fn label(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::RateLimit { .. } => "rate_limit",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::InvalidResponse => "invalid_response",
        }
    }

    /// Classify an error message by its text, case-insensitively
    ///
    /// Priority order: rate-limit markers, then timeout markers, then
    /// network markers, then Generic. The order matters because real
    /// provider messages frequently contain more than one marker.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("rate limit") || lower.contains("429") {
            return Self::RateLimit {
                retry_after_secs: None,
            };
        }

        if lower.contains("timeout") || lower.contains("timed out") {
            return Self::Timeout;
        }

        if lower.contains("network")
            || lower.contains("fetch")
            || lower.contains("connection")
            || lower.contains("econnrefused")
            || lower.contains("enotfound")
            || lower.contains("no such host")
            || lower.contains("host not found")
            || lower.contains("dns")
        {
            return Self::Network;
        }

        Self::Generic
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified failure from a provider operation
#[derive(Debug, Clone, Error)]
#[error("{kind} failure from provider '{provider}': {message}")]
pub struct ProviderFailure {
    /// Which of the five kinds this failure is
    pub kind: FailureKind,

    /// Human-readable description
    pub message: String,

    /// Name of the provider the operation ran against
    pub provider: String,

    /// Optional machine code (e.g. "HTTP_503", "UNKNOWN_ERROR")
    pub code: Option<String>,

    /// Wrapped original cause, when one exists
    #[source]
    pub cause: Option<Arc<dyn StdError + Send + Sync>>,
}

impl ProviderFailure {
    /// Create a failure of the given kind
    pub fn new(kind: FailureKind, message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: provider.into(),
            code: None,
            cause: None,
        }
    }

    /// Uncategorized failure
    pub fn generic(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::new(FailureKind::Generic, message, provider)
    }

    /// Rate-limit failure, optionally carrying the provider's retry hint
    pub fn rate_limit(
        message: impl Into<String>,
        provider: impl Into<String>,
        retry_after_secs: Option<u64>,
    ) -> Self {
        Self::new(FailureKind::RateLimit { retry_after_secs }, message, provider)
    }

    /// Connectivity failure
    pub fn network(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::new(FailureKind::Network, message, provider)
    }

    /// Deadline failure
    pub fn timeout(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::new(FailureKind::Timeout, message, provider)
    }

    /// Malformed-output failure
    pub fn invalid_response(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidResponse, message, provider)
    }

    /// Attach a machine code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the underlying cause
    pub fn with_cause(mut self, cause: BoxedError) -> Self {
        self.cause = Some(Arc::from(cause));
        self
    }

    /// The provider's retry-after hint, present only on RateLimit failures
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self.kind {
            FailureKind::RateLimit { retry_after_secs } => retry_after_secs,
            _ => None,
        }
    }

    /// Normalize an arbitrary error into the taxonomy
    ///
    /// An error that already is a `ProviderFailure` passes through
    /// unchanged; anything else is classified from its message text and
    /// kept as the wrapped cause.
    pub fn normalize(raw: BoxedError, provider: &str) -> Self {
        match raw.downcast::<ProviderFailure>() {
            Ok(failure) => *failure,
            Err(raw) => {
                let message = raw.to_string();
                Self {
                    kind: FailureKind::classify(&message),
                    message,
                    provider: provider.to_string(),
                    code: None,
                    cause: Some(Arc::from(raw)),
                }
            }
        }
    }

    /// Normalize a non-error payload (e.g. a string surfaced by glue code)
    pub fn from_unknown(value: impl fmt::Display, provider: impl Into<String>) -> Self {
        Self::generic(value.to_string(), provider).with_code("UNKNOWN_ERROR")
    }

    /// Map a reqwest transport error into the taxonomy
    pub fn from_reqwest(err: reqwest::Error, provider: &str) -> Self {
        if err.is_timeout() {
            return Self::timeout(err.to_string(), provider).with_cause(Box::new(err));
        }
        if err.is_connect() {
            return Self::network(err.to_string(), provider).with_cause(Box::new(err));
        }
        if err.is_decode() {
            return Self::invalid_response(err.to_string(), provider).with_cause(Box::new(err));
        }
        if let Some(status) = err.status() {
            let failure = match status.as_u16() {
                429 => Self::rate_limit(err.to_string(), provider, None),
                408 | 504 => Self::timeout(err.to_string(), provider),
                _ => Self::generic(err.to_string(), provider),
            };
            return failure
                .with_code(format!("HTTP_{}", status.as_u16()))
                .with_cause(Box::new(err));
        }
        // Builder, redirect-policy, and body errors are deterministic;
        // they must not land in a retryable transport bucket.
        Self::generic(err.to_string(), provider).with_cause(Box::new(err))
    }
}

impl From<serde_json::Error> for ProviderFailure {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_response(format!("failed to parse response: {err}"), "unknown")
            .with_cause(Box::new(err))
    }
}
