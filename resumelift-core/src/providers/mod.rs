//! Provider abstraction, failure taxonomy, registry, and retry engine
//!
//! This module is the resilience layer between application logic and an
//! unreliable hosted LLM provider: it classifies failures, decides what is
//! worth retrying and how long to wait, and keeps the set of available
//! providers behind an explicit registry.

pub mod adapter;
pub mod error;
pub mod registry;
pub mod retry;

pub use adapter::{Provider, ProviderInfo};
pub use error::{BoxedError, FailureKind, ProviderFailure, ProviderResult};
pub use registry::{ProviderRegistry, RegistryError, RegistryResult};
pub use retry::{ExecutionStats, FailureCounts, LastFailure, RetryOrchestrator, RetryPolicy};
