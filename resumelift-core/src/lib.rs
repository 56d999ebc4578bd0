//! Resumelift Core Library
//!
//! Resilience core for LLM-assisted resume enhancement. The crate sits
//! between application logic and a hosted model provider and owns four
//! concerns: the failure taxonomy, the provider registry, the retry
//! orchestrator, and the response validation/recovery pipeline. Prompt
//! construction, rendering, and the CLI/HTTP surface live in the
//! application shell and consume this crate as a library.

pub mod protocol;
pub mod providers;
pub mod validation;

pub use protocol::types::{
    EnhancementRequest, EnhancementResult, Improvement, ImprovementKind, ReviewRequest,
    ReviewResult,
};
pub use providers::{
    ExecutionStats, FailureKind, Provider, ProviderFailure, ProviderInfo, ProviderRegistry,
    ProviderResult, RegistryError, RetryOrchestrator, RetryPolicy,
};
pub use validation::{
    ResponseKind, ResponseValidator, ResumeValidator, ValidationOptions, ValidationOutcome,
};

/// Returns the version of the Resumelift Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
