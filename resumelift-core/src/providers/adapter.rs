//! Provider trait and descriptive metadata
//!
//! Defines the capability set every hosted-LLM provider must expose. The
//! orchestrator invokes exactly one of these capabilities per
//! `execute_with_retry` call; the registry validates the metadata returned
//! by [`Provider::info`] before accepting a registration.

use crate::protocol::types::{EnhancementRequest, EnhancementResult, ReviewRequest, ReviewResult};
use crate::providers::error::ProviderResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Core trait all resume-enhancement providers must implement
#[async_trait]
pub trait Provider: Send + Sync {
    /// Descriptive metadata for this provider
    ///
    /// `name` and `display_name` must be non-empty; the registry rejects
    /// providers that return empty strings here.
    fn info(&self) -> ProviderInfo;

    /// Review a resume against a job description without changing it
    async fn review(&self, request: &ReviewRequest) -> ProviderResult<ReviewResult>;

    /// Rewrite the requested resume sections
    async fn enhance(&self, request: &EnhancementRequest) -> ProviderResult<EnhancementResult>;

    /// Combined pass: review first, then rewrite based on the findings
    async fn review_and_enhance(
        &self,
        request: &EnhancementRequest,
    ) -> ProviderResult<EnhancementResult>;

    /// Provider's own cheap sanity check on a raw response
    fn validate_response(&self, response: &Value) -> bool;

    /// Estimated cost of the request in USD
    fn estimate_cost(&self, request: &EnhancementRequest) -> f64;
}

/// Descriptive metadata about a provider implementation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Canonical name used for registry lookups (e.g. "gemini")
    pub name: String,

    /// Human-facing name (e.g. "Google Gemini")
    pub display_name: String,

    /// Model identifier the provider is bound to, when fixed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Whether the provider can stream partial output
    pub supports_streaming: bool,
}

impl ProviderInfo {
    /// Create provider metadata with the two required names
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            model: None,
            supports_streaming: false,
        }
    }

    /// Bind the metadata to a specific model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
