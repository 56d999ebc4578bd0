//! Core protocol types for resume review and enhancement
//!
//! These are the structured forms the rest of the crate works with once a
//! provider response has survived validation. Wire names are camelCase
//! because that is what the hosted models are prompted to emit; the
//! validator checks raw `serde_json::Value` trees against the same field
//! names before anything is deserialized into these types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request for a review pass over a resume against a job description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// The resume as structured JSON
    pub resume: Value,

    /// The target job description, plain text
    pub job_description: String,

    /// Optional area to focus the review on (e.g. "experience")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

/// Request for an enhancement pass (section rewrite or combined review+rewrite)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementRequest {
    /// The resume as structured JSON
    pub resume: Value,

    /// The target job description, plain text
    pub job_description: String,

    /// Restrict enhancement to these sections; None means whole resume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<String>>,

    /// Free-form caller instructions forwarded into the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Result of a review operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    /// What the resume already does well
    pub strengths: Vec<String>,

    /// Gaps relative to the job description
    pub weaknesses: Vec<String>,

    /// Optional openings the candidate could exploit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunities: Option<Vec<String>>,

    /// Concrete actions, most impactful first
    pub prioritized_actions: Vec<String>,

    /// Model self-reported confidence in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Result of an enhancement operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementResult {
    /// The rewritten resume as structured JSON
    pub enhanced_content: Value,

    /// Itemized changes the model made
    pub improvements: Vec<Improvement>,

    /// Model's explanation of its overall approach
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    /// Model self-reported confidence in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Tokens consumed by the call, when the provider reports them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,

    /// Estimated cost of the call in USD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
}

/// One itemized change within an enhancement result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    /// What kind of change this is
    #[serde(rename = "type")]
    pub kind: ImprovementKind,

    /// Resume section the change applies to
    pub section: String,

    /// Original text
    pub original: String,

    /// Suggested replacement text
    pub suggested: String,

    /// Why the model made this change
    pub reason: String,

    /// Confidence in this individual change, in [0, 1]
    pub confidence: f64,
}

/// The closed set of change kinds a provider may report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImprovementKind {
    /// Existing text rephrased
    Rewrite,
    /// New content added
    Addition,
    /// Content removed
    Removal,
    /// Content moved or re-ranked
    Reordering,
    /// Wording aligned with job-description keywords
    KeywordOptimization,
}

impl ImprovementKind {
    /// Wire names accepted for the `type` field of an improvement entry
    pub const WIRE_NAMES: [&'static str; 5] = [
        "rewrite",
        "addition",
        "removal",
        "reordering",
        "keywordOptimization",
    ];

    /// Parse a wire name, returning None for anything outside the set
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "rewrite" => Some(Self::Rewrite),
            "addition" => Some(Self::Addition),
            "removal" => Some(Self::Removal),
            "reordering" => Some(Self::Reordering),
            "keywordOptimization" => Some(Self::KeywordOptimization),
            _ => None,
        }
    }
}

impl ReviewRequest {
    /// Create a review request for a resume and job description
    pub fn new(resume: Value, job_description: impl Into<String>) -> Self {
        Self {
            resume,
            job_description: job_description.into(),
            focus: None,
        }
    }
}

impl EnhancementRequest {
    /// Create an enhancement request for a resume and job description
    pub fn new(resume: Value, job_description: impl Into<String>) -> Self {
        Self {
            resume,
            job_description: job_description.into(),
            sections: None,
            instructions: None,
        }
    }

    /// Restrict the enhancement to specific sections
    pub fn with_sections(mut self, sections: Vec<String>) -> Self {
        self.sections = Some(sections);
        self
    }
}
