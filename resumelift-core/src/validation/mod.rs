//! Response validation and recovery engine
//!
//! Given raw text or a parsed tree from a provider, determines structural
//! validity against one of the two response shapes and attempts staged
//! recovery: parse repair (stage 1), structural checks (stage 2),
//! structural recovery (stage 3), nested enhancement checks (stage 4), and
//! remediation suggestions (stage 5).
//!
//! The engine never fails: every entry point returns a
//! [`ValidationOutcome`] describing what went wrong, with the repaired
//! value attached when recovery restored a structurally valid response.

mod recovery;
mod structure;

pub use recovery::{parse_with_recovery, RecoveredParse};

use crate::protocol::types::ImprovementKind;
use serde_json::Value;
use std::sync::Arc;
use structure::{check_structure, repair_structure, type_name, ErrorCategories, StructureReport};
use tracing::debug;

/// Which response shape to validate against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Review shape: strengths/weaknesses/opportunities/prioritizedActions
    Review,
    /// Enhancement shape: enhancedContent plus improvements
    Enhancement,
}

impl ResponseKind {
    /// Root segment used in error field paths
    pub fn root(&self) -> &'static str {
        match self {
            Self::Review => "reviewResult",
            Self::Enhancement => "enhancementResult",
        }
    }
}

/// External collaborator that validates a resume-like object
///
/// Consumed only by the stage-4 nested check on enhancement responses;
/// the schema it enforces is owned by the application shell.
pub trait ResumeValidator: Send + Sync {
    /// Returns one error string per schema violation; empty means valid
    fn validate(&self, resume: &Value) -> Vec<String>;
}

/// Configuration for one validator instance
#[derive(Clone)]
pub struct ValidationOptions {
    /// Attempt parse and structural recovery (stages 1a-1c and 3)
    pub attempt_recovery: bool,

    /// Fold resume-collaborator findings in as errors instead of warnings
    pub strict: bool,

    /// Run the stage-4 nested checks on enhancement responses
    pub check_improvements: bool,

    /// Collaborator for the nested resume check, when the caller has one
    pub resume_validator: Option<Arc<dyn ResumeValidator>>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            attempt_recovery: true,
            strict: false,
            check_improvements: true,
            resume_validator: None,
        }
    }
}

/// Result of validating one response
///
/// `is_valid` describes the input as given; `recovered_response` is
/// populated when recovery produced a structurally valid value even though
/// the input was not one.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// Whether the input itself was structurally valid
    pub is_valid: bool,

    /// Hard errors, each carrying a field path or parse-stage prefix
    pub errors: Vec<String>,

    /// Soft findings that do not affect validity
    pub warnings: Vec<String>,

    /// Human-readable remediation hints derived from the error categories
    pub suggestions: Vec<String>,

    /// Whether any recovery stage ran
    pub recovery_attempted: bool,

    /// The repaired, now-valid response, when recovery succeeded
    pub recovered_response: Option<Value>,
}

/// Staged validator for provider responses
#[derive(Clone, Default)]
pub struct ResponseValidator {
    options: ValidationOptions,
}

impl ResponseValidator {
    /// Create a validator with the given options
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// Validate raw model output (stage 1 parse, then stages 2-5)
    pub fn validate_text(&self, raw: &str, kind: ResponseKind) -> ValidationOutcome {
        match recovery::parse_with_recovery(raw, self.options.attempt_recovery) {
            Ok(parsed) => {
                let mut outcome = self.validate_value(&parsed.value, kind);
                if parsed.recovered {
                    outcome.recovery_attempted = true;
                    // A value salvaged from malformed text counts as a
                    // recovered response when it holds up structurally.
                    if outcome.is_valid && outcome.recovered_response.is_none() {
                        outcome.recovered_response = Some(parsed.value);
                    }
                }
                outcome
            }
            Err(parse_errors) => {
                debug!(kind = kind.root(), "response text failed every parse stage");
                ValidationOutcome {
                    is_valid: false,
                    errors: parse_errors,
                    warnings: Vec::new(),
                    suggestions: vec![
                        "The response is not parseable JSON; prompt the model to reply with a single JSON object and no surrounding prose".to_string(),
                    ],
                    recovery_attempted: self.options.attempt_recovery,
                    recovered_response: None,
                }
            }
        }
    }

    /// Validate an already-parsed response tree (stages 2-5)
    pub fn validate_value(&self, value: &Value, kind: ResponseKind) -> ValidationOutcome {
        let StructureReport {
            errors: structural_errors,
            warnings,
            mut categories,
        } = check_structure(value, kind);

        let structurally_valid = structural_errors.is_empty();
        let mut errors = structural_errors;
        let mut warnings = warnings;
        let mut recovery_attempted = false;
        let mut recovered_response = None;

        // Stage 3: structural recovery, re-validated before acceptance
        if !structurally_valid && self.options.attempt_recovery {
            recovery_attempted = true;
            if let Some(repaired) = repair_structure(value, kind) {
                let second = check_structure(&repaired, kind);
                if second.errors.is_empty() {
                    debug!(kind = kind.root(), "structural recovery succeeded");
                    recovered_response = Some(repaired);
                }
                // Report the error set that remains after recovery
                errors = second.errors;
            }
        }

        // Stage 4: nested checks on the best value available
        let mut nested_errors = Vec::new();
        if kind == ResponseKind::Enhancement && self.options.check_improvements {
            let target = recovered_response.as_ref().unwrap_or(value);
            let nested = self.check_nested(target, kind.root(), &mut warnings, &mut categories);
            nested_errors = nested;
            if !nested_errors.is_empty() {
                // The repaired value did not survive the nested checks
                recovered_response = None;
            }
        }

        let is_valid = structurally_valid && nested_errors.is_empty();
        errors.extend(nested_errors);

        ValidationOutcome {
            is_valid,
            suggestions: suggestions_for(&categories),
            errors,
            warnings,
            recovery_attempted,
            recovered_response,
        }
    }

    /// Stage 4: nested resume and improvement-entry checks
    fn check_nested(
        &self,
        value: &Value,
        root: &str,
        warnings: &mut Vec<String>,
        categories: &mut ErrorCategories,
    ) -> Vec<String> {
        let mut errors = Vec::new();

        if let (Some(validator), Some(resume)) =
            (&self.options.resume_validator, value.get("enhancedContent"))
        {
            for finding in validator.validate(resume) {
                let message = format!("{root}.enhancedContent: {finding}");
                if self.options.strict {
                    errors.push(message);
                } else {
                    warnings.push(message);
                }
            }
        }

        if let Some(improvements) = value.get("improvements").and_then(Value::as_array) {
            for (index, entry) in improvements.iter().enumerate() {
                check_improvement_entry(entry, root, index, &mut errors, categories);
            }
        }

        errors
    }
}

/// Validate one improvement entry: fixed-enum type, required string
/// fields, and a confidence within [0, 1]
fn check_improvement_entry(
    entry: &Value,
    root: &str,
    index: usize,
    errors: &mut Vec<String>,
    categories: &mut ErrorCategories,
) {
    let path = format!("{root}.improvements[{index}]");
    let Some(object) = entry.as_object() else {
        errors.push(format!("{path}: expected an object"));
        categories.type_mismatch = true;
        return;
    };

    match object.get("type") {
        None => {
            errors.push(format!("{path}.type: required string field is missing"));
            categories.missing_field = true;
        }
        Some(value) => match value.as_str() {
            None => {
                errors.push(format!(
                    "{path}.type: expected a string, got {}",
                    type_name(value)
                ));
                categories.type_mismatch = true;
            }
            Some(name) if ImprovementKind::from_wire(name).is_some() => {}
            Some(name) => {
                errors.push(format!(
                    "{path}.type: '{name}' is not one of {}",
                    ImprovementKind::WIRE_NAMES.join(", ")
                ));
                categories.type_mismatch = true;
            }
        },
    }

    for field in ["section", "original", "suggested", "reason"] {
        match object.get(field) {
            None => {
                errors.push(format!("{path}.{field}: required string field is missing"));
                categories.missing_field = true;
            }
            Some(value) if !value.is_string() => {
                errors.push(format!(
                    "{path}.{field}: expected a string, got {}",
                    type_name(value)
                ));
                categories.type_mismatch = true;
            }
            Some(_) => {}
        }
    }

    match object.get("confidence") {
        None => {
            errors.push(format!("{path}.confidence: required number is missing"));
            categories.missing_field = true;
        }
        Some(value) => match value.as_f64() {
            None => {
                errors.push(format!(
                    "{path}.confidence: expected a number, got {}",
                    type_name(value)
                ));
                categories.type_mismatch = true;
            }
            Some(n) if !(0.0..=1.0).contains(&n) => {
                errors.push(format!("{path}.confidence: must be within [0, 1], got {n}"));
                categories.confidence_range = true;
            }
            Some(_) => {}
        },
    }
}

/// Stage 5: remediation hints keyed off which error categories fired
fn suggestions_for(categories: &ErrorCategories) -> Vec<String> {
    let mut suggestions = Vec::new();
    if categories.missing_object {
        suggestions.push(
            "The core content object is missing; prompt the model to return the full enhanced resume under 'enhancedContent'".to_string(),
        );
    }
    if categories.missing_field {
        suggestions.push(
            "Required fields are missing; restate the exact response schema in the prompt"
                .to_string(),
        );
    }
    if categories.type_mismatch {
        suggestions.push(
            "Some fields have the wrong type; ask the model to emit JSON only, with arrays of strings for list fields".to_string(),
        );
    }
    if categories.confidence_range {
        suggestions.push(
            "Confidence must be a decimal between 0 and 1; instruct the model to express it as a fraction".to_string(),
        );
    }
    suggestions
}
