//! Tests for the staged response validation and recovery pipeline

use resumelift_core::validation::{
    ResponseKind, ResponseValidator, ResumeValidator, ValidationOptions,
};
use serde_json::{json, Value};
use std::sync::Arc;
use test_case::test_case;

fn validator() -> ResponseValidator {
    ResponseValidator::new(ValidationOptions::default())
}

fn complete_review() -> Value {
    json!({
        "strengths": ["targeted summary", "strong action verbs"],
        "weaknesses": ["no metrics in experience section"],
        "opportunities": ["add a certifications section"],
        "prioritizedActions": ["quantify the top three achievements"],
        "confidence": 0.85,
    })
}

fn complete_enhancement() -> Value {
    json!({
        "enhancedContent": {"summary": "Staff engineer with 9 years of experience"},
        "improvements": [{
            "type": "rewrite",
            "section": "summary",
            "original": "Engineer with experience",
            "suggested": "Staff engineer with 9 years of experience",
            "reason": "Mirrors the seniority wording of the job description",
            "confidence": 0.8,
        }],
        "reasoning": "Focused on seniority signals",
        "confidence": 0.9,
        "tokensUsed": 1523,
        "estimatedCost": 0.004,
    })
}

#[test]
fn complete_review_round_trips_clean() {
    let raw = serde_json::to_string(&complete_review()).unwrap();
    let outcome = validator().validate_text(&raw, ResponseKind::Review);

    assert!(outcome.is_valid);
    assert!(outcome.errors.is_empty());
    assert!(outcome.warnings.is_empty());
    assert!(!outcome.recovery_attempted);
    assert!(outcome.recovered_response.is_none());
}

#[test]
fn fenced_json_is_recovered() {
    let raw = format!(
        "Sure! Here is the review:\n```json\n{}\n```",
        serde_json::to_string_pretty(&complete_review()).unwrap()
    );
    let outcome = validator().validate_text(&raw, ResponseKind::Review);

    assert!(outcome.is_valid);
    assert!(outcome.recovery_attempted);
    assert_eq!(outcome.recovered_response, Some(complete_review()));
}

#[test]
fn missing_opportunities_is_a_warning_not_an_error() {
    let mut review = complete_review();
    review.as_object_mut().unwrap().remove("opportunities");

    let outcome = validator().validate_value(&review, ResponseKind::Review);

    assert!(outcome.is_valid);
    assert!(outcome.errors.is_empty());
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("reviewResult.opportunities")));
}

#[test]
fn missing_review_arrays_recover_as_empty() {
    let partial = json!({"strengths": ["good formatting"]});
    let outcome = validator().validate_value(&partial, ResponseKind::Review);

    assert!(!outcome.is_valid);
    assert!(outcome.recovery_attempted);
    let recovered = outcome.recovered_response.expect("recovery should succeed");
    assert_eq!(recovered["weaknesses"], json!([]));
    assert_eq!(recovered["prioritizedActions"], json!([]));
    assert_eq!(recovered["strengths"], json!(["good formatting"]));
    // The remaining error set after recovery is empty
    assert!(outcome.errors.is_empty());
}

#[test]
fn out_of_range_confidence_is_replaced_with_midpoint() {
    let mut review = complete_review();
    review["confidence"] = json!(1.4);

    let outcome = validator().validate_value(&review, ResponseKind::Review);

    assert!(!outcome.is_valid);
    let recovered = outcome.recovered_response.expect("recovery should succeed");
    assert_eq!(recovered["confidence"], json!(0.5));
    assert!(outcome
        .suggestions
        .iter()
        .any(|s| s.contains("between 0 and 1")));
}

#[test]
fn missing_enhanced_content_is_unrecoverable() {
    let value = json!({"improvements": []});
    let outcome = validator().validate_value(&value, ResponseKind::Enhancement);

    assert!(!outcome.is_valid);
    assert!(outcome.recovery_attempted);
    assert!(outcome.recovered_response.is_none());
    assert!(outcome
        .errors
        .iter()
        .any(|e| e.contains("enhancementResult.enhancedContent")));
    assert!(outcome
        .suggestions
        .iter()
        .any(|s| s.contains("enhancedContent")));
}

#[test]
fn missing_improvements_recovers_as_empty_array() {
    let value = json!({"enhancedContent": {"summary": "better"}, "confidence": 0.7});
    let outcome = validator().validate_value(&value, ResponseKind::Enhancement);

    assert!(!outcome.is_valid);
    let recovered = outcome.recovered_response.expect("recovery should succeed");
    assert_eq!(recovered["improvements"], json!([]));
}

#[test]
fn complete_enhancement_is_valid() {
    let outcome = validator().validate_value(&complete_enhancement(), ResponseKind::Enhancement);

    assert!(outcome.is_valid, "errors: {:?}", outcome.errors);
    assert!(outcome.errors.is_empty());
    assert!(!outcome.recovery_attempted);
}

#[test_case("rewrite")]
#[test_case("addition")]
#[test_case("removal")]
#[test_case("reordering")]
#[test_case("keywordOptimization")]
fn known_improvement_kinds_are_accepted(kind: &str) {
    let mut value = complete_enhancement();
    value["improvements"][0]["type"] = json!(kind);

    let outcome = validator().validate_value(&value, ResponseKind::Enhancement);
    assert!(outcome.is_valid, "kind {kind} rejected: {:?}", outcome.errors);
}

#[test]
fn unknown_improvement_kind_is_an_error_with_path() {
    let mut value = complete_enhancement();
    value["improvements"][0]["type"] = json!("embellishment");

    let outcome = validator().validate_value(&value, ResponseKind::Enhancement);

    assert!(!outcome.is_valid);
    assert!(outcome
        .errors
        .iter()
        .any(|e| e.starts_with("enhancementResult.improvements[0].type:")));
}

#[test]
fn improvement_entry_missing_fields_are_itemized() {
    let mut value = complete_enhancement();
    value["improvements"] = json!([{"type": "rewrite", "confidence": 0.5}]);

    let outcome = validator().validate_value(&value, ResponseKind::Enhancement);

    assert!(!outcome.is_valid);
    for field in ["section", "original", "suggested", "reason"] {
        assert!(
            outcome
                .errors
                .iter()
                .any(|e| e.contains(&format!("improvements[0].{field}"))),
            "no error for {field}: {:?}",
            outcome.errors
        );
    }
}

#[test]
fn improvement_wrong_types_are_not_reported_as_missing() {
    let mut value = complete_enhancement();
    value["improvements"][0]["original"] = json!(42);
    value["improvements"][0]["confidence"] = json!("high");

    let outcome = validator().validate_value(&value, ResponseKind::Enhancement);

    assert!(!outcome.is_valid);
    assert!(
        outcome
            .errors
            .iter()
            .any(|e| e.contains("improvements[0].original")
                && e.contains("expected a string, got a number")),
        "errors: {:?}",
        outcome.errors
    );
    assert!(
        outcome
            .errors
            .iter()
            .any(|e| e.contains("improvements[0].confidence")
                && e.contains("expected a number, got a string")),
        "errors: {:?}",
        outcome.errors
    );
    // Present-but-wrong fields must not surface as absent ones
    assert!(!outcome.errors.iter().any(|e| e.contains("missing")));
}

#[test]
fn improvement_non_string_type_field_is_a_type_mismatch() {
    let mut value = complete_enhancement();
    value["improvements"][0]["type"] = json!(3);

    let outcome = validator().validate_value(&value, ResponseKind::Enhancement);

    assert!(!outcome.is_valid);
    assert!(outcome
        .errors
        .iter()
        .any(|e| e.starts_with("enhancementResult.improvements[0].type:")
            && e.contains("expected a string")));
}

#[test]
fn improvement_confidence_out_of_range_is_an_error() {
    let mut value = complete_enhancement();
    value["improvements"][0]["confidence"] = json!(7);

    let outcome = validator().validate_value(&value, ResponseKind::Enhancement);

    assert!(!outcome.is_valid);
    assert!(outcome
        .errors
        .iter()
        .any(|e| e.contains("improvements[0].confidence")));
}

/// Collaborator stub that reports a fixed set of schema findings
struct FussyResumeValidator;

impl ResumeValidator for FussyResumeValidator {
    fn validate(&self, _resume: &Value) -> Vec<String> {
        vec!["experience[0].endDate is before startDate".to_string()]
    }
}

#[test]
fn resume_collaborator_findings_are_warnings_by_default() {
    let options = ValidationOptions {
        resume_validator: Some(Arc::new(FussyResumeValidator)),
        ..Default::default()
    };
    let outcome = ResponseValidator::new(options)
        .validate_value(&complete_enhancement(), ResponseKind::Enhancement);

    assert!(outcome.is_valid);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("endDate is before startDate")));
}

#[test]
fn strict_mode_folds_collaborator_findings_into_errors() {
    let options = ValidationOptions {
        strict: true,
        resume_validator: Some(Arc::new(FussyResumeValidator)),
        ..Default::default()
    };
    let outcome = ResponseValidator::new(options)
        .validate_value(&complete_enhancement(), ResponseKind::Enhancement);

    assert!(!outcome.is_valid);
    assert!(outcome
        .errors
        .iter()
        .any(|e| e.contains("enhancementResult.enhancedContent:")));
}

#[test]
fn unparseable_text_accumulates_all_stage_errors() {
    let outcome = validator().validate_text("utter gibberish with no json", ResponseKind::Review);

    assert!(!outcome.is_valid);
    assert!(outcome.recovery_attempted);
    assert!(outcome.recovered_response.is_none());
    assert!(outcome.errors.len() >= 2, "errors: {:?}", outcome.errors);
    assert!(!outcome.suggestions.is_empty());
}

#[test]
fn recovery_can_be_disabled_entirely() {
    let options = ValidationOptions {
        attempt_recovery: false,
        ..Default::default()
    };
    let validator = ResponseValidator::new(options);

    let outcome = validator.validate_text("{not json", ResponseKind::Review);
    assert!(!outcome.is_valid);
    assert!(!outcome.recovery_attempted);
    assert_eq!(outcome.errors.len(), 1);

    let partial = json!({"strengths": []});
    let outcome = validator.validate_value(&partial, ResponseKind::Review);
    assert!(!outcome.is_valid);
    assert!(!outcome.recovery_attempted);
    assert!(outcome.recovered_response.is_none());
}

#[test]
fn repaired_almost_json_passes_structural_checks() {
    // Trailing comma plus unquoted keys, as models like to emit
    let raw = r#"{strengths: ["targeted summary"], weaknesses: [], prioritizedActions: ["add metrics"], confidence: 0.75,}"#;
    let outcome = validator().validate_text(raw, ResponseKind::Review);

    assert!(outcome.is_valid, "errors: {:?}", outcome.errors);
    assert!(outcome.recovery_attempted);
    let recovered = outcome.recovered_response.expect("stage-1 recovery value");
    assert_eq!(recovered["confidence"], json!(0.75));
}
