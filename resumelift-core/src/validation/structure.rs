//! Stage-2 structural checks and stage-3 structural recovery
//!
//! Checks a parsed response tree against the expected shape for its
//! response kind. Every deviation becomes one error string carrying a
//! field path rooted at `reviewResult` or `enhancementResult`, e.g.
//! `reviewResult.strengths[2]`.

use crate::validation::ResponseKind;
use serde_json::{json, Map, Value};

/// Required string-array fields of a review response
const REVIEW_REQUIRED_ARRAYS: [&str; 3] = ["strengths", "weaknesses", "prioritizedActions"];

/// Which error categories fired during a structural check
///
/// Feeds stage-5 suggestion derivation; tracked independently of the
/// error strings themselves.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ErrorCategories {
    pub missing_object: bool,
    pub missing_field: bool,
    pub type_mismatch: bool,
    pub confidence_range: bool,
}

/// Outcome of one structural check pass
#[derive(Debug, Default)]
pub(crate) struct StructureReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub categories: ErrorCategories,
}

impl StructureReport {
    fn missing(&mut self, path: String) {
        self.errors.push(format!("{path}: required field is missing"));
        self.categories.missing_field = true;
    }

    fn mismatch(&mut self, path: String, expected: &str, actual: &Value) {
        self.errors.push(format!(
            "{path}: expected {expected}, got {}",
            type_name(actual)
        ));
        self.categories.type_mismatch = true;
    }

    fn optional_missing(&mut self, path: String) {
        self.warnings.push(format!("{path}: optional field is missing"));
    }
}

/// Human name of a JSON value's type, for error messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Check a parsed response against the shape its kind demands
pub(crate) fn check_structure(value: &Value, kind: ResponseKind) -> StructureReport {
    let mut report = StructureReport::default();
    let root = kind.root();

    let Some(object) = value.as_object() else {
        report.mismatch(root.to_string(), "a JSON object", value);
        return report;
    };

    match kind {
        ResponseKind::Review => check_review(object, root, &mut report),
        ResponseKind::Enhancement => check_enhancement(object, root, &mut report),
    }
    report
}

fn check_review(object: &Map<String, Value>, root: &str, report: &mut StructureReport) {
    for field in REVIEW_REQUIRED_ARRAYS {
        match object.get(field) {
            None => report.missing(format!("{root}.{field}")),
            Some(value) => check_string_array(value, &format!("{root}.{field}"), report),
        }
    }

    match object.get("opportunities") {
        None => report.optional_missing(format!("{root}.opportunities")),
        Some(value) => check_string_array(value, &format!("{root}.opportunities"), report),
    }

    check_confidence(object, root, report);
}

fn check_enhancement(object: &Map<String, Value>, root: &str, report: &mut StructureReport) {
    match object.get("enhancedContent") {
        None => {
            report
                .errors
                .push(format!("{root}.enhancedContent: required field is missing"));
            report.categories.missing_object = true;
        }
        Some(value) if !value.is_object() => {
            report.mismatch(format!("{root}.enhancedContent"), "an object", value);
            report.categories.missing_object = true;
        }
        Some(_) => {}
    }

    match object.get("improvements") {
        None => report.missing(format!("{root}.improvements")),
        Some(value) if !value.is_array() => {
            report.mismatch(format!("{root}.improvements"), "an array", value)
        }
        Some(_) => {}
    }

    if let Some(value) = object.get("reasoning") {
        if !value.is_string() {
            report.mismatch(format!("{root}.reasoning"), "a string", value);
        }
    }
    for field in ["tokensUsed", "estimatedCost"] {
        if let Some(value) = object.get(field) {
            if !value.is_number() {
                report.mismatch(format!("{root}.{field}"), "a number", value);
            }
        }
    }

    check_confidence(object, root, report);
}

/// Optional confidence field: absent is a warning, present must be a
/// number within [0, 1]
fn check_confidence(object: &Map<String, Value>, root: &str, report: &mut StructureReport) {
    match object.get("confidence") {
        None => report.optional_missing(format!("{root}.confidence")),
        Some(value) => match value.as_f64() {
            None => report.mismatch(format!("{root}.confidence"), "a number", value),
            Some(n) if !(0.0..=1.0).contains(&n) => {
                report
                    .errors
                    .push(format!("{root}.confidence: must be within [0, 1], got {n}"));
                report.categories.confidence_range = true;
            }
            Some(_) => {}
        },
    }
}

fn check_string_array(value: &Value, path: &str, report: &mut StructureReport) {
    let Some(items) = value.as_array() else {
        report.mismatch(path.to_string(), "an array", value);
        return;
    };
    for (index, item) in items.iter().enumerate() {
        if !item.is_string() {
            report.mismatch(format!("{path}[{index}]"), "a string", item);
        }
    }
}

/// Attempt stage-3 structural recovery on an invalid response
///
/// Missing arrays come back as empty arrays (a faithful degraded form of a
/// partial answer) and a broken confidence is replaced with 0.5. A missing
/// or non-object `enhancedContent` cannot be synthesized, so enhancement
/// responses without one are unrecoverable and yield None. The caller
/// re-validates whatever this returns.
pub(crate) fn repair_structure(value: &Value, kind: ResponseKind) -> Option<Value> {
    let mut repaired = value.as_object()?.clone();

    match kind {
        ResponseKind::Review => {
            for field in REVIEW_REQUIRED_ARRAYS {
                repaired.entry(field).or_insert_with(|| json!([]));
            }
            repaired.entry("opportunities").or_insert_with(|| json!([]));
        }
        ResponseKind::Enhancement => {
            if !repaired.get("enhancedContent").is_some_and(Value::is_object) {
                return None;
            }
            repaired.entry("improvements").or_insert_with(|| json!([]));
        }
    }

    if let Some(confidence) = repaired.get("confidence") {
        let valid = confidence
            .as_f64()
            .is_some_and(|n| (0.0..=1.0).contains(&n));
        if !valid {
            repaired.insert("confidence".to_string(), json!(0.5));
        }
    }

    Some(Value::Object(repaired))
}
