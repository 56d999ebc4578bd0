//! Stage-1 parse recovery for raw model output
//!
//! Hosted models asked for JSON routinely wrap it in markdown fences,
//! preface it with prose, or emit almost-JSON with trailing commas and
//! unquoted keys. This module tries a strict parse first and then walks a
//! fixed recovery ladder: fenced code block, first balanced object, then a
//! chain of textual repairs. The repair chain is regex-based and heuristic
//! by design; it is a best-effort fallback, not a lenient-JSON parser.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

static FENCED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("fenced block pattern")
});

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern"));

static UNQUOTED_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").expect("unquoted key pattern")
});

static UNQUOTED_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":\s*([A-Za-z_][A-Za-z0-9_ .\-]*)").expect("unquoted value pattern")
});

/// A successfully parsed response, with a flag for how it got there
#[derive(Debug, Clone)]
pub struct RecoveredParse {
    /// The parsed JSON tree
    pub value: Value,

    /// True when any recovery step was needed (stages 1a-1c)
    pub recovered: bool,
}

/// Parse raw model output, walking the recovery ladder on failure
///
/// Returns the first parse that succeeds. When nothing parses, the
/// accumulated error from every stage is returned so the caller can report
/// the full story.
pub fn parse_with_recovery(raw: &str, attempt_recovery: bool) -> Result<RecoveredParse, Vec<String>> {
    let mut errors = Vec::new();

    match serde_json::from_str::<Value>(raw) {
        Ok(value) => {
            return Ok(RecoveredParse {
                value,
                recovered: false,
            })
        }
        Err(err) => errors.push(format!("direct parse failed: {err}")),
    }

    if !attempt_recovery {
        return Err(errors);
    }

    // 1a: first fenced code block
    match extract_fenced_block(raw) {
        Some(block) => match serde_json::from_str::<Value>(block) {
            Ok(value) => {
                debug!("parse recovered from fenced code block");
                return Ok(RecoveredParse {
                    value,
                    recovered: true,
                });
            }
            Err(err) => errors.push(format!("fenced block parse failed: {err}")),
        },
        None => errors.push("no fenced code block found".to_string()),
    }

    // 1b: first balanced {...} substring
    match extract_balanced_object(raw) {
        Some(object) => match serde_json::from_str::<Value>(&object) {
            Ok(value) => {
                debug!("parse recovered from balanced object extraction");
                return Ok(RecoveredParse {
                    value,
                    recovered: true,
                });
            }
            Err(err) => errors.push(format!("balanced object parse failed: {err}")),
        },
        None => errors.push("no balanced object found".to_string()),
    }

    // 1c: textual repair chain, then one final parse
    let repaired = repair_json_text(raw);
    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => {
            debug!("parse recovered after textual repairs");
            Ok(RecoveredParse {
                value,
                recovered: true,
            })
        }
        Err(err) => {
            errors.push(format!("repaired text parse failed: {err}"));
            Err(errors)
        }
    }
}

/// Extract the contents of the first fenced code block, if any
fn extract_fenced_block(raw: &str) -> Option<&str> {
    FENCED_BLOCK_RE
        .captures(raw)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Extract the first balanced `{...}` substring, respecting strings
fn extract_balanced_object(raw: &str) -> Option<String> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(raw[start..start + offset + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Apply the textual repair chain: trailing commas, unquoted keys,
/// unquoted scalar values
fn repair_json_text(raw: &str) -> String {
    let text = TRAILING_COMMA_RE.replace_all(raw, "$1");
    let text = UNQUOTED_KEY_RE.replace_all(&text, "$1\"$2\":");
    let text = UNQUOTED_VALUE_RE.replace_all(&text, |caps: &regex::Captures<'_>| {
        let value = caps[1].trim();
        // Bare literals and numbers are already valid JSON scalars
        if value == "true" || value == "false" || value == "null" || value.parse::<f64>().is_ok() {
            format!(": {value}")
        } else {
            format!(": \"{value}\"")
        }
    });
    text.into_owned()
}
