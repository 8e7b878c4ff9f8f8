//! Turns raw completion text into something the renderer can display.
//!
//! The narrative pipeline passes text through untouched. The compliance
//! pipeline parses JSON with a single trailing-brace repair, then checks every
//! required field and score range explicitly, since the model output is free
//! text and nothing upstream guarantees its shape.

use serde_json::{Map, Value};
use thiserror::Error;

use super::report::{CategoryScore, ComplianceReport, DetailedScores, ScoreCategory, MAX_SCORE, MIN_SCORE};
use super::types::RawResponse;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
    #[error("response is not valid JSON ({first}); still invalid after appending a closing brace ({repaired})")]
    Json { first: String, repaired: String },

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("score for `{field}` is {value}, expected an integer between 1 and 10")]
    ScoreOutOfRange { field: String, value: i64 },
}

/// Whether the repair heuristic was needed to parse a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    None,
    TrailingBrace,
}

/// Free-text mode: the completion is the markdown body.
pub fn interpret_narrative(raw: RawResponse) -> String {
    raw.text
}

/// Append exactly one closing brace.
///
/// Recovers a JSON object cut off right after its last member. Applied at
/// most once per response.
pub fn repair_trailing_brace(text: &str) -> String {
    let mut repaired = String::with_capacity(text.len() + 1);
    repaired.push_str(text);
    repaired.push('}');
    repaired
}

/// Remove a surrounding ```json fence if the model added one.
/// A missing closing fence (truncated output) is tolerated.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        // Single-line fence: drop an optional language tag before the payload.
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse `text` as JSON, retrying once with [`repair_trailing_brace`].
pub fn parse_json_with_repair(text: &str) -> Result<(Value, Repair), InterpretError> {
    let candidate = strip_code_fence(text);

    let first = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => return Ok((value, Repair::None)),
        Err(e) => e,
    };

    tracing::warn!(
        error = %first,
        response_chars = candidate.len(),
        "Response JSON did not parse, retrying with a closing brace appended"
    );

    let repaired = repair_trailing_brace(candidate);
    serde_json::from_str::<Value>(&repaired)
        .map(|value| (value, Repair::TrailingBrace))
        .map_err(|second| InterpretError::Json {
            first: first.to_string(),
            repaired: second.to_string(),
        })
}

/// Structured mode: parse and validate a compliance report.
pub fn parse_compliance_report(raw: &RawResponse) -> Result<ComplianceReport, InterpretError> {
    let (value, repair) = parse_json_with_repair(&raw.text)?;
    if repair == Repair::TrailingBrace {
        tracing::info!("Compliance response recovered by trailing-brace repair");
    }

    let object = value
        .as_object()
        .ok_or_else(|| InterpretError::NotAnObject(json_type_name(&value)))?;

    let overall_compliance_score = read_score(object, "overall_compliance_score", "overall_compliance_score")?;

    let detailed = required(object, "detailed_scores", "detailed_scores")?
        .as_object()
        .ok_or_else(|| InterpretError::InvalidField {
            field: "detailed_scores".into(),
            reason: "expected an object".into(),
        })?;

    let detailed_scores = DetailedScores {
        privacy_rule_compliance: read_category(detailed, ScoreCategory::PrivacyRuleCompliance)?,
        security_rule_compliance: read_category(detailed, ScoreCategory::SecurityRuleCompliance)?,
        breach_notification_rule: read_category(detailed, ScoreCategory::BreachNotificationRule)?,
        employee_training: read_category(detailed, ScoreCategory::EmployeeTraining)?,
        data_access_encryption: read_category(detailed, ScoreCategory::DataAccessEncryption)?,
        third_party_agreements: read_category(detailed, ScoreCategory::ThirdPartyAgreements)?,
    };

    let summary = read_string(object, "summary", "summary")?;
    let recommendations = read_recommendations(object)?;

    Ok(ComplianceReport {
        overall_compliance_score,
        detailed_scores,
        summary,
        recommendations,
    })
}

/// Look up `key`, treating `null` the same as absent.
fn required<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Value, InterpretError> {
    match object.get(key) {
        None | Some(Value::Null) => Err(InterpretError::MissingField(path.to_string())),
        Some(value) => Ok(value),
    }
}

fn read_score(object: &Map<String, Value>, key: &str, path: &str) -> Result<u8, InterpretError> {
    let value = required(object, key, path)?;
    let score = value.as_i64().ok_or_else(|| InterpretError::InvalidField {
        field: path.to_string(),
        reason: format!("expected an integer, found {}", json_type_name(value)),
    })?;

    if score < i64::from(MIN_SCORE) || score > i64::from(MAX_SCORE) {
        return Err(InterpretError::ScoreOutOfRange {
            field: path.to_string(),
            value: score,
        });
    }
    // Range checked above.
    Ok(score as u8)
}

fn read_string(object: &Map<String, Value>, key: &str, path: &str) -> Result<String, InterpretError> {
    let value = required(object, key, path)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| InterpretError::InvalidField {
            field: path.to_string(),
            reason: format!("expected a string, found {}", json_type_name(value)),
        })
}

fn read_category(
    detailed: &Map<String, Value>,
    category: ScoreCategory,
) -> Result<CategoryScore, InterpretError> {
    let path = format!("detailed_scores.{}", category.key());
    let entry = required(detailed, category.key(), &path)?
        .as_object()
        .ok_or_else(|| InterpretError::InvalidField {
            field: path.clone(),
            reason: "expected an object with `score` and `justification`".into(),
        })?;

    Ok(CategoryScore {
        score: read_score(entry, "score", &format!("{path}.score"))?,
        justification: read_string(entry, "justification", &format!("{path}.justification"))?,
    })
}

fn read_recommendations(object: &Map<String, Value>) -> Result<Vec<String>, InterpretError> {
    let value = required(object, "recommendations", "recommendations")?;
    let items = value.as_array().ok_or_else(|| InterpretError::InvalidField {
        field: "recommendations".into(),
        reason: format!("expected an array, found {}", json_type_name(value)),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| InterpretError::InvalidField {
                    field: format!("recommendations[{i}]"),
                    reason: format!("expected a string, found {}", json_type_name(item)),
                })
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
