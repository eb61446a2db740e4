// src/extraction/normalize.rs
//! Coerce a model reply into `ParsedRequirements`

use serde_json::Value;

use crate::types::requirements::{ParsedRequirements, NOT_SPECIFIED};

/// Parse the model's reply text. Blank replies count as `{}`.
///
/// Only a JSON syntax error is reported; every field falls back to its
/// default independently when absent or of the wrong shape.
pub fn parse_model_reply(
    reply: &str,
    content: &str,
) -> Result<ParsedRequirements, serde_json::Error> {
    let text = if reply.trim().is_empty() { "{}" } else { reply };
    let value: Value = serde_json::from_str(text)?;
    Ok(from_reply_value(&value, content))
}

pub fn from_reply_value(value: &Value, content: &str) -> ParsedRequirements {
    ParsedRequirements {
        skills: skills_from(value.get("skills")),
        experience_years: years_from(value.get("experienceYears")),
        employment_type: value
            .get("employmentType")
            .and_then(Value::as_str)
            .map(normalize_employment_type)
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        raw_content: content.to_string(),
    }
}

fn skills_from(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn years_from(value: Option<&Value>) -> u32 {
    let years = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match years {
        // `as` saturates at u32::MAX
        Some(y) if y.is_finite() && y > 0.0 => y.trunc() as u32,
        _ => 0,
    }
}

/// "Full Time" -> "full-time". Blank input becomes "not-specified".
pub fn normalize_employment_type(raw: &str) -> String {
    let normalized = raw
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");

    if normalized.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        normalized
    }
}
