// src/types/email.rs
use crate::error::ParserError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SUBJECT_REQUIRED: &str = "Subject is required";
pub const CONTENT_REQUIRED: &str = "Content is required";
pub const EXPECTED_OBJECT: &str = "Expected a JSON object";
pub const BODY_TOO_LARGE: &str = "Request body too large";

/// Request body bytes as received, possibly cut short at the size limit.
#[derive(Debug, Clone, Copy)]
pub struct RawBody<'a> {
    pub bytes: &'a [u8],
    /// `false` when the body was truncated at the limit
    pub complete: bool,
}

impl<'a> RawBody<'a> {
    pub fn new(bytes: &'a [u8], complete: bool) -> Self {
        Self { bytes, complete }
    }
}

impl<'a> From<&'a str> for RawBody<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text.as_bytes(), true)
    }
}

impl<'a> From<&'a String> for RawBody<'a> {
    fn from(text: &'a String) -> Self {
        Self::new(text.as_bytes(), true)
    }
}

/// Job posting email as submitted by the caller. Lives for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailInput {
    pub subject: String,
    pub content: String,
}

impl EmailInput {
    /// Parse and validate a raw request body.
    ///
    /// A truncated body or one that is not UTF-8 is rejected before any field
    /// is looked at. Fields are checked in order (`subject`, then `content`)
    /// and the first violation is reported. Text passes through untouched:
    /// no trimming.
    pub fn from_body<'a>(body: impl Into<RawBody<'a>>) -> Result<Self, ParserError> {
        let body = body.into();
        if !body.complete {
            return Err(ParserError::InvalidInput(BODY_TOO_LARGE.to_string()));
        }

        let text = std::str::from_utf8(body.bytes)
            .map_err(|_| ParserError::InvalidInput(EXPECTED_OBJECT.to_string()))?;
        Self::from_json(text)
    }

    fn from_json(raw_body: &str) -> Result<Self, ParserError> {
        let value: Value = serde_json::from_str(raw_body)
            .map_err(|_| ParserError::InvalidInput(EXPECTED_OBJECT.to_string()))?;

        let fields = value
            .as_object()
            .ok_or_else(|| ParserError::InvalidInput(EXPECTED_OBJECT.to_string()))?;

        let subject = required_text(fields, "subject", SUBJECT_REQUIRED)?;
        let content = required_text(fields, "content", CONTENT_REQUIRED)?;

        Ok(Self { subject, content })
    }
}

fn required_text(
    fields: &Map<String, Value>,
    key: &str,
    message: &str,
) -> Result<String, ParserError> {
    match fields.get(key).and_then(Value::as_str) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ParserError::InvalidInput(message.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(body: &str) -> String {
        match EmailInput::from_body(body) {
            Err(ParserError::InvalidInput(msg)) => msg,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_body() {
        let input =
            EmailInput::from_body(r#"{"subject": "Backend role", "content": "Rust, 3 years"}"#)
                .unwrap();
        assert_eq!(input.subject, "Backend role");
        assert_eq!(input.content, "Rust, 3 years");
    }

    #[test]
    fn test_first_violation_is_subject() {
        assert_eq!(violation(r#"{"subject": "", "content": ""}"#), SUBJECT_REQUIRED);
    }

    #[test]
    fn test_missing_content() {
        assert_eq!(violation(r#"{"subject": "Role"}"#), CONTENT_REQUIRED);
    }

    #[test]
    fn test_wrong_field_type() {
        assert_eq!(violation(r#"{"subject": 42, "content": "text"}"#), SUBJECT_REQUIRED);
        assert_eq!(violation(r#"{"subject": "Role", "content": ["a"]}"#), CONTENT_REQUIRED);
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(violation("not json at all"), EXPECTED_OBJECT);
        assert_eq!(violation(r#"["subject", "content"]"#), EXPECTED_OBJECT);
        assert_eq!(violation(""), EXPECTED_OBJECT);
    }

    #[test]
    fn test_content_is_not_transformed() {
        let body = serde_json::json!({
            "subject": "  Role  ",
            "content": "\n  Skills:\n  - Go\n",
            "extra": true
        })
        .to_string();

        let input = EmailInput::from_body(&body).unwrap();
        assert_eq!(input.subject, "  Role  ");
        assert_eq!(input.content, "\n  Skills:\n  - Go\n");
    }

    #[test]
    fn test_non_utf8_body() {
        let body = RawBody::new(&[0xff, 0xfe, b'{'], true);
        match EmailInput::from_body(body) {
            Err(ParserError::InvalidInput(msg)) => assert_eq!(msg, EXPECTED_OBJECT),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_body() {
        let json = r#"{"subject": "Role", "content": "text"}"#;
        let body = RawBody::new(json.as_bytes(), false);
        match EmailInput::from_body(body) {
            Err(ParserError::InvalidInput(msg)) => assert_eq!(msg, BODY_TOO_LARGE),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
