// src/types/requirements.rs
use serde::{Deserialize, Serialize};

pub const NOT_SPECIFIED: &str = "not-specified";

/// Structured requirements extracted from one job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRequirements {
    pub skills: Vec<String>,
    pub experience_years: u32,
    pub employment_type: String,
    pub raw_content: String,
}

impl ParsedRequirements {
    /// Empty-but-valid result used whenever extraction fails.
    pub fn fallback(content: &str) -> Self {
        Self {
            skills: Vec::new(),
            experience_years: 0,
            employment_type: NOT_SPECIFIED.to_string(),
            raw_content: content.to_string(),
        }
    }
}
