// src/extraction/prompt.rs
use crate::core::CompletionOptions;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts structured information from job descriptions. Always return valid JSON.";

/// Low temperature keeps repeated extractions of the same text stable.
pub const EXTRACTION_TEMPERATURE: f32 = 0.1;

pub fn extraction_options() -> CompletionOptions {
    CompletionOptions {
        temperature: EXTRACTION_TEMPERATURE,
        json_mode: true,
    }
}

pub fn build_user_prompt(content: &str) -> String {
    format!(
        r#"Extract the following information from this job description:
1. A list of required technical skills and technologies
2. Years of experience required (if specified)
3. Employment type (e.g., full-time, part-time, contract)

Format the response as JSON with exactly these fields:
{{
  "skills": ["skill1", "skill2"],
  "experienceYears": number,
  "employmentType": "type"
}}

Job Description:
{}"#,
        content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_content_verbatim() {
        let content = "Skills:\n- Kotlin {braces} stay\n";
        let prompt = build_user_prompt(content);
        assert!(prompt.ends_with(content));
        assert!(prompt.contains(r#""experienceYears": number"#));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_user_prompt("same"), build_user_prompt("same"));
    }
}
