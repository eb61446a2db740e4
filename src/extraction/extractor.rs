// src/extraction/extractor.rs
use std::sync::Arc;
use tracing::{error, info, warn};

use super::normalize::parse_model_reply;
use super::prompt::{build_user_prompt, extraction_options, SYSTEM_PROMPT};
use crate::core::CompletionModel;
use crate::types::ParsedRequirements;

/// Turns job description text into `ParsedRequirements` through a completion model.
pub struct RequirementsExtractor {
    model: Arc<dyn CompletionModel>,
}

impl RequirementsExtractor {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Never fails: a model error or an unparsable reply produces
    /// `ParsedRequirements::fallback`. No retry.
    pub async fn extract(&self, content: &str) -> ParsedRequirements {
        let prompt = build_user_prompt(content);

        let reply = match self
            .model
            .complete(SYSTEM_PROMPT, &prompt, extraction_options())
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                error!("Model call failed, returning empty extraction: {:#}", e);
                return ParsedRequirements::fallback(content);
            }
        };

        match parse_model_reply(&reply, content) {
            Ok(parsed) => {
                info!(
                    "Extracted {} skills, {} years, employment type '{}'",
                    parsed.skills.len(),
                    parsed.experience_years,
                    parsed.employment_type
                );
                parsed
            }
            Err(e) => {
                warn!("Model reply is not valid JSON, returning empty extraction: {}", e);
                ParsedRequirements::fallback(content)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CompletionOptions;
    use std::sync::Mutex;

    struct ScriptedModel {
        reply: std::result::Result<String, String>,
        calls: Mutex<Vec<(String, String, CompletionOptions)>>,
    }

    impl ScriptedModel {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[rocket::async_trait]
    impl CompletionModel for ScriptedModel {
        async fn complete(
            &self,
            system_prompt: &str,
            user_prompt: &str,
            options: CompletionOptions,
        ) -> anyhow::Result<String> {
            self.calls.lock().unwrap().push((
                system_prompt.to_string(),
                user_prompt.to_string(),
                options,
            ));
            self.reply.clone().map_err(|msg| anyhow::anyhow!(msg))
        }
    }

    #[tokio::test]
    async fn test_extract_sends_deterministic_json_request() {
        let model = ScriptedModel::replying(
            r#"{"skills": ["Go"], "experienceYears": 2, "employmentType": "Contract"}"#,
        );
        let extractor = RequirementsExtractor::new(model.clone());

        let parsed = extractor.extract("Go contractor, 2 years").await;
        assert_eq!(parsed.skills, vec!["Go"]);
        assert_eq!(parsed.experience_years, 2);
        assert_eq!(parsed.employment_type, "contract");

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (system, user, options) = &calls[0];
        assert_eq!(system, SYSTEM_PROMPT);
        assert!(user.contains("Go contractor, 2 years"));
        assert!(options.json_mode);
        assert!((options.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_model_error_falls_back() {
        let model = ScriptedModel::failing("429 insufficient_quota");
        let extractor = RequirementsExtractor::new(model.clone());

        let parsed = extractor.extract("Some job").await;
        assert_eq!(parsed, ParsedRequirements::fallback("Some job"));
        assert_eq!(model.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_json_reply_falls_back() {
        let extractor = RequirementsExtractor::new(ScriptedModel::replying("I could not find any."));

        let parsed = extractor.extract("Looking for someone").await;
        assert!(parsed.skills.is_empty());
        assert_eq!(parsed.experience_years, 0);
        assert_eq!(parsed.employment_type, "not-specified");
        assert_eq!(parsed.raw_content, "Looking for someone");
    }
}
