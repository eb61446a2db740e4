// src/web/services.rs
//! Request pipeline behind `POST /api/email-parser`:
//! readiness, session, rate limit, validation, extraction, persistence.

use anyhow::Context;
use std::sync::Arc;

use crate::app_log;
use crate::auth::{SessionProvider, SessionUser};
use crate::core::database::{NewEmail, NewParsedRequirements, RequirementsStore};
use crate::error::ParserError;
use crate::extraction::RequirementsExtractor;
use crate::rate_limit::RateLimiter;
use crate::types::{EmailInput, ParsedRequirements, RawBody};
use crate::web::types::ApiResponse;

pub struct EmailParserService {
    sessions: Arc<dyn SessionProvider>,
    rate_limiter: Arc<dyn RateLimiter>,
    /// `None` when the model provider has no API key
    extractor: Option<RequirementsExtractor>,
    store: Arc<dyn RequirementsStore>,
}

impl EmailParserService {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        rate_limiter: Arc<dyn RateLimiter>,
        extractor: Option<RequirementsExtractor>,
        store: Arc<dyn RequirementsStore>,
    ) -> Self {
        Self {
            sessions,
            rate_limiter,
            extractor,
            store,
        }
    }

    pub fn model_configured(&self) -> bool {
        self.extractor.is_some()
    }

    pub async fn store_healthy(&self) -> bool {
        match self.store.health_check().await {
            Ok(()) => true,
            Err(e) => {
                app_log!(error, "Store health check failed: {:#}", e);
                false
            }
        }
    }

    /// Run the pipeline and map its outcome to a status and envelope.
    /// The body is only decoded after the session and rate-limit checks.
    pub async fn handle<'b>(
        &self,
        token: Option<&str>,
        body: impl Into<RawBody<'b>>,
    ) -> ApiResponse {
        match self.process(token, body.into()).await {
            Ok(parsed) => ApiResponse::success(parsed),
            Err(err) => {
                match &err {
                    ParserError::Internal(source) => {
                        app_log!(error, "Error processing email: {:#}", source)
                    }
                    ParserError::Config => {
                        app_log!(error, "Rejecting request: model provider not configured")
                    }
                    other => app_log!(info, "Rejecting request: {}", other),
                }
                ApiResponse::failure(&err)
            }
        }
    }

    async fn process(
        &self,
        token: Option<&str>,
        body: RawBody<'_>,
    ) -> Result<ParsedRequirements, ParserError> {
        let extractor = self.extractor.as_ref().ok_or(ParserError::Config)?;

        let user = self.authenticate(token).await?;
        self.enforce_rate_limit(&user).await?;

        let input = EmailInput::from_body(body)?;
        app_log!(
            info,
            "User {} submitted email '{}' ({} chars)",
            user.user_id,
            input.subject,
            input.content.len()
        );

        let parsed = extractor.extract(&input.content).await;
        self.persist(&user, input, &parsed).await?;

        Ok(parsed)
    }

    async fn authenticate(&self, token: Option<&str>) -> Result<SessionUser, ParserError> {
        let token = token.ok_or(ParserError::Unauthorized)?;
        self.sessions
            .current_session(token)
            .await
            .ok_or(ParserError::Unauthorized)
    }

    async fn enforce_rate_limit(&self, user: &SessionUser) -> Result<(), ParserError> {
        let decision = self
            .rate_limiter
            .check_limit(&user.user_id)
            .await
            .context("Rate limiter check failed")?;

        if decision.allowed {
            Ok(())
        } else {
            Err(ParserError::RateLimited)
        }
    }

    /// Email first, then the linked record. A failed email insert means the
    /// linked insert is never attempted; a failed linked insert leaves the
    /// email in place.
    async fn persist(
        &self,
        user: &SessionUser,
        input: EmailInput,
        parsed: &ParsedRequirements,
    ) -> Result<(), ParserError> {
        let email = self
            .store
            .create_email(NewEmail {
                subject: input.subject,
                content: input.content,
                user_id: user.user_id.clone(),
            })
            .await
            .context("Failed to persist email")?;

        self.store
            .create_parsed_requirements(NewParsedRequirements {
                email_id: email.id,
                requirements: parsed.clone(),
            })
            .await
            .context("Failed to persist parsed requirements")?;

        Ok(())
    }
}
