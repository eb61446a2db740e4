// src/web/handlers/email_parser_handlers.rs
use rocket::data::Capped;
use rocket::State;

use crate::auth::SessionToken;
use crate::types::RawBody;
use crate::web::types::{ApiResponse, AppState};

/// The body arrives as capped raw bytes so that undecodable or oversized
/// payloads are answered by the pipeline's own validation, after the session
/// and rate-limit checks.
pub async fn parse_email_handler(
    body: Capped<Vec<u8>>,
    token: SessionToken,
    state: &State<AppState>,
) -> ApiResponse {
    let raw = RawBody::new(&body.value, body.is_complete());
    state.parser.handle(token.as_deref(), raw).await
}
