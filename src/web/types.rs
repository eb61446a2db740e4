// src/web/types.rs
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use rocket::Request;

use crate::error::ParserError;
use crate::types::{ParsedRequirements, ResponseEnvelope};
use crate::web::services::EmailParserService;

/// Shared state managed by Rocket
pub struct AppState {
    pub parser: EmailParserService,
}

/// Envelope plus the status it is sent with
#[derive(Debug)]
pub struct ApiResponse {
    pub status: Status,
    pub envelope: ResponseEnvelope,
}

impl ApiResponse {
    pub fn success(data: ParsedRequirements) -> Self {
        Self {
            status: Status::Ok,
            envelope: ResponseEnvelope::success(data),
        }
    }

    pub fn failure(err: &ParserError) -> Self {
        Self {
            status: err.status(),
            envelope: ResponseEnvelope::failure(err.message()),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiResponse {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        (self.status, Json(self.envelope)).respond_to(req)
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
    pub model_configured: bool,
    pub database: &'static str,
}
