// src/web/mod.rs

pub mod handlers;
pub mod services;
pub mod types;

pub use handlers::*;
pub use services::EmailParserService;
pub use types::*;

use crate::auth::{JwtSessionProvider, SessionToken};
use crate::core::{ConfigManager, Database, OpenAiClient, RequirementsRepository};
use crate::extraction::RequirementsExtractor;
use crate::rate_limit::SlidingWindowLimiter;
use crate::types::ResponseEnvelope;
use anyhow::Result;
use rocket::data::{Capped, Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::{error, info, warn};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[post("/email-parser", data = "<body>")]
pub async fn parse_email(
    body: Capped<Vec<u8>>,
    token: SessionToken,
    state: &State<AppState>,
) -> ApiResponse {
    handlers::parse_email_handler(body, token, state).await
}

#[get("/health")]
pub async fn health(state: &State<AppState>) -> Json<HealthResponse> {
    handlers::health_handler(state).await
}

#[get("/job-parser")]
pub fn job_parser_page() -> RawHtml<&'static str> {
    handlers::job_parser_page_handler()
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ResponseEnvelope> {
    Json(ResponseEnvelope::failure(format!(
        "Invalid input: {}",
        crate::types::email::EXPECTED_OBJECT
    )))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<ResponseEnvelope> {
    Json(ResponseEnvelope::failure("Unauthorized"))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ResponseEnvelope> {
    Json(ResponseEnvelope::failure("Not found"))
}

#[rocket::catch(429)]
pub fn too_many_requests() -> Json<ResponseEnvelope> {
    Json(ResponseEnvelope::failure("Too many requests"))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ResponseEnvelope> {
    Json(ResponseEnvelope::failure("Internal server error"))
}

/// Bodies past the `bytes` limit reach the pipeline truncated and are
/// rejected there as invalid input.
fn body_limits() -> Limits {
    Limits::default().limit("bytes", 1.mebibytes())
}

fn mount(rocket: Rocket<Build>, state: AppState) -> Rocket<Build> {
    rocket
        .attach(Cors)
        .manage(state)
        .register(
            "/api",
            catchers![
                bad_request,
                unauthorized,
                not_found,
                too_many_requests,
                internal_error
            ],
        )
        .mount("/api", routes![parse_email, health, options])
        .mount("/", routes![job_parser_page])
}

/// Rocket instance with default configuration, used by tests
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    let figment = rocket::Config::figment().merge(("limits", body_limits()));
    mount(rocket::custom(figment), state)
}

/// Wire the production collaborators from configuration
pub async fn build_state(config: &ConfigManager) -> Result<AppState> {
    let database = Database::new(&config.environment.database_path).await?;
    let store = Arc::new(RequirementsRepository::new(database.pool().clone()));

    let sessions = Arc::new(JwtSessionProvider::from_config(&config.session)?);
    let rate_limiter = Arc::new(SlidingWindowLimiter::from_config(&config.rate_limit));

    let extractor = match &config.openai.api_key {
        Some(api_key) => {
            let client = OpenAiClient::new(&config.openai, api_key.clone())?;
            Some(RequirementsExtractor::new(Arc::new(client)))
        }
        None => {
            warn!("Model provider not configured; /api/email-parser will return 500 until OPENAI_API_KEY is set");
            None
        }
    };

    Ok(AppState {
        parser: EmailParserService::new(sessions, rate_limiter, extractor, store),
    })
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    let state = build_state(&config).await?;

    info!("Starting job parser API server");
    info!("Environment: {}", config.environment.name);
    info!("Database: {}", config.environment.database_path.display());
    info!("Model: {} via {}", config.openai.model, config.openai.base_url);
    info!("Server: http://0.0.0.0:{}", config.environment.port);

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.environment.port))
        .merge(("limits", body_limits()));

    if let Err(e) = mount(rocket::custom(figment), state).launch().await {
        error!("Server stopped with error: {}", e);
        anyhow::bail!("Rocket server failed to launch");
    }

    Ok(())
}
