// src/lib.rs
//! Job posting email parser: a Rocket service that extracts skills, required
//! experience and employment type from job descriptions through an
//! OpenAI-compatible completion API.

pub mod auth;
pub mod cli;
pub mod core;
pub mod error;
pub mod extraction;
pub mod rate_limit;
pub mod types;
pub mod web;

pub use error::ParserError;
pub use types::{EmailInput, ParsedRequirements, ResponseEnvelope};
pub use web::{build_rocket, start_web_server, AppState};

/// Log through `tracing` at the given level: `app_log!(info, "...", args)`.
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}
