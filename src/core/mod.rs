// src/core/mod.rs
//! Core services: configuration, persistence and the model client

pub mod config_manager;
pub mod database;
pub mod openai_client;

pub use config_manager::ConfigManager;
pub use database::{Database, RequirementsRepository, RequirementsStore};
pub use openai_client::{CompletionModel, CompletionOptions, OpenAiClient};
