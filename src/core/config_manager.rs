// src/core/config_manager.rs
//! Runtime configuration: optional `config.yaml` overlaid by environment variables

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_OPENAI_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 10;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub openai: OpenAiConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub name: String,
    pub port: u16,
    pub database_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub jwt_secret: Option<String>,
    pub issuer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
}

/// One environment section of `config.yaml`. Secrets are env-only.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileSection {
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub openai_api_url: Option<String>,
    pub openai_model: Option<String>,
    pub openai_timeout_seconds: Option<u64>,
    pub session_jwt_issuer: Option<String>,
    pub rate_limit_max_requests: Option<u32>,
    pub rate_limit_window_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    local: FileSection,
    production: FileSection,
}

impl ConfigManager {
    /// Load configuration from `config.yaml` (if present) and the process environment
    pub fn load() -> Result<Self> {
        let environment = Self::environment_name(|key| std::env::var(key).ok());
        info!("Loading configuration for environment: {}", environment);

        let config_path = std::env::var("JOB_PARSER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.yaml"));
        let file = Self::load_file(&config_path, &environment)?;

        let base_dir = std::env::current_dir().context("Failed to get current directory")?;

        Self::from_sources(&environment, file, |key| std::env::var(key).ok(), &base_dir)
    }

    fn environment_name(env: impl Fn(&str) -> Option<String>) -> String {
        env("JOB_PARSER_ENV")
            .or_else(|| env("ENVIRONMENT"))
            .unwrap_or_else(|| "local".to_string())
    }

    fn load_file(path: &Path, environment: &str) -> Result<FileSection> {
        if !path.exists() {
            info!("No {} found, using environment variables only", path.display());
            return Ok(FileSection::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse_file(&content, environment)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Pick the section for `environment` out of a YAML document
    pub fn parse_file(content: &str, environment: &str) -> Result<FileSection> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    /// Merge a file section with environment variables; variables win
    pub fn from_sources(
        environment: &str,
        file: FileSection,
        env: impl Fn(&str) -> Option<String>,
        base_dir: &Path,
    ) -> Result<Self> {
        let port = match env("ROCKET_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };

        let database_path = env("DATABASE_PATH")
            .map(PathBuf::from)
            .or(file.database_path)
            .unwrap_or_else(|| PathBuf::from("job_parser.db"));
        let database_path = Self::resolve_path(&database_path, base_dir);

        let api_key = env("OPENAI_API_KEY").filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; the email parser will answer with a configuration error");
        }

        let timeout_seconds = match env("OPENAI_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("OPENAI_TIMEOUT_SECS must be a number of seconds")?,
            None => file
                .openai_timeout_seconds
                .unwrap_or(DEFAULT_OPENAI_TIMEOUT_SECS),
        };

        let max_requests = match env("RATE_LIMIT_MAX_REQUESTS") {
            Some(raw) => raw
                .parse::<u32>()
                .context("RATE_LIMIT_MAX_REQUESTS must be a positive integer")?,
            None => file
                .rate_limit_max_requests
                .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS),
        };

        let window_seconds = match env("RATE_LIMIT_WINDOW_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("RATE_LIMIT_WINDOW_SECS must be a number of seconds")?,
            None => file
                .rate_limit_window_seconds
                .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        };

        Ok(Self {
            environment: EnvironmentConfig {
                name: environment.to_string(),
                port,
                database_path,
            },
            openai: OpenAiConfig {
                api_key,
                base_url: env("OPENAI_API_URL")
                    .or(file.openai_api_url)
                    .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
                model: env("OPENAI_MODEL")
                    .or(file.openai_model)
                    .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                timeout_seconds,
            },
            session: SessionConfig {
                jwt_secret: env("SESSION_JWT_SECRET").filter(|s| !s.is_empty()),
                issuer: env("SESSION_JWT_ISSUER").or(file.session_jwt_issuer),
            },
            rate_limit: RateLimitConfig {
                max_requests,
                window_seconds,
            },
        })
    }

    fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Whether the model provider credentials are present
    pub fn model_configured(&self) -> bool {
        self.openai.api_key.is_some()
    }
}

impl SessionConfig {
    pub fn require_secret(&self) -> Result<&str> {
        self.jwt_secret
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("SESSION_JWT_SECRET environment variable not set"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            ConfigManager::from_sources("local", FileSection::default(), env_from(&[]), Path::new("/srv"))
                .unwrap();

        assert_eq!(config.environment.port, 8000);
        assert_eq!(config.environment.database_path, PathBuf::from("/srv/job_parser.db"));
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_seconds, 10);
        assert!(!config.model_configured());
        assert!(config.session.require_secret().is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileSection {
            port: Some(9000),
            openai_model: Some("gpt-4o-mini".to_string()),
            rate_limit_max_requests: Some(3),
            ..FileSection::default()
        };
        let env = env_from(&[
            ("ROCKET_PORT", "8088"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SESSION_JWT_SECRET", "secret"),
            ("DATABASE_PATH", "/var/lib/job_parser.db"),
        ]);

        let config = ConfigManager::from_sources("local", file, env, Path::new("/srv")).unwrap();

        assert_eq!(config.environment.port, 8088);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.environment.database_path, PathBuf::from("/var/lib/job_parser.db"));
        assert!(config.model_configured());
        assert_eq!(config.session.require_secret().unwrap(), "secret");
    }

    #[test]
    fn test_blank_api_key_is_not_configured() {
        let config = ConfigManager::from_sources(
            "local",
            FileSection::default(),
            env_from(&[("OPENAI_API_KEY", "   ")]),
            Path::new("/srv"),
        )
        .unwrap();
        assert!(!config.model_configured());
    }

    #[test]
    fn test_invalid_port() {
        let result = ConfigManager::from_sources(
            "local",
            FileSection::default(),
            env_from(&[("ROCKET_PORT", "not-a-port")]),
            Path::new("/srv"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_file_selects_environment() {
        let yaml = r#"
local:
  port: 8001
production:
  port: 80
  database_path: /data/job_parser.db
  openai_model: gpt-4o
"#;
        let local = ConfigManager::parse_file(yaml, "local").unwrap();
        assert_eq!(local.port, Some(8001));
        assert!(local.database_path.is_none());

        let production = ConfigManager::parse_file(yaml, "production").unwrap();
        assert_eq!(production.port, Some(80));
        assert_eq!(production.database_path, Some(PathBuf::from("/data/job_parser.db")));
    }

    #[test]
    fn test_environment_name() {
        assert_eq!(ConfigManager::environment_name(env_from(&[])), "local");
        assert_eq!(
            ConfigManager::environment_name(env_from(&[("ENVIRONMENT", "production")])),
            "production"
        );
        assert_eq!(
            ConfigManager::environment_name(env_from(&[
                ("ENVIRONMENT", "production"),
                ("JOB_PARSER_ENV", "local"),
            ])),
            "local"
        );
    }
}
