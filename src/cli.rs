// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::app_log;
use crate::core::{ConfigManager, Database, OpenAiClient, RequirementsRepository};
use crate::extraction::RequirementsExtractor;
use crate::web::start_web_server;

#[derive(Parser)]
#[command(name = "job-parser")]
#[command(about = "Extract skills, experience and employment type from job posting emails")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server (default)
    Serve,
    /// Run extraction on a local text file and print the result as JSON
    Extract {
        #[arg(long)]
        file: PathBuf,
    },
    /// List stored emails for a user, most recent first
    History {
        #[arg(long)]
        user: String,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

pub async fn run(cli: Cli, config: ConfigManager) -> Result<()> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => start_web_server(config).await,
        Command::Extract { file } => extract_file(&config, &file).await,
        Command::History { user, limit } => print_history(&config, &user, limit).await,
    }
}

async fn extract_file(config: &ConfigManager, file: &PathBuf) -> Result<()> {
    let api_key = config
        .openai
        .api_key
        .clone()
        .context("OpenAI API key not configured")?;

    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let client = OpenAiClient::new(&config.openai, api_key)?;
    let extractor = RequirementsExtractor::new(Arc::new(client));

    app_log!(info, "Extracting requirements from {}", file.display());
    let parsed = extractor.extract(&content).await;

    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

async fn print_history(config: &ConfigManager, user: &str, limit: i64) -> Result<()> {
    let database = Database::new(&config.environment.database_path).await?;
    let repo = RequirementsRepository::new(database.pool().clone());

    let emails = repo.list_emails_for_user(user, limit).await?;
    if emails.is_empty() {
        println!("No emails stored for user {}", user);
        return Ok(());
    }

    for email in emails {
        let parsed = repo.find_parsed_for_email(&email.id).await?;
        match parsed {
            Some(parsed) => println!(
                "{}  {}  [{}] {} years, {}",
                email.created_at.format("%Y-%m-%d %H:%M"),
                email.subject,
                parsed.skills.join(", "),
                parsed.experience_years,
                parsed.employment_type
            ),
            None => println!(
                "{}  {}  (no parsed requirements)",
                email.created_at.format("%Y-%m-%d %H:%M"),
                email.subject
            ),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::parse_from(["job-parser"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_extract_and_history() {
        let cli = Cli::parse_from(["job-parser", "extract", "--file", "posting.txt"]);
        match cli.command {
            Some(Command::Extract { file }) => assert_eq!(file, PathBuf::from("posting.txt")),
            _ => panic!("expected extract command"),
        }

        let cli = Cli::parse_from(["job-parser", "history", "--user", "user-1"]);
        match cli.command {
            Some(Command::History { user, limit }) => {
                assert_eq!(user, "user-1");
                assert_eq!(limit, 20);
            }
            _ => panic!("expected history command"),
        }
    }
}
