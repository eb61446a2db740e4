// src/core/database.rs
//! SQLite persistence for parsed emails and their extracted requirements

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use uuid::Uuid;

use crate::app_log;
use crate::types::ParsedRequirements;

// ===== Connection Management =====

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        app_log!(
            info,
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database, kept alive on a single connection
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS emails (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                subject TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_requirements_parsed (
                id TEXT PRIMARY KEY,
                email_id TEXT NOT NULL UNIQUE REFERENCES emails(id),
                skills TEXT NOT NULL,
                experience_years INTEGER NOT NULL,
                employment_type TEXT NOT NULL,
                raw_content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_emails_user_id ON emails(user_id);")
            .execute(&self.pool)
            .await?;

        app_log!(info, "Database migrations completed");
        Ok(())
    }
}

async fn health_check(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("Database health check failed")?;
    Ok(())
}

// ===== Models =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmailRecord {
    pub id: String,
    pub user_id: String,
    pub subject: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedRequirementsRecord {
    pub id: String,
    pub email_id: String,
    pub skills: Vec<String>,
    pub experience_years: u32,
    pub employment_type: String,
    pub raw_content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ParsedRequirementsRow {
    id: String,
    email_id: String,
    skills: String,
    experience_years: i64,
    employment_type: String,
    raw_content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ParsedRequirementsRow> for ParsedRequirementsRecord {
    type Error = anyhow::Error;

    fn try_from(row: ParsedRequirementsRow) -> Result<Self> {
        let skills: Vec<String> = serde_json::from_str(&row.skills)
            .with_context(|| format!("Corrupt skills column for record {}", row.id))?;

        Ok(Self {
            id: row.id,
            email_id: row.email_id,
            skills,
            experience_years: u32::try_from(row.experience_years).unwrap_or(0),
            employment_type: row.employment_type,
            raw_content: row.raw_content,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewEmail {
    pub subject: String,
    pub content: String,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct NewParsedRequirements {
    pub email_id: String,
    pub requirements: ParsedRequirements,
}

// ===== Store Abstraction =====

/// Create operations the parser pipeline needs from persistence.
#[rocket::async_trait]
pub trait RequirementsStore: Send + Sync {
    async fn create_email(&self, email: NewEmail) -> Result<EmailRecord>;

    async fn create_parsed_requirements(
        &self,
        parsed: NewParsedRequirements,
    ) -> Result<ParsedRequirementsRecord>;

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

pub struct RequirementsRepository {
    pool: SqlitePool,
}

impl RequirementsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_email(&self, id: &str) -> Result<Option<EmailRecord>> {
        let email = sqlx::query_as::<_, EmailRecord>(
            r#"
            SELECT id, user_id, subject, content, created_at
            FROM emails
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(email)
    }

    pub async fn find_parsed_for_email(
        &self,
        email_id: &str,
    ) -> Result<Option<ParsedRequirementsRecord>> {
        let row = sqlx::query_as::<_, ParsedRequirementsRow>(
            r#"
            SELECT id, email_id, skills, experience_years, employment_type, raw_content, created_at
            FROM job_requirements_parsed
            WHERE email_id = ?
            "#,
        )
        .bind(email_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ParsedRequirementsRecord::try_from).transpose()
    }

    /// Most recent emails first
    pub async fn list_emails_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<EmailRecord>> {
        let emails = sqlx::query_as::<_, EmailRecord>(
            r#"
            SELECT id, user_id, subject, content, created_at
            FROM emails
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(emails)
    }
}

#[rocket::async_trait]
impl RequirementsStore for RequirementsRepository {
    async fn create_email(&self, email: NewEmail) -> Result<EmailRecord> {
        let record = EmailRecord {
            id: Uuid::new_v4().to_string(),
            user_id: email.user_id,
            subject: email.subject,
            content: email.content,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO emails (id, user_id, subject, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.subject)
        .bind(&record.content)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert email")?;

        app_log!(info, "Stored email {} for user {}", record.id, record.user_id);
        Ok(record)
    }

    async fn create_parsed_requirements(
        &self,
        parsed: NewParsedRequirements,
    ) -> Result<ParsedRequirementsRecord> {
        let requirements = parsed.requirements;
        let record = ParsedRequirementsRecord {
            id: Uuid::new_v4().to_string(),
            email_id: parsed.email_id,
            skills: requirements.skills,
            experience_years: requirements.experience_years,
            employment_type: requirements.employment_type,
            raw_content: requirements.raw_content,
            created_at: Utc::now(),
        };

        let skills_json =
            serde_json::to_string(&record.skills).context("Failed to serialize skills")?;

        sqlx::query(
            r#"
            INSERT INTO job_requirements_parsed
                (id, email_id, skills, experience_years, employment_type, raw_content, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.email_id)
        .bind(skills_json)
        .bind(i64::from(record.experience_years))
        .bind(&record.employment_type)
        .bind(&record.raw_content)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert parsed requirements")?;

        app_log!(
            info,
            "Stored parsed requirements {} for email {}",
            record.id,
            record.email_id
        );
        Ok(record)
    }

    async fn health_check(&self) -> Result<()> {
        health_check(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_requirements(content: &str) -> ParsedRequirements {
        ParsedRequirements {
            skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            experience_years: 3,
            employment_type: "full-time".to_string(),
            raw_content: content.to_string(),
        }
    }

    async fn repository() -> RequirementsRepository {
        let db = Database::in_memory().await.unwrap();
        RequirementsRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_create_and_read_linked_records() {
        let repo = repository().await;

        let email = repo
            .create_email(NewEmail {
                subject: "Rust developer".to_string(),
                content: "Rust and PostgreSQL, 3 years".to_string(),
                user_id: "user-1".to_string(),
            })
            .await
            .unwrap();

        let parsed = repo
            .create_parsed_requirements(NewParsedRequirements {
                email_id: email.id.clone(),
                requirements: sample_requirements(&email.content),
            })
            .await
            .unwrap();

        let stored_email = repo.find_email(&email.id).await.unwrap().unwrap();
        assert_eq!(stored_email.subject, "Rust developer");
        assert_eq!(stored_email.user_id, "user-1");

        let stored = repo.find_parsed_for_email(&email.id).await.unwrap().unwrap();
        assert_eq!(stored.id, parsed.id);
        assert_eq!(stored.skills, vec!["Rust", "PostgreSQL"]);
        assert_eq!(stored.experience_years, 3);
        assert_eq!(stored.employment_type, "full-time");
        assert_eq!(stored.raw_content, "Rust and PostgreSQL, 3 years");
    }

    #[tokio::test]
    async fn test_parsed_record_requires_existing_email() {
        let repo = repository().await;

        let result = repo
            .create_parsed_requirements(NewParsedRequirements {
                email_id: "missing-email".to_string(),
                requirements: sample_requirements("orphan"),
            })
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_emails_for_user() {
        let repo = repository().await;

        for (user, subject) in [("alice", "First"), ("bob", "Other"), ("alice", "Second")] {
            repo.create_email(NewEmail {
                subject: subject.to_string(),
                content: "text".to_string(),
                user_id: user.to_string(),
            })
            .await
            .unwrap();
        }

        let emails = repo.list_emails_for_user("alice", 10).await.unwrap();
        assert_eq!(emails.len(), 2);
        assert!(emails.iter().all(|e| e.user_id == "alice"));

        assert!(repo.list_emails_for_user("carol", 10).await.unwrap().is_empty());
        assert!(repo.health_check().await.is_ok());
    }
}
