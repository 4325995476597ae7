//! Contact form message queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;
use crate::validation::{self, Validator, SHORT_TEXT};
use crate::{Error, Result};

const MESSAGE_MAX: usize = 5000;

/// Contact message record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Public contact form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFilter {
    #[serde(default, deserialize_with = "crate::validation::query_flag")]
    pub unread: Option<bool>,
}

impl ContactMessage {
    pub fn from_submission(input: ContactSubmission) -> Result<Self> {
        let now = super::timestamp();
        let mut message = Self {
            id: super::new_id(),
            name: String::new(),
            email: String::new(),
            subject: None,
            message: String::new(),
            is_read: false,
            created_at: now.clone(),
            updated_at: now,
        };
        validation::patch_text(&mut message.name, input.name);
        validation::patch_text(&mut message.email, input.email);
        validation::patch_opt_text(&mut message.subject, input.subject);
        validation::patch_text(&mut message.message, input.message);

        let mut v = Validator::new();
        v.required("name", &message.name)
            .max_chars("name", Some(&message.name), SHORT_TEXT)
            .required("email", &message.email)
            .email("email", Some(&message.email))
            .max_chars("subject", message.subject.as_deref(), SHORT_TEXT)
            .required("message", &message.message)
            .max_chars("message", Some(&message.message), MESSAGE_MAX);
        v.finish()?;

        Ok(message)
    }
}

// ============================================================================
// Contact Message Queries
// ============================================================================

pub async fn insert_contact_message(pool: &DbPool, m: &ContactMessage) -> Result<ContactMessage> {
    sqlx::query_as::<_, ContactMessage>(
        r#"
        INSERT INTO contact_messages (
            id, name, email, subject, message, is_read, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&m.id)
    .bind(&m.name)
    .bind(&m.email)
    .bind(&m.subject)
    .bind(&m.message)
    .bind(m.is_read)
    .bind(&m.created_at)
    .bind(&m.updated_at)
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}

pub async fn get_contact_message(pool: &DbPool, id: &str) -> Result<ContactMessage> {
    sqlx::query_as::<_, ContactMessage>("SELECT * FROM contact_messages WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Contact message {}", id)))
}

pub async fn list_contact_messages(
    pool: &DbPool,
    filter: &ContactFilter,
) -> Result<Vec<ContactMessage>> {
    // unread=true means is_read = 0
    let is_read = filter.unread.map(|unread| !unread);
    sqlx::query_as::<_, ContactMessage>(
        r#"
        SELECT * FROM contact_messages
        WHERE (?1 IS NULL OR is_read = ?1)
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(is_read)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

/// Newest messages, for the dashboard.
pub async fn recent_contact_messages(pool: &DbPool, limit: i64) -> Result<Vec<ContactMessage>> {
    sqlx::query_as::<_, ContactMessage>(
        "SELECT * FROM contact_messages ORDER BY created_at DESC, rowid DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

pub async fn set_contact_message_read(
    pool: &DbPool,
    id: &str,
    is_read: bool,
) -> Result<ContactMessage> {
    sqlx::query_as::<_, ContactMessage>(
        "UPDATE contact_messages SET is_read = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(is_read)
    .bind(super::timestamp())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Contact message {}", id)))
}

pub async fn delete_contact_message(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM contact_messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Contact message {}", id)));
    }

    Ok(())
}
