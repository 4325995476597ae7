//! Team member queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;
use crate::validation::{self, Validator, SHORT_TEXT, URL_TEXT};
use crate::{Error, Result};

/// Team member record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub position: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub display_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamMemberInput {
    pub name: Option<String>,
    pub position: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub display_order: Option<i64>,
}

impl TeamMember {
    pub fn create(input: TeamMemberInput) -> Result<Self> {
        let now = super::timestamp();
        let mut member = Self {
            id: super::new_id(),
            name: String::new(),
            position: String::new(),
            bio: None,
            photo_url: None,
            email: None,
            linkedin_url: None,
            display_order: 0,
            created_at: now.clone(),
            updated_at: now,
        };
        member.apply(input);
        member.validate()?;
        Ok(member)
    }

    pub fn update(mut self, input: TeamMemberInput) -> Result<Self> {
        self.apply(input);
        self.updated_at = super::timestamp();
        self.validate()?;
        Ok(self)
    }

    fn apply(&mut self, input: TeamMemberInput) {
        validation::patch_text(&mut self.name, input.name);
        validation::patch_text(&mut self.position, input.position);
        validation::patch_opt_text(&mut self.bio, input.bio);
        validation::patch_opt_text(&mut self.photo_url, input.photo_url);
        validation::patch_opt_text(&mut self.email, input.email);
        validation::patch_opt_text(&mut self.linkedin_url, input.linkedin_url);
        validation::patch(&mut self.display_order, input.display_order);
    }

    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.required("name", &self.name)
            .max_chars("name", Some(&self.name), SHORT_TEXT)
            .required("position", &self.position)
            .max_chars("position", Some(&self.position), SHORT_TEXT)
            .max_chars("photo_url", self.photo_url.as_deref(), URL_TEXT)
            .email("email", self.email.as_deref())
            .url("linkedin_url", self.linkedin_url.as_deref())
            .min_i64("display_order", Some(self.display_order), 0);
        v.finish()
    }
}

// ============================================================================
// Team Member Queries
// ============================================================================

pub async fn insert_team_member(pool: &DbPool, m: &TeamMember) -> Result<TeamMember> {
    sqlx::query_as::<_, TeamMember>(
        r#"
        INSERT INTO team_members (
            id, name, position, bio, photo_url, email, linkedin_url,
            display_order, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&m.id)
    .bind(&m.name)
    .bind(&m.position)
    .bind(&m.bio)
    .bind(&m.photo_url)
    .bind(&m.email)
    .bind(&m.linkedin_url)
    .bind(m.display_order)
    .bind(&m.created_at)
    .bind(&m.updated_at)
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}

pub async fn get_team_member(pool: &DbPool, id: &str) -> Result<TeamMember> {
    sqlx::query_as::<_, TeamMember>("SELECT * FROM team_members WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Team member {}", id)))
}

/// List the team in display order.
pub async fn list_team_members(pool: &DbPool) -> Result<Vec<TeamMember>> {
    sqlx::query_as::<_, TeamMember>(
        "SELECT * FROM team_members ORDER BY display_order ASC, name ASC",
    )
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

pub async fn update_team_member(pool: &DbPool, m: &TeamMember) -> Result<TeamMember> {
    sqlx::query_as::<_, TeamMember>(
        r#"
        UPDATE team_members SET
            name = ?, position = ?, bio = ?, photo_url = ?, email = ?,
            linkedin_url = ?, display_order = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&m.name)
    .bind(&m.position)
    .bind(&m.bio)
    .bind(&m.photo_url)
    .bind(&m.email)
    .bind(&m.linkedin_url)
    .bind(m.display_order)
    .bind(&m.updated_at)
    .bind(&m.id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Team member {}", m.id)))
}

pub async fn delete_team_member(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM team_members WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Team member {}", id)));
    }

    Ok(())
}
