//! Beneficiary story queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;
use crate::validation::{self, Validator, SHORT_TEXT, URL_TEXT};
use crate::{Error, Result};

/// Story record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub content: String,
    pub person_name: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub person_name: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryFilter {
    #[serde(default, deserialize_with = "crate::validation::query_flag")]
    pub featured: Option<bool>,
}

impl Story {
    pub fn create(input: StoryInput) -> Result<Self> {
        let now = super::timestamp();
        let mut story = Self {
            id: super::new_id(),
            title: String::new(),
            content: String::new(),
            person_name: None,
            location: None,
            image_url: None,
            is_featured: false,
            created_at: now.clone(),
            updated_at: now,
        };
        story.apply(input);
        story.validate()?;
        Ok(story)
    }

    pub fn update(mut self, input: StoryInput) -> Result<Self> {
        self.apply(input);
        self.updated_at = super::timestamp();
        self.validate()?;
        Ok(self)
    }

    fn apply(&mut self, input: StoryInput) {
        validation::patch_text(&mut self.title, input.title);
        validation::patch_text(&mut self.content, input.content);
        validation::patch_opt_text(&mut self.person_name, input.person_name);
        validation::patch_opt_text(&mut self.location, input.location);
        validation::patch_opt_text(&mut self.image_url, input.image_url);
        validation::patch(&mut self.is_featured, input.is_featured);
    }

    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.required("title", &self.title)
            .max_chars("title", Some(&self.title), SHORT_TEXT)
            .required("content", &self.content)
            .max_chars("person_name", self.person_name.as_deref(), SHORT_TEXT)
            .max_chars("location", self.location.as_deref(), SHORT_TEXT)
            .max_chars("image_url", self.image_url.as_deref(), URL_TEXT);
        v.finish()
    }
}

// ============================================================================
// Story Queries
// ============================================================================

pub async fn insert_story(pool: &DbPool, s: &Story) -> Result<Story> {
    sqlx::query_as::<_, Story>(
        r#"
        INSERT INTO stories (
            id, title, content, person_name, location, image_url,
            is_featured, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&s.id)
    .bind(&s.title)
    .bind(&s.content)
    .bind(&s.person_name)
    .bind(&s.location)
    .bind(&s.image_url)
    .bind(s.is_featured)
    .bind(&s.created_at)
    .bind(&s.updated_at)
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}

pub async fn get_story(pool: &DbPool, id: &str) -> Result<Story> {
    sqlx::query_as::<_, Story>("SELECT * FROM stories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Story {}", id)))
}

pub async fn list_stories(pool: &DbPool, filter: &StoryFilter) -> Result<Vec<Story>> {
    sqlx::query_as::<_, Story>(
        r#"
        SELECT * FROM stories
        WHERE (?1 IS NULL OR is_featured = ?1)
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(filter.featured)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

pub async fn update_story(pool: &DbPool, s: &Story) -> Result<Story> {
    sqlx::query_as::<_, Story>(
        r#"
        UPDATE stories SET
            title = ?, content = ?, person_name = ?, location = ?, image_url = ?,
            is_featured = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&s.title)
    .bind(&s.content)
    .bind(&s.person_name)
    .bind(&s.location)
    .bind(&s.image_url)
    .bind(s.is_featured)
    .bind(&s.updated_at)
    .bind(&s.id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Story {}", s.id)))
}

pub async fn delete_story(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM stories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Story {}", id)));
    }

    Ok(())
}
