//! Field project queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;
use crate::validation::{self, Validator, SHORT_TEXT, URL_TEXT};
use crate::{Error, Result};

pub const PROJECT_STATUSES: &[&str] = &["planned", "ongoing", "completed"];

/// Project record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub status: String,
    pub image_url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub beneficiaries: Option<i64>,
    pub budget: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub beneficiaries: Option<i64>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub status: Option<String>,
}

impl Project {
    pub fn create(input: ProjectInput) -> Result<Self> {
        let now = super::timestamp();
        let mut project = Self {
            id: super::new_id(),
            title: String::new(),
            description: String::new(),
            location: None,
            status: "ongoing".to_string(),
            image_url: None,
            start_date: None,
            end_date: None,
            beneficiaries: None,
            budget: None,
            created_at: now.clone(),
            updated_at: now,
        };
        project.apply(input);
        project.validate()?;
        Ok(project)
    }

    pub fn update(mut self, input: ProjectInput) -> Result<Self> {
        self.apply(input);
        self.updated_at = super::timestamp();
        self.validate()?;
        Ok(self)
    }

    fn apply(&mut self, input: ProjectInput) {
        validation::patch_text(&mut self.title, input.title);
        validation::patch_text(&mut self.description, input.description);
        validation::patch_opt_text(&mut self.location, input.location);
        validation::patch_text(&mut self.status, input.status);
        validation::patch_opt_text(&mut self.image_url, input.image_url);
        validation::patch_opt_text(&mut self.start_date, input.start_date);
        validation::patch_opt_text(&mut self.end_date, input.end_date);
        validation::patch_opt(&mut self.beneficiaries, input.beneficiaries);
        validation::patch_opt(&mut self.budget, input.budget);
    }

    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.required("title", &self.title)
            .max_chars("title", Some(&self.title), SHORT_TEXT)
            .required("description", &self.description)
            .max_chars("location", self.location.as_deref(), SHORT_TEXT)
            .one_of("status", &self.status, PROJECT_STATUSES)
            .max_chars("image_url", self.image_url.as_deref(), URL_TEXT)
            .date("start_date", self.start_date.as_deref())
            .date("end_date", self.end_date.as_deref())
            .date_order(
                "start_date",
                self.start_date.as_deref(),
                "end_date",
                self.end_date.as_deref(),
            )
            .min_i64("beneficiaries", self.beneficiaries, 0)
            .min_f64("budget", self.budget, 0.0);
        v.finish()
    }
}

// ============================================================================
// Project Queries
// ============================================================================

pub async fn insert_project(pool: &DbPool, p: &Project) -> Result<Project> {
    sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (
            id, title, description, location, status, image_url,
            start_date, end_date, beneficiaries, budget, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&p.id)
    .bind(&p.title)
    .bind(&p.description)
    .bind(&p.location)
    .bind(&p.status)
    .bind(&p.image_url)
    .bind(&p.start_date)
    .bind(&p.end_date)
    .bind(p.beneficiaries)
    .bind(p.budget)
    .bind(&p.created_at)
    .bind(&p.updated_at)
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}

pub async fn get_project(pool: &DbPool, id: &str) -> Result<Project> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Project {}", id)))
}

pub async fn list_projects(pool: &DbPool, filter: &ProjectFilter) -> Result<Vec<Project>> {
    sqlx::query_as::<_, Project>(
        r#"
        SELECT * FROM projects
        WHERE (?1 IS NULL OR status = ?1)
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(&filter.status)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

pub async fn update_project(pool: &DbPool, p: &Project) -> Result<Project> {
    sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects SET
            title = ?, description = ?, location = ?, status = ?, image_url = ?,
            start_date = ?, end_date = ?, beneficiaries = ?, budget = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&p.title)
    .bind(&p.description)
    .bind(&p.location)
    .bind(&p.status)
    .bind(&p.image_url)
    .bind(&p.start_date)
    .bind(&p.end_date)
    .bind(p.beneficiaries)
    .bind(p.budget)
    .bind(&p.updated_at)
    .bind(&p.id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Project {}", p.id)))
}

pub async fn delete_project(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Project {}", id)));
    }

    Ok(())
}
