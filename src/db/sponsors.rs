//! Sponsor queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;
use crate::validation::{self, Validator, SHORT_TEXT, URL_TEXT};
use crate::{Error, Result};

pub const SPONSOR_TIERS: &[&str] = &["platinum", "gold", "silver", "bronze", "partner"];

/// Sponsor record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub tier: String,
    pub is_active: bool,
    pub display_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SponsorInput {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub tier: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SponsorFilter {
    #[serde(default, deserialize_with = "crate::validation::query_flag")]
    pub active: Option<bool>,
    pub tier: Option<String>,
}

impl Sponsor {
    pub fn create(input: SponsorInput) -> Result<Self> {
        let now = super::timestamp();
        let mut sponsor = Self {
            id: super::new_id(),
            name: String::new(),
            logo_url: None,
            website_url: None,
            description: None,
            tier: "partner".to_string(),
            is_active: true,
            display_order: 0,
            created_at: now.clone(),
            updated_at: now,
        };
        sponsor.apply(input);
        sponsor.validate()?;
        Ok(sponsor)
    }

    pub fn update(mut self, input: SponsorInput) -> Result<Self> {
        self.apply(input);
        self.updated_at = super::timestamp();
        self.validate()?;
        Ok(self)
    }

    fn apply(&mut self, input: SponsorInput) {
        validation::patch_text(&mut self.name, input.name);
        validation::patch_opt_text(&mut self.logo_url, input.logo_url);
        validation::patch_opt_text(&mut self.website_url, input.website_url);
        validation::patch_opt_text(&mut self.description, input.description);
        validation::patch_text(&mut self.tier, input.tier);
        validation::patch(&mut self.is_active, input.is_active);
        validation::patch(&mut self.display_order, input.display_order);
    }

    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.required("name", &self.name)
            .max_chars("name", Some(&self.name), SHORT_TEXT)
            .max_chars("logo_url", self.logo_url.as_deref(), URL_TEXT)
            .max_chars("website_url", self.website_url.as_deref(), URL_TEXT)
            .url("website_url", self.website_url.as_deref())
            .one_of("tier", &self.tier, SPONSOR_TIERS)
            .min_i64("display_order", Some(self.display_order), 0);
        v.finish()
    }
}

// ============================================================================
// Sponsor Queries
// ============================================================================

pub async fn insert_sponsor(pool: &DbPool, s: &Sponsor) -> Result<Sponsor> {
    sqlx::query_as::<_, Sponsor>(
        r#"
        INSERT INTO sponsors (
            id, name, logo_url, website_url, description, tier,
            is_active, display_order, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&s.id)
    .bind(&s.name)
    .bind(&s.logo_url)
    .bind(&s.website_url)
    .bind(&s.description)
    .bind(&s.tier)
    .bind(s.is_active)
    .bind(s.display_order)
    .bind(&s.created_at)
    .bind(&s.updated_at)
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}

pub async fn get_sponsor(pool: &DbPool, id: &str) -> Result<Sponsor> {
    sqlx::query_as::<_, Sponsor>("SELECT * FROM sponsors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Sponsor {}", id)))
}

/// List sponsors in display order.
pub async fn list_sponsors(pool: &DbPool, filter: &SponsorFilter) -> Result<Vec<Sponsor>> {
    sqlx::query_as::<_, Sponsor>(
        r#"
        SELECT * FROM sponsors
        WHERE (?1 IS NULL OR is_active = ?1)
          AND (?2 IS NULL OR tier = ?2)
        ORDER BY display_order ASC, name ASC
        "#,
    )
    .bind(filter.active)
    .bind(&filter.tier)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

pub async fn update_sponsor(pool: &DbPool, s: &Sponsor) -> Result<Sponsor> {
    sqlx::query_as::<_, Sponsor>(
        r#"
        UPDATE sponsors SET
            name = ?, logo_url = ?, website_url = ?, description = ?, tier = ?,
            is_active = ?, display_order = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&s.name)
    .bind(&s.logo_url)
    .bind(&s.website_url)
    .bind(&s.description)
    .bind(&s.tier)
    .bind(s.is_active)
    .bind(s.display_order)
    .bind(&s.updated_at)
    .bind(&s.id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Sponsor {}", s.id)))
}

pub async fn delete_sponsor(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM sponsors WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Sponsor {}", id)));
    }

    Ok(())
}
