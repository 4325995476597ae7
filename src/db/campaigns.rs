//! Fundraising campaign queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;
use crate::validation::{self, Validator, SHORT_TEXT, URL_TEXT};
use crate::{Error, Result};

pub const CAMPAIGN_STATUSES: &[&str] = &["draft", "active", "completed"];

/// Campaign record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub title: String,
    pub description: String,
    pub goal_amount: f64,
    pub raised_amount: f64,
    pub status: String,
    pub image_url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted by create and update requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Option<f64>,
    pub raised_amount: Option<f64>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// List filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignFilter {
    pub status: Option<String>,
}

impl Campaign {
    /// Build a new campaign from create input. The goal is required, so a
    /// missing amount is tracked separately for validation.
    pub fn create(input: CampaignInput) -> Result<Self> {
        let now = super::timestamp();
        let goal_missing = input.goal_amount.is_none();
        let mut campaign = Self {
            id: super::new_id(),
            title: String::new(),
            description: String::new(),
            goal_amount: 0.0,
            raised_amount: 0.0,
            status: "active".to_string(),
            image_url: None,
            start_date: None,
            end_date: None,
            created_at: now.clone(),
            updated_at: now,
        };
        campaign.apply(input);

        let mut v = campaign.validator();
        if goal_missing {
            v.push("goal_amount", "The goal amount field is required.");
        }
        v.finish()?;
        Ok(campaign)
    }

    /// Merge update input onto the stored record and revalidate.
    pub fn update(mut self, input: CampaignInput) -> Result<Self> {
        self.apply(input);
        self.updated_at = super::timestamp();
        self.validator().finish()?;
        Ok(self)
    }

    fn apply(&mut self, input: CampaignInput) {
        validation::patch_text(&mut self.title, input.title);
        validation::patch_text(&mut self.description, input.description);
        validation::patch(&mut self.goal_amount, input.goal_amount);
        validation::patch(&mut self.raised_amount, input.raised_amount);
        validation::patch_text(&mut self.status, input.status);
        validation::patch_opt_text(&mut self.image_url, input.image_url);
        validation::patch_opt_text(&mut self.start_date, input.start_date);
        validation::patch_opt_text(&mut self.end_date, input.end_date);
    }

    fn validator(&self) -> Validator {
        let mut v = Validator::new();
        v.required("title", &self.title)
            .max_chars("title", Some(&self.title), SHORT_TEXT)
            .required("description", &self.description)
            .min_f64("goal_amount", Some(self.goal_amount), 0.0)
            .min_f64("raised_amount", Some(self.raised_amount), 0.0)
            .one_of("status", &self.status, CAMPAIGN_STATUSES)
            .max_chars("image_url", self.image_url.as_deref(), URL_TEXT)
            .date("start_date", self.start_date.as_deref())
            .date("end_date", self.end_date.as_deref())
            .date_order(
                "start_date",
                self.start_date.as_deref(),
                "end_date",
                self.end_date.as_deref(),
            );
        v
    }
}

// ============================================================================
// Campaign Queries
// ============================================================================

pub async fn insert_campaign(pool: &DbPool, c: &Campaign) -> Result<Campaign> {
    sqlx::query_as::<_, Campaign>(
        r#"
        INSERT INTO campaigns (
            id, title, description, goal_amount, raised_amount, status,
            image_url, start_date, end_date, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&c.id)
    .bind(&c.title)
    .bind(&c.description)
    .bind(c.goal_amount)
    .bind(c.raised_amount)
    .bind(&c.status)
    .bind(&c.image_url)
    .bind(&c.start_date)
    .bind(&c.end_date)
    .bind(&c.created_at)
    .bind(&c.updated_at)
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}

pub async fn get_campaign(pool: &DbPool, id: &str) -> Result<Campaign> {
    sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Campaign {}", id)))
}

/// List campaigns, newest first.
pub async fn list_campaigns(pool: &DbPool, filter: &CampaignFilter) -> Result<Vec<Campaign>> {
    sqlx::query_as::<_, Campaign>(
        r#"
        SELECT * FROM campaigns
        WHERE (?1 IS NULL OR status = ?1)
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(&filter.status)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

pub async fn update_campaign(pool: &DbPool, c: &Campaign) -> Result<Campaign> {
    sqlx::query_as::<_, Campaign>(
        r#"
        UPDATE campaigns SET
            title = ?, description = ?, goal_amount = ?, raised_amount = ?,
            status = ?, image_url = ?, start_date = ?, end_date = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&c.title)
    .bind(&c.description)
    .bind(c.goal_amount)
    .bind(c.raised_amount)
    .bind(&c.status)
    .bind(&c.image_url)
    .bind(&c.start_date)
    .bind(&c.end_date)
    .bind(&c.updated_at)
    .bind(&c.id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Campaign {}", c.id)))
}

pub async fn delete_campaign(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM campaigns WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Campaign {}", id)));
    }

    Ok(())
}
