//! Aggregate counts for the admin dashboard.

use serde::Serialize;

use super::{count, ContactMessage, DbPool};
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct Fundraising {
    pub total_goal: f64,
    pub total_raised: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub campaigns: CountPair,
    pub sponsors: CountPair,
    pub blog_posts: CountPair,
    pub stories: CountPair,
    pub projects: CountPair,
    pub team_members: i64,
    pub gallery_images: i64,
    pub contact_messages: CountPair,
    pub fundraising: Fundraising,
    pub recent_messages: Vec<ContactMessage>,
}

/// A total plus one named subset, serialized as `{"total": n, "<label>": m}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountPair {
    pub total: i64,
    pub label: &'static str,
    pub subset: i64,
}

impl Serialize for CountPair {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("total", &self.total)?;
        map.serialize_entry(self.label, &self.subset)?;
        map.end()
    }
}

async fn pair(pool: &DbPool, table: &str, label: &'static str, condition: &str) -> Result<CountPair> {
    let total = count(pool, &format!("SELECT COUNT(*) FROM {}", table)).await?;
    let subset = count(
        pool,
        &format!("SELECT COUNT(*) FROM {} WHERE {}", table, condition),
    )
    .await?;
    Ok(CountPair {
        total,
        label,
        subset,
    })
}

/// Collect every dashboard figure.
pub async fn dashboard_stats(pool: &DbPool) -> Result<DashboardStats> {
    let (total_goal, total_raised): (f64, f64) = sqlx::query_as(
        "SELECT COALESCE(SUM(goal_amount), 0.0), COALESCE(SUM(raised_amount), 0.0) FROM campaigns",
    )
    .fetch_one(pool)
    .await?;

    Ok(DashboardStats {
        campaigns: pair(pool, "campaigns", "active", "status = 'active'").await?,
        sponsors: pair(pool, "sponsors", "active", "is_active = 1").await?,
        blog_posts: pair(pool, "blog_posts", "published", "is_published = 1").await?,
        stories: pair(pool, "stories", "featured", "is_featured = 1").await?,
        projects: pair(pool, "projects", "ongoing", "status = 'ongoing'").await?,
        team_members: count(pool, "SELECT COUNT(*) FROM team_members").await?,
        gallery_images: count(pool, "SELECT COUNT(*) FROM gallery_images").await?,
        contact_messages: pair(pool, "contact_messages", "unread", "is_read = 0").await?,
        fundraising: Fundraising {
            total_goal,
            total_raised,
        },
        recent_messages: super::recent_contact_messages(pool, 5).await?,
    })
}
