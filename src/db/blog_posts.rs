//! Blog post queries.
//!
//! Posts are addressed by id or slug. Slugs are derived from the title when
//! not given and made unique with a numeric suffix.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;
use crate::validation::{self, Validator, SHORT_TEXT, URL_TEXT};
use crate::{Error, Result};

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is valid"));

const EXCERPT_MAX: usize = 500;

/// Blog post record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub cover_image: Option<String>,
    pub is_published: bool,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPostInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub cover_image: Option<String>,
    pub is_published: Option<bool>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPostFilter {
    #[serde(default, deserialize_with = "crate::validation::query_flag")]
    pub published: Option<bool>,
}

impl BlogPost {
    /// Build a new post. The slug is provisional until [`assign_slug`] runs.
    pub fn create(input: BlogPostInput) -> Result<Self> {
        let now = super::timestamp();
        let mut post = Self {
            id: super::new_id(),
            title: String::new(),
            slug: String::new(),
            excerpt: None,
            content: String::new(),
            author: None,
            cover_image: None,
            is_published: false,
            published_at: None,
            created_at: now.clone(),
            updated_at: now,
        };
        post.apply(input);
        post.validate()?;
        Ok(post)
    }

    pub fn update(mut self, input: BlogPostInput) -> Result<Self> {
        self.apply(input);
        self.updated_at = super::timestamp();
        self.validate()?;
        Ok(self)
    }

    fn apply(&mut self, input: BlogPostInput) {
        validation::patch_text(&mut self.title, input.title);
        validation::patch_text(&mut self.slug, input.slug);
        validation::patch_opt_text(&mut self.excerpt, input.excerpt);
        validation::patch_text(&mut self.content, input.content);
        validation::patch_opt_text(&mut self.author, input.author);
        validation::patch_opt_text(&mut self.cover_image, input.cover_image);
        validation::patch(&mut self.is_published, input.is_published);
        validation::patch_opt_text(&mut self.published_at, input.published_at);

        if self.is_published && self.published_at.is_none() {
            self.published_at = Some(super::timestamp());
        }
    }

    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.required("title", &self.title)
            .max_chars("title", Some(&self.title), SHORT_TEXT)
            .required("content", &self.content)
            .max_chars("excerpt", self.excerpt.as_deref(), EXCERPT_MAX)
            .max_chars("author", self.author.as_deref(), SHORT_TEXT)
            .max_chars("cover_image", self.cover_image.as_deref(), URL_TEXT);

        if !self.slug.is_empty() && !SLUG_RE.is_match(&self.slug) {
            v.push(
                "slug",
                "The slug may only contain lowercase letters, numbers, and single dashes.",
            );
        }
        if let Some(published_at) = self.published_at.as_deref() {
            let valid = DateTime::parse_from_rfc3339(published_at).is_ok()
                || NaiveDate::parse_from_str(published_at, "%Y-%m-%d").is_ok();
            if !valid {
                v.push("published_at", "The published at is not a valid date.");
            }
        }
        v.finish()
    }
}

/// Turn a title into a URL slug: lowercase ASCII alphanumerics joined by
/// single dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

// ============================================================================
// Blog Post Queries
// ============================================================================

async fn slug_taken(pool: &DbPool, slug: &str, except_id: &str) -> Result<bool> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT id FROM blog_posts WHERE slug = ? AND id != ?")
            .bind(slug)
            .bind(except_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

/// Settle the post's slug before it is stored.
///
/// An explicitly requested slug must be free; a derived one gets `-2`, `-3`,
/// ... appended until it is.
pub async fn assign_slug(pool: &DbPool, post: &mut BlogPost, explicit: bool) -> Result<()> {
    if explicit && !post.slug.is_empty() {
        if slug_taken(pool, &post.slug, &post.id).await? {
            return Err(Error::field("slug", "The slug has already been taken."));
        }
        return Ok(());
    }

    let base = slugify(&post.title);
    let mut candidate = base.clone();
    let mut counter = 2;
    while slug_taken(pool, &candidate, &post.id).await? {
        candidate = format!("{}-{}", base, counter);
        counter += 1;
    }
    post.slug = candidate;
    Ok(())
}

pub async fn insert_blog_post(pool: &DbPool, p: &BlogPost) -> Result<BlogPost> {
    sqlx::query_as::<_, BlogPost>(
        r#"
        INSERT INTO blog_posts (
            id, title, slug, excerpt, content, author, cover_image,
            is_published, published_at, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&p.id)
    .bind(&p.title)
    .bind(&p.slug)
    .bind(&p.excerpt)
    .bind(&p.content)
    .bind(&p.author)
    .bind(&p.cover_image)
    .bind(p.is_published)
    .bind(&p.published_at)
    .bind(&p.created_at)
    .bind(&p.updated_at)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            Error::field("slug", "The slug has already been taken.")
        }
        _ => Error::Database(e),
    })
}

/// Look a post up by id, falling back to slug. An id match wins over a
/// post whose slug happens to equal another post's id.
pub async fn get_blog_post(pool: &DbPool, key: &str) -> Result<BlogPost> {
    sqlx::query_as::<_, BlogPost>(
        "SELECT * FROM blog_posts WHERE id = ?1 OR slug = ?1 ORDER BY (id = ?1) DESC LIMIT 1",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Blog post {}", key)))
}

/// List posts, most recently published first, then newest.
pub async fn list_blog_posts(pool: &DbPool, filter: &BlogPostFilter) -> Result<Vec<BlogPost>> {
    sqlx::query_as::<_, BlogPost>(
        r#"
        SELECT * FROM blog_posts
        WHERE (?1 IS NULL OR is_published = ?1)
        ORDER BY COALESCE(published_at, created_at) DESC, rowid DESC
        "#,
    )
    .bind(filter.published)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

pub async fn update_blog_post(pool: &DbPool, p: &BlogPost) -> Result<BlogPost> {
    sqlx::query_as::<_, BlogPost>(
        r#"
        UPDATE blog_posts SET
            title = ?, slug = ?, excerpt = ?, content = ?, author = ?, cover_image = ?,
            is_published = ?, published_at = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&p.title)
    .bind(&p.slug)
    .bind(&p.excerpt)
    .bind(&p.content)
    .bind(&p.author)
    .bind(&p.cover_image)
    .bind(p.is_published)
    .bind(&p.published_at)
    .bind(&p.updated_at)
    .bind(&p.id)
    .fetch_optional(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            Error::field("slug", "The slug has already been taken.")
        }
        _ => Error::Database(e),
    })?
    .ok_or_else(|| Error::NotFound(format!("Blog post {}", p.id)))
}

pub async fn delete_blog_post(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Blog post {}", id)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft(title: &str) -> BlogPost {
        BlogPost::create(BlogPostInput {
            title: Some(title.into()),
            content: Some("Body".into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case("Hello World", "hello-world")]
    #[case("  Spring   Gala 2024!  ", "spring-gala-2024")]
    #[case("Café & Friends", "caf-friends")]
    #[case("---", "post")]
    fn test_slugify(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(slugify(title), expected);
    }

    #[test]
    fn test_publishing_sets_published_at() {
        let post = draft("News");
        assert!(post.published_at.is_none());

        let published = post
            .update(BlogPostInput {
                is_published: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert!(published.published_at.is_some());
    }

    #[test]
    fn test_rejects_malformed_slug() {
        let err = BlogPost::create(BlogPostInput {
            title: Some("News".into()),
            content: Some("Body".into()),
            slug: Some("Not A Slug".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref f) if f.contains_key("slug")));
    }

    #[tokio::test]
    async fn test_derived_slugs_are_unique() {
        let pool = super::super::test_pool().await;

        let mut first = draft("Annual Report");
        assign_slug(&pool, &mut first, false).await.unwrap();
        insert_blog_post(&pool, &first).await.unwrap();

        let mut second = draft("Annual Report");
        assign_slug(&pool, &mut second, false).await.unwrap();
        insert_blog_post(&pool, &second).await.unwrap();

        assert_eq!(first.slug, "annual-report");
        assert_eq!(second.slug, "annual-report-2");

        let by_slug = get_blog_post(&pool, "annual-report-2").await.unwrap();
        assert_eq!(by_slug.id, second.id);
    }

    #[tokio::test]
    async fn test_explicit_slug_collision_is_validation_error() {
        let pool = super::super::test_pool().await;

        let mut first = draft("One");
        assign_slug(&pool, &mut first, false).await.unwrap();
        insert_blog_post(&pool, &first).await.unwrap();

        let mut second = draft("Two");
        second.slug = "one".into();
        let err = assign_slug(&pool, &mut second, true).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_id_match_wins_over_slug_match() {
        let pool = super::super::test_pool().await;

        let mut first = draft("First");
        assign_slug(&pool, &mut first, false).await.unwrap();
        insert_blog_post(&pool, &first).await.unwrap();

        let mut second = draft("Second");
        second.slug = first.id.clone();
        assign_slug(&pool, &mut second, true).await.unwrap();
        insert_blog_post(&pool, &second).await.unwrap();

        assert_eq!(get_blog_post(&pool, &first.id).await.unwrap().title, "First");
        assert_eq!(get_blog_post(&pool, &second.id).await.unwrap().title, "Second");
    }

    #[tokio::test]
    async fn test_published_filter() {
        let pool = super::super::test_pool().await;

        let mut hidden = draft("Hidden");
        assign_slug(&pool, &mut hidden, false).await.unwrap();
        insert_blog_post(&pool, &hidden).await.unwrap();

        let mut live = draft("Live").update(BlogPostInput {
            is_published: Some(true),
            ..Default::default()
        })
        .unwrap();
        assign_slug(&pool, &mut live, false).await.unwrap();
        insert_blog_post(&pool, &live).await.unwrap();

        let published = list_blog_posts(
            &pool,
            &BlogPostFilter {
                published: Some(true),
            },
        )
        .await
        .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Live");

        let all = list_blog_posts(&pool, &BlogPostFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
