//! Curated gallery image queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;
use crate::validation::{self, Validator, SHORT_TEXT, URL_TEXT};
use crate::{Error, Result};

/// Gallery image record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub display_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryImageInput {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryImageFilter {
    pub category: Option<String>,
}

impl GalleryImage {
    pub fn create(input: GalleryImageInput) -> Result<Self> {
        let now = super::timestamp();
        let mut image = Self {
            id: super::new_id(),
            title: String::new(),
            image_url: String::new(),
            category: None,
            description: None,
            display_order: 0,
            created_at: now.clone(),
            updated_at: now,
        };
        image.apply(input);
        image.validate()?;
        Ok(image)
    }

    pub fn update(mut self, input: GalleryImageInput) -> Result<Self> {
        self.apply(input);
        self.updated_at = super::timestamp();
        self.validate()?;
        Ok(self)
    }

    fn apply(&mut self, input: GalleryImageInput) {
        validation::patch_text(&mut self.title, input.title);
        validation::patch_text(&mut self.image_url, input.image_url);
        validation::patch_opt_text(&mut self.category, input.category);
        validation::patch_opt_text(&mut self.description, input.description);
        validation::patch(&mut self.display_order, input.display_order);
    }

    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.required("title", &self.title)
            .max_chars("title", Some(&self.title), SHORT_TEXT)
            .required("image_url", &self.image_url)
            .max_chars("image_url", Some(&self.image_url), URL_TEXT)
            .max_chars("category", self.category.as_deref(), SHORT_TEXT)
            .min_i64("display_order", Some(self.display_order), 0);
        v.finish()
    }
}

// ============================================================================
// Gallery Image Queries
// ============================================================================

pub async fn insert_gallery_image(pool: &DbPool, g: &GalleryImage) -> Result<GalleryImage> {
    sqlx::query_as::<_, GalleryImage>(
        r#"
        INSERT INTO gallery_images (
            id, title, image_url, category, description, display_order, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&g.id)
    .bind(&g.title)
    .bind(&g.image_url)
    .bind(&g.category)
    .bind(&g.description)
    .bind(g.display_order)
    .bind(&g.created_at)
    .bind(&g.updated_at)
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}

pub async fn get_gallery_image(pool: &DbPool, id: &str) -> Result<GalleryImage> {
    sqlx::query_as::<_, GalleryImage>("SELECT * FROM gallery_images WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Gallery image {}", id)))
}

pub async fn list_gallery_images(
    pool: &DbPool,
    filter: &GalleryImageFilter,
) -> Result<Vec<GalleryImage>> {
    sqlx::query_as::<_, GalleryImage>(
        r#"
        SELECT * FROM gallery_images
        WHERE (?1 IS NULL OR category = ?1)
        ORDER BY display_order ASC, title ASC
        "#,
    )
    .bind(&filter.category)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

pub async fn update_gallery_image(pool: &DbPool, g: &GalleryImage) -> Result<GalleryImage> {
    sqlx::query_as::<_, GalleryImage>(
        r#"
        UPDATE gallery_images SET
            title = ?, image_url = ?, category = ?, description = ?,
            display_order = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&g.title)
    .bind(&g.image_url)
    .bind(&g.category)
    .bind(&g.description)
    .bind(g.display_order)
    .bind(&g.updated_at)
    .bind(&g.id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Gallery image {}", g.id)))
}

pub async fn delete_gallery_image(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM gallery_images WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Gallery image {}", id)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_category_filter() {
        let pool = super::super::test_pool().await;
        for (title, category) in [("Harvest", Some("events")), ("Well", None)] {
            let image = GalleryImage::create(GalleryImageInput {
                title: Some(title.into()),
                image_url: Some(format!("/storage/gallery/{}.jpg", title.to_lowercase())),
                category: category.map(String::from),
                ..Default::default()
            })
            .unwrap();
            insert_gallery_image(&pool, &image).await.unwrap();
        }

        let events = list_gallery_images(
            &pool,
            &GalleryImageFilter {
                category: Some("events".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Harvest");
    }

    #[test]
    fn test_image_url_required() {
        let err = GalleryImage::create(GalleryImageInput {
            title: Some("Orphan".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref f) if f.contains_key("image_url")));
    }
}
