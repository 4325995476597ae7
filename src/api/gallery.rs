//! Gallery Routes
//!
//! Curated gallery records plus management of the public storage folders
//! the images live in.
//!
//! Routes:
//! - GET /gallery - List gallery images (optional `category` filter)
//! - POST /gallery - Create a gallery image (auth)
//! - GET /gallery/:id - Show a gallery image
//! - PUT /gallery/:id - Update a gallery image (auth)
//! - DELETE /gallery/:id - Delete a gallery image (auth)
//! - GET /gallery-scan - List image files found in storage folders (auth)
//! - POST /uploads - Upload an image into a storage folder (auth)

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;
use tracing::info;

use super::{deleted, protected};
use crate::{
    db::{self, GalleryImage, GalleryImageFilter, GalleryImageInput},
    error::{Error, Result},
    services::{ScanResult, StoredUpload},
    AppState,
};

const DEFAULT_UPLOAD_FOLDER: &str = "gallery";

/// Room for multipart boundaries and the `folder` field on top of the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn routes(state: &AppState) -> Router<AppState> {
    let upload_limit = state.gallery.max_upload_size() + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/gallery",
            get(list_gallery_images).merge(protected(state, post(create_gallery_image))),
        )
        .route(
            "/gallery/:id",
            get(show_gallery_image).merge(protected(
                state,
                put(update_gallery_image)
                    .patch(update_gallery_image)
                    .delete(delete_gallery_image),
            )),
        )
        .route("/gallery-scan", protected(state, get(scan_gallery)))
        .route(
            "/uploads",
            protected(
                state,
                post(upload_image).layer(DefaultBodyLimit::max(upload_limit)),
            ),
        )
}

async fn list_gallery_images(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<GalleryImageFilter>, Error>,
) -> Result<Json<Vec<GalleryImage>>> {
    Ok(Json(db::list_gallery_images(&state.db, &filter).await?))
}

async fn show_gallery_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GalleryImage>> {
    Ok(Json(db::get_gallery_image(&state.db, &id).await?))
}

async fn create_gallery_image(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<GalleryImageInput>, Error>,
) -> Result<(StatusCode, Json<GalleryImage>)> {
    let image = db::insert_gallery_image(&state.db, &GalleryImage::create(input)?).await?;
    info!(image_id = %image.id, "Gallery image created");
    Ok((StatusCode::CREATED, Json(image)))
}

async fn update_gallery_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(input), _): WithRejection<Json<GalleryImageInput>, Error>,
) -> Result<Json<GalleryImage>> {
    let image = db::get_gallery_image(&state.db, &id).await?.update(input)?;
    let image = db::update_gallery_image(&state.db, &image).await?;
    info!(image_id = %image.id, "Gallery image updated");
    Ok(Json(image))
}

async fn delete_gallery_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    db::delete_gallery_image(&state.db, &id).await?;
    info!(image_id = %id, "Gallery image deleted");
    Ok(deleted("Gallery image"))
}

/// Walk the configured storage folders for image files.
///
/// GET /gallery-scan
async fn scan_gallery(State(state): State<AppState>) -> Result<Json<ScanResult>> {
    let result = state.gallery.scan().await?;
    info!(total = result.total, folders = result.folders.len(), "Gallery scanned");
    Ok(Json(result))
}

/// Upload an image into public storage.
///
/// POST /uploads
///
/// Accepts multipart/form-data with a file field named "file" and an
/// optional text field "folder" (defaults to `gallery`).
async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoredUpload>)> {
    let mut folder = DEFAULT_UPLOAD_FOLDER.to_string();
    let mut file: Option<(String, Vec<u8>)> = None;

    let max_size = state.gallery.max_upload_size();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "folder" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_size))?;
                let value = value.trim().trim_matches('/');
                if !value.is_empty() {
                    folder = value.to_string();
                }
            }
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_default();

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max_size))?;

                file = Some((filename, data.to_vec()));
            }
            _ => continue,
        }
    }

    let (filename, data) = file.ok_or_else(|| Error::field("file", "The file field is required."))?;
    let stored = state.gallery.store_upload(&folder, &filename, &data).await?;
    info!(path = %stored.path, size = stored.size, "Image uploaded");

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Body-limit hits surface as 413, anything else as a malformed request.
fn multipart_error(err: MultipartError, max_size: usize) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::FileTooLarge { max_size }
    } else {
        Error::InvalidInput(format!("Failed to read multipart body: {}", err.body_text()))
    }
}
