//! Public storage service for gallery scans and image uploads.
//!
//! Everything lives under the configured public root, one level of
//! folders deep: `{public_path}/{folder}/{filename}`. Files are served back
//! under `{public_url}/{folder}/{filename}`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Image extensions accepted by the scan and by uploads.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

const SUFFIX_ALPHABET: [char; 36] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// An image found on disk by the scan.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScannedImage {
    pub folder: String,
    pub filename: String,
    /// Path relative to the public root
    pub path: String,
    pub url: String,
    pub size: u64,
    pub mime_type: String,
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub images: Vec<ScannedImage>,
    pub total: usize,
    /// Configured folders that exist on disk
    pub folders: Vec<String>,
}

/// A file written by an upload.
#[derive(Debug, Clone, Serialize)]
pub struct StoredUpload {
    pub path: String,
    pub url: String,
    pub filename: String,
    pub size: usize,
    pub mime_type: String,
}

#[derive(Clone)]
pub struct GalleryService {
    config: StorageConfig,
}

impl GalleryService {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn max_upload_size(&self) -> usize {
        self.config.max_upload_size
    }

    pub fn public_root(&self) -> &Path {
        &self.config.public_path
    }

    /// Walk every configured folder (non-recursively) and list its images.
    pub async fn scan(&self) -> Result<ScanResult> {
        let mut images = Vec::new();
        let mut folders = Vec::new();

        for folder in &self.config.gallery_folders {
            let dir = self.config.public_path.join(folder);
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(folder = %folder, "Gallery folder missing, skipping");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            folders.push(folder.clone());

            let mut found = Vec::new();
            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                if !metadata.is_file() {
                    continue;
                }

                let filename = entry.file_name().to_string_lossy().into_owned();
                if !is_image_filename(&filename) {
                    continue;
                }

                let last_modified = metadata.modified().ok().map(|time| {
                    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
                });

                found.push(ScannedImage {
                    path: format!("{}/{}", folder, filename),
                    url: self.public_url(folder, &filename),
                    mime_type: mime_for(&filename),
                    folder: folder.clone(),
                    filename,
                    size: metadata.len(),
                    last_modified,
                });
            }

            found.sort_by(|a, b| a.filename.cmp(&b.filename));
            images.extend(found);
        }

        Ok(ScanResult {
            total: images.len(),
            images,
            folders,
        })
    }

    /// Store an uploaded image in `folder` under a fresh, collision-resistant name.
    pub async fn store_upload(
        &self,
        folder: &str,
        original_name: &str,
        data: &[u8],
    ) -> Result<StoredUpload> {
        if !self.config.gallery_folders.iter().any(|f| f == folder) {
            return Err(Error::field(
                "folder",
                format!(
                    "The folder must be one of: {}.",
                    self.config.gallery_folders.join(", ")
                ),
            ));
        }

        let extension = extension_of(original_name)
            .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| {
                Error::field(
                    "file",
                    format!("The file must be an image of type: {}.", IMAGE_EXTENSIONS.join(", ")),
                )
            })?;

        if data.is_empty() {
            return Err(Error::field("file", "The file must not be empty."));
        }

        if data.len() > self.config.max_upload_size {
            return Err(Error::FileTooLarge {
                max_size: self.config.max_upload_size,
            });
        }

        let filename = format!(
            "{}-{}.{}",
            sanitize_stem(original_name),
            nanoid::nanoid!(8, &SUFFIX_ALPHABET),
            extension
        );

        let dir: PathBuf = self.config.public_path.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Internal(format!("Failed to create directories: {}", e)))?;
        tokio::fs::write(dir.join(&filename), data)
            .await
            .map_err(|e| Error::Internal(format!("Failed to write file: {}", e)))?;

        info!(folder = %folder, filename = %filename, size = data.len(), "Stored upload");

        Ok(StoredUpload {
            path: format!("{}/{}", folder, filename),
            url: self.public_url(folder, &filename),
            mime_type: mime_for(&filename),
            filename,
            size: data.len(),
        })
    }

    fn public_url(&self, folder: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.public_url.trim_end_matches('/'),
            folder,
            filename
        )
    }
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

fn is_image_filename(filename: &str) -> bool {
    extension_of(filename).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn mime_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

/// Lowercase ASCII stem with runs of anything else collapsed to `-`.
fn sanitize_stem(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let mut out = String::with_capacity(stem.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }

    let trimmed: String = out.trim_end_matches('-').chars().take(64).collect();
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed
    }
}
