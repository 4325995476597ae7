//! Service layer for Outreach.
//!
//! Contains the logic that sits between handlers and the database:
//! - Auth (password hashing, JWT issue/refresh/revocation)
//! - Gallery (public storage scan and image uploads)
//! - RateLimit (per-client quotas for public submissions)

mod auth;
mod gallery;
mod rate_limit;

pub use auth::{hash_password, verify_password, AuthService, Claims, TokenResponse, MIN_PASSWORD_LEN};
pub use gallery::{GalleryService, ScanResult, ScannedImage, StoredUpload, IMAGE_EXTENSIONS};
pub use rate_limit::{client_key, SubmissionLimiter};
