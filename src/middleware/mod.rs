//! Middleware for Outreach.
//!
//! - `jwt_auth` - bearer token validation for the admin API
//! - `metrics` - per-route request counters and latency histograms

mod jwt_auth;
mod metrics;

pub use jwt_auth::{attach_auth, authenticate, bearer_token, require_auth, AuthUser};
pub use metrics::track_requests;
