//! Per-client rate limiting for public form submissions.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::http::HeaderMap;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::error::{Error, Result};

/// Keys tracked before stale entries are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// Bucket shared by requests that carry no client address.
const ANONYMOUS_KEY: &str = "anonymous";

/// Keyed limiter. A quota of zero disables limiting.
#[derive(Clone)]
pub struct SubmissionLimiter {
    limiter: Option<Arc<DefaultKeyedRateLimiter<String>>>,
}

impl SubmissionLimiter {
    pub fn per_minute(quota: u32) -> Self {
        let limiter = NonZeroU32::new(quota)
            .map(|n| Arc::new(RateLimiter::keyed(Quota::per_minute(n))));
        Self { limiter }
    }

    /// Consume one unit for `key`, failing with 429 when the quota is spent.
    pub fn check(&self, key: &str) -> Result<()> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        if limiter.len() > SWEEP_THRESHOLD {
            limiter.retain_recent();
        }

        limiter
            .check_key(&key.to_string())
            .map_err(|_| Error::RateLimitExceeded)
    }
}

/// Client key from proxy headers: the first `X-Forwarded-For` entry,
/// then `X-Real-IP`.
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(ANONYMOUS_KEY)
        .to_string()
}
