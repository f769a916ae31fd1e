//! Rate-limit bookkeeping.
//!
//! Rate information is parsed per response and handed back to the caller in
//! [`ResponseMeta`](crate::ResponseMeta); the client itself never accumulates it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};

const HEADER_LIMIT: &str = "x-ratelimit-limit";
const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_USED: &str = "x-ratelimit-used";
const HEADER_RESET: &str = "x-ratelimit-reset";
const HEADER_RESOURCE: &str = "x-ratelimit-resource";

/// Rate-limit counters for one rate-limit resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// Maximum requests per window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    #[serde(default)]
    pub used: u64,
    /// When the window resets.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub reset: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl Rate {
    /// Parses the `X-RateLimit-*` headers. Returns `None` unless limit,
    /// remaining and reset are all present and numeric.
    pub fn from_headers(headers: &HeaderMap) -> Option<Rate> {
        let limit = header_u64(headers, HEADER_LIMIT)?;
        let remaining = header_u64(headers, HEADER_REMAINING)?;
        let reset_epoch = header_str(headers, HEADER_RESET)?.parse::<i64>().ok()?;
        let reset = DateTime::from_timestamp(reset_epoch, 0)?;
        Some(Rate {
            limit,
            remaining,
            used: header_u64(headers, HEADER_USED).unwrap_or(limit.saturating_sub(remaining)),
            reset,
            resource: header_str(headers, HEADER_RESOURCE).map(str::to_string),
        })
    }

    /// True when no requests are left in the current window.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Time until the window resets, measured against `now`.
    pub fn resets_in(&self, now: DateTime<Utc>) -> Duration {
        (self.reset - now).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Body of `GET rate_limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimits {
    pub resources: RateResources,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateResources {
    pub core: Rate,
    pub search: Option<Rate>,
    pub graphql: Option<Rate>,
}

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    header_str(headers, RETRY_AFTER.as_str())?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    header_str(headers, name)?.trim().parse().ok()
}
