//! DTO for the entry details endpoint.

use serde::Serialize;

use crate::domain::entities::{ShortenedEntry, Validity};

/// Stored entry as returned by `GET {ctx}/details/{token}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsResponse {
    pub id: i64,
    pub token: String,
    pub url: String,
    pub valid_from: Option<i64>,
    pub valid_till: Option<i64>,
    /// `active`, `not_yet_active` or `expired` at response time.
    pub status: &'static str,
}

impl DetailsResponse {
    pub fn new(token: String, entry: ShortenedEntry, now: i64) -> Self {
        let status = match entry.status_at(now) {
            Validity::Active => "active",
            Validity::NotYetActive => "not_yet_active",
            Validity::Expired => "expired",
        };

        Self {
            id: entry.id,
            token,
            url: entry.url,
            valid_from: entry.valid_from,
            valid_till: entry.valid_till,
            status,
        }
    }
}
