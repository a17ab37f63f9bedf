//! Shortened URL entry and its validity window.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A persisted mapping from a sequence id to a long URL.
///
/// The external token is never stored; it is always the encoding of `id`.
/// Window bounds are epoch milliseconds, `None` meaning unbounded on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenedEntry {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub valid_from: Option<i64>,
    #[serde(default)]
    pub valid_till: Option<i64>,
}

/// Status of an entry's validity window at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Active,
    NotYetActive,
    Expired,
}

impl ShortenedEntry {
    pub fn new(id: i64, new_entry: NewEntry) -> Self {
        Self {
            id,
            url: new_entry.url,
            valid_from: new_entry.valid_from,
            valid_till: new_entry.valid_till,
        }
    }

    /// Evaluates the validity window at `now` (epoch ms).
    pub fn status_at(&self, now: i64) -> Validity {
        if self.valid_from.is_some_and(|from| now < from) {
            Validity::NotYetActive
        } else if self.valid_till.is_some_and(|till| now > till) {
            Validity::Expired
        } else {
            Validity::Active
        }
    }

    /// Returns true if the entry would be removed by an expiry sweep at `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.valid_till.is_some_and(|till| till < now)
    }
}

/// Input for creating an entry; the id is allocated by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub url: String,
    pub valid_from: Option<i64>,
    pub valid_till: Option<i64>,
}

impl NewEntry {
    /// Returns false when both bounds are present and `valid_from >= valid_till`.
    pub fn has_valid_window(&self) -> bool {
        match (self.valid_from, self.valid_till) {
            (Some(from), Some(till)) => from < till,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(valid_from: Option<i64>, valid_till: Option<i64>) -> ShortenedEntry {
        ShortenedEntry {
            id: 1,
            url: "https://example.com".to_string(),
            valid_from,
            valid_till,
        }
    }

    #[test]
    fn test_unbounded_entry_is_active() {
        assert_eq!(entry(None, None).status_at(now_millis()), Validity::Active);
    }

    #[test]
    fn test_not_yet_active() {
        let now = 1_000_000;
        assert_eq!(
            entry(Some(now + 60_000), None).status_at(now),
            Validity::NotYetActive
        );
    }

    #[test]
    fn test_expired() {
        let now = 1_000_000;
        assert_eq!(
            entry(None, Some(now - 60_000)).status_at(now),
            Validity::Expired
        );
        assert!(entry(None, Some(now - 1)).is_expired_at(now));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let e = entry(Some(100), Some(200));

        assert_eq!(e.status_at(99), Validity::NotYetActive);
        assert_eq!(e.status_at(100), Validity::Active);
        assert_eq!(e.status_at(200), Validity::Active);
        assert_eq!(e.status_at(201), Validity::Expired);
        assert!(!e.is_expired_at(200));
    }

    #[test]
    fn test_new_entry_window_check() {
        let mut new_entry = NewEntry {
            url: "https://example.com".to_string(),
            valid_from: Some(10),
            valid_till: Some(20),
        };
        assert!(new_entry.has_valid_window());

        new_entry.valid_till = Some(10);
        assert!(!new_entry.has_valid_window());

        new_entry.valid_from = None;
        assert!(new_entry.has_valid_window());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(entry(Some(1), None)).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["url"], "https://example.com");
        assert_eq!(json["validFrom"], 1);
        assert!(json["validTill"].is_null());
    }

    #[test]
    fn test_deserializes_without_window() {
        let parsed: ShortenedEntry =
            serde_json::from_str(r#"{"id":7,"url":"https://rust-lang.org"}"#).unwrap();

        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.valid_from, None);
        assert_eq!(parsed.valid_till, None);
    }
}
