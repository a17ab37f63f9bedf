//! DTOs for the shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::NewEntry;

/// Request to shorten a long URL, optionally bounded by a validity window.
///
/// Window bounds are epoch milliseconds.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_window"))]
pub struct ShortenRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 2048, message = "URL must be 1 to 2048 characters"))]
    pub url: String,

    #[validate(range(min = 0, message = "validFrom must be a non-negative epoch millisecond"))]
    pub valid_from: Option<i64>,

    #[validate(range(min = 0, message = "validTill must be a non-negative epoch millisecond"))]
    pub valid_till: Option<i64>,
}

fn validate_window(request: &ShortenRequest) -> Result<(), ValidationError> {
    if let (Some(from), Some(till)) = (request.valid_from, request.valid_till)
        && from >= till
    {
        let mut error = ValidationError::new("window");
        error.message = Some("validFrom must be earlier than validTill".into());
        return Err(error);
    }

    Ok(())
}

impl From<ShortenRequest> for NewEntry {
    fn from(request: ShortenRequest) -> Self {
        Self {
            url: request.url,
            valid_from: request.valid_from,
            valid_till: request.valid_till,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_url: String,
}
