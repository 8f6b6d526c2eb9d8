//! Staff identity of the caller.
//!
//! Authentication itself happens upstream; this service only needs to know
//! who is acting. The caller's staff id arrives in the `X-Staff-Id` header
//! and ends up as `opened_by`, `closed_by`, `verified_by` and the audit
//! event actor.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::error::ApiError;

/// Header carrying the authenticated staff member's id.
pub const STAFF_ID_HEADER: &str = "x-staff-id";

/// Identity of the staff member making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffId(pub String);

impl StaffId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for StaffId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(STAFF_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match value {
            Some(id) => Ok(StaffId(id.to_string())),
            None => {
                warn!(uri = %parts.uri, "Request without staff identity");
                Err(ApiError::authentication("Missing X-Staff-Id header"))
            }
        }
    }
}
