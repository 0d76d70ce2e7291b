//! Caller identity extraction.
//!
//! Credential verification belongs to the identity service in front of
//! this API; by the time a request arrives here, the `x-user-id` header
//! either carries the authenticated user's id or is absent. This module
//! only parses the header — it never verifies anything.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The (possibly anonymous) caller, as asserted by the identity layer.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity(pub Option<Uuid>);

impl CallerIdentity {
  /// The caller's id, or 401 for anonymous requests.
  pub fn require(self) -> Result<Uuid, ApiError> {
    self.0.ok_or(ApiError::Unauthorized)
  }
}

impl<St: Send + Sync> FromRequestParts<St> for CallerIdentity {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &St,
  ) -> Result<Self, Self::Rejection> {
    let Some(value) = parts.headers.get(USER_ID_HEADER) else {
      return Ok(Self(None));
    };

    let user_id = value
      .to_str()
      .ok()
      .and_then(|s| Uuid::parse_str(s).ok())
      .ok_or_else(|| {
        ApiError::BadRequest(format!("malformed {USER_ID_HEADER} header"))
      })?;

    Ok(Self(Some(user_id)))
  }
}
