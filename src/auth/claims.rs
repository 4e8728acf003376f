/// JWT Claims structure
///
/// The payload of an access token: registered claims only (RFC 7519).

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AccessTokenError;

/// Issuer label stamped into every access token
pub const ACCESS_TOKEN_ISSUER: &str = "chirpy";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `user_id` that expire `ttl` from now
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `MalformedSubject` if the subject is not a valid UUID
    pub fn user_id(&self) -> Result<Uuid, AccessTokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| AccessTokenError::MalformedSubject)
    }
}
