/// JWT Token Generation and Validation
///
/// Access tokens are HS256-signed JWTs. They are stateless: validity is decided
/// by the signature and the timestamps alone, so there is nothing to revoke.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ACCESS_TOKEN_ISSUER};
use crate::error::AccessTokenError;

/// Generate a new access token for a user
///
/// # Arguments
/// * `user_id` - User's UUID, stored as the subject
/// * `signing_key` - Symmetric HMAC key
/// * `ttl` - How long the token stays valid
///
/// # Errors
/// Returns `Signing` if the encoder fails
pub fn issue_access_token(
    user_id: &Uuid,
    signing_key: &str,
    ttl: Duration,
) -> Result<String, AccessTokenError> {
    let claims = Claims::new(*user_id, ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key.as_bytes()),
    )
    .map_err(AccessTokenError::Signing)
}

/// Verify signature, issuer and expiry, returning the claims
///
/// Expiry is a hard boundary: no leeway is granted.
pub fn decode_access_token(token: &str, signing_key: &str) -> Result<Claims, AccessTokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(signing_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => AccessTokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => AccessTokenError::TokenExpired,
        _ => AccessTokenError::MalformedToken,
    })
}

/// Validate an access token and resolve the user it was issued to
///
/// # Errors
/// - `SignatureInvalid` if the token was not signed with `signing_key`
/// - `TokenExpired` once `exp` has passed
/// - `MalformedToken` on any structural problem
/// - `MalformedSubject` if the subject is not a UUID
pub fn validate_access_token(token: &str, signing_key: &str) -> Result<Uuid, AccessTokenError> {
    decode_access_token(token, signing_key)?.user_id()
}
