/// Credential extraction from the `Authorization` header
///
/// Two schemes are recognised: `Bearer <token>` for access and refresh tokens
/// and `ApiKey <key>` for the payment provider webhook. The scheme label is
/// removed by replacing its first occurrence, so a header without the label
/// is returned unchanged.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::ExtractError;

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

/// Extract a bearer token from the `Authorization` header
///
/// # Errors
/// Returns `MissingAuthorization` if the header is absent, empty or not
/// visible ASCII
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ExtractError> {
    extract_credential(headers, BEARER_PREFIX)
}

/// Extract an API key from the `Authorization` header
///
/// # Errors
/// Returns `MissingAuthorization` if the header is absent, empty or not
/// visible ASCII
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, ExtractError> {
    extract_credential(headers, API_KEY_PREFIX)
}

fn extract_credential(headers: &HeaderMap, prefix: &str) -> Result<String, ExtractError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .ok_or(ExtractError::MissingAuthorization)?;

    Ok(value.replacen(prefix, "", 1))
}
