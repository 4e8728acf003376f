/// Authentication module
///
/// Handles JWT access token issuing/validation, password hashing,
/// refresh token management and credential extraction from headers.

mod claims;
mod headers;
mod jwt;
mod password;
mod refresh_token;
mod service;

pub use claims::{Claims, ACCESS_TOKEN_ISSUER};
pub use headers::{extract_api_key, extract_bearer_token};
pub use jwt::{decode_access_token, issue_access_token, validate_access_token};
pub use password::{hash_password, verify_password};
pub use refresh_token::{
    generate_refresh_token, issue_refresh_token, redeem_refresh_token, revoke_refresh_token,
    REFRESH_TOKEN_BYTES,
};
pub use service::{AuthService, Session};
