/// Refresh Token Management
///
/// Refresh tokens are opaque, 32 random bytes hex-encoded. They are:
/// - Issued at login and persisted with an expiry
/// - Reusable until they expire or are explicitly revoked (no rotation on use)
/// - Revoked at most once; a second revoke reports `TokenNotFound`
///
/// Revoking a refresh token stops renewal only. Access tokens already minted
/// from it stay valid until their own expiry.

use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::error::RefreshTokenError;
use crate::storage::RefreshTokenStore;

/// Number of random bytes in a refresh token (hex doubles the length)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new cryptographically secure refresh token
///
/// # Errors
/// Returns `EntropySourceFailure` if the OS random source cannot be read.
/// There is no fallback to a weaker generator.
pub fn generate_refresh_token() -> Result<String, RefreshTokenError> {
    generate_with(&mut OsRng)
}

fn generate_with<R: RngCore>(rng: &mut R) -> Result<String, RefreshTokenError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rng.try_fill_bytes(&mut bytes)
        .map_err(RefreshTokenError::EntropySourceFailure)?;
    Ok(hex::encode(bytes))
}

/// Generate and persist a refresh token for `user_id`
///
/// # Errors
/// - `EntropySourceFailure` if no token could be generated
/// - `PersistenceFailure` if the store write fails; the token is discarded
pub async fn issue_refresh_token<S>(
    store: &S,
    user_id: Uuid,
    ttl: Duration,
) -> Result<String, RefreshTokenError>
where
    S: RefreshTokenStore + ?Sized,
{
    let token = generate_refresh_token()?;
    let expires_at = Utc::now() + ttl;

    store
        .create_refresh_token(&token, user_id, expires_at)
        .await
        .map_err(RefreshTokenError::PersistenceFailure)?;

    tracing::debug!(user_id = %user_id, expires_at = %expires_at, "Refresh token issued");
    Ok(token)
}

/// Resolve the owner of a refresh token without consuming it
///
/// Revocation is checked before expiry.
///
/// # Errors
/// - `TokenNotFound` if the token is unknown
/// - `TokenRevoked` if it has been revoked
/// - `TokenExpired` once `now >= expires_at`
pub async fn redeem_refresh_token<S>(store: &S, token: &str) -> Result<Uuid, RefreshTokenError>
where
    S: RefreshTokenStore + ?Sized,
{
    let record = store.get_refresh_token(token).await?;

    if record.revoked_at.is_some() {
        tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
        return Err(RefreshTokenError::TokenRevoked);
    }

    if Utc::now() >= record.expires_at {
        tracing::info!(user_id = %record.user_id, "Refresh token expired");
        return Err(RefreshTokenError::TokenExpired);
    }

    Ok(record.user_id)
}

/// Revoke a refresh token
///
/// # Errors
/// Returns `TokenNotFound` if no matching unrevoked token exists.
pub async fn revoke_refresh_token<S>(store: &S, token: &str) -> Result<(), RefreshTokenError>
where
    S: RefreshTokenStore + ?Sized,
{
    store.revoke_refresh_token(token, Utc::now()).await?;
    Ok(())
}
