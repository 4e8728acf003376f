/// Persistence layer
///
/// The auth core and the route handlers only talk to storage through the
/// traits below. Two implementations are provided: `PgStore` for Postgres
/// and `InMemoryStore` for tests and database-less local runs.

mod memory;
mod postgres;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::StoreError;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// A registered user. The password hash is never part of this record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub is_chirpy_red: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity and stored bcrypt hash for a login identifier
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub hashed_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored state of a refresh token, looked up by the token itself
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::Conflict` when the email is already registered.
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Looks up the stored hash for a login identifier (the email address).
    async fn get_user_credential_hash(&self, email: &str) -> Result<UserCredentials, StoreError>;

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, StoreError>;

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<(), StoreError>;

    /// Removes every user together with their chirps and refresh tokens.
    async fn delete_all_users(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<Chirp, StoreError>;

    /// Oldest first, optionally restricted to one author.
    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, StoreError>;

    async fn get_chirp(&self, id: Uuid) -> Result<Chirp, StoreError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// `StoreError::NotFound` when no record exists for the token.
    async fn get_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord, StoreError>;

    /// `StoreError::NotFound` when no matching unrevoked record exists.
    async fn revoke_refresh_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Everything the HTTP service needs from persistence
pub trait Store: UserStore + ChirpStore + RefreshTokenStore {}

impl<T> Store for T where T: UserStore + ChirpStore + RefreshTokenStore {}

/// SHA-256 digest of a refresh token. Stores key records by this value so
/// plaintext tokens never reach the database.
pub(crate) fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Bound a store call by `deadline`.
///
/// On expiry the in-flight future is dropped, which cancels the query, and
/// the caller sees `StoreError::Timeout` through its own error type.
pub async fn with_deadline<T, E, F>(deadline: Duration, call: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<StoreError>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(deadline).into()),
    }
}
