/// In-memory store
///
/// Mirrors the Postgres schema closely enough for the HTTP test suite:
/// unique emails, cascade on `delete_all_users`, refresh tokens keyed by
/// digest. Refresh tokens are not checked against the users table.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    token_digest, Chirp, ChirpStore, RefreshTokenRecord, RefreshTokenStore, User,
    UserCredentials, UserStore,
};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, StoredUser>,
    chirps: Vec<Chirp>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    hashed_password: String,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

fn email_taken(tables: &Tables, email: &str, except: Option<Uuid>) -> bool {
    tables
        .users
        .values()
        .any(|stored| stored.user.email == email && Some(stored.user.id) != except)
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        if email_taken(&tables, email, None) {
            return Err(StoreError::Conflict(format!("email {} already registered", email)));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                hashed_password: hashed_password.to_string(),
            },
        );
        Ok(user)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        self.read()?
            .users
            .get(&id)
            .map(|stored| stored.user.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.read()?
            .users
            .values()
            .find(|stored| stored.user.email == email)
            .map(|stored| stored.user.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_credential_hash(&self, email: &str) -> Result<UserCredentials, StoreError> {
        self.read()?
            .users
            .values()
            .find(|stored| stored.user.email == email)
            .map(|stored| UserCredentials {
                user_id: stored.user.id,
                hashed_password: stored.hashed_password.clone(),
            })
            .ok_or(StoreError::NotFound)
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        if email_taken(&tables, email, Some(id)) {
            return Err(StoreError::Conflict(format!("email {} already registered", email)));
        }

        let stored = tables.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        stored.user.email = email.to_string();
        stored.user.updated_at = Utc::now();
        stored.hashed_password = hashed_password.to_string();
        Ok(stored.user.clone())
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let stored = tables.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        stored.user.is_chirpy_red = true;
        stored.user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_all_users(&self) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.users.clear();
        tables.chirps.clear();
        tables.refresh_tokens.clear();
        Ok(())
    }
}

#[async_trait]
impl ChirpStore for InMemoryStore {
    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<Chirp, StoreError> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::NotFound);
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            body: body.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        tables.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, StoreError> {
        Ok(self
            .read()?
            .chirps
            .iter()
            .filter(|chirp| author_id.map_or(true, |author| chirp.user_id == author))
            .cloned()
            .collect())
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Chirp, StoreError> {
        self.read()?
            .chirps
            .iter()
            .find(|chirp| chirp.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let key = token_digest(token);
        if tables.refresh_tokens.contains_key(&key) {
            return Err(StoreError::Conflict("refresh token already exists".to_string()));
        }

        tables.refresh_tokens.insert(
            key,
            RefreshTokenRecord {
                user_id,
                created_at: Utc::now(),
                expires_at,
                revoked_at: None,
            },
        );
        Ok(())
    }

    async fn get_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord, StoreError> {
        self.read()?
            .refresh_tokens
            .get(&token_digest(token))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn revoke_refresh_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        match tables.refresh_tokens.get_mut(&token_digest(token)) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoked_at = Some(revoked_at);
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }
}
