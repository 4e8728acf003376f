/// Authentication service
///
/// Binds the token codecs and the credential hasher to the configured signing
/// key, lifetimes and store. Every store call is bounded by
/// `JwtSettings::store_timeout`.

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::auth::{jwt, password, refresh_token};
use crate::configuration::JwtSettings;
use crate::error::{
    AccessTokenError, AppError, AuthError, CredentialError, RefreshTokenError, StoreError,
};
use crate::storage::{with_deadline, Store, User, UserStore};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    settings: JwtSettings,
    store: Arc<dyn Store>,
}

impl AuthService {
    pub fn new(settings: JwtSettings, store: Arc<dyn Store>) -> Self {
        Self { settings, store }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        password::hash_password(password)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<(), CredentialError> {
        password::verify_password(password, hash)
    }

    pub fn issue_access_token(
        &self,
        user_id: Uuid,
        ttl: Duration,
    ) -> Result<String, AccessTokenError> {
        jwt::issue_access_token(&user_id, &self.settings.secret, ttl)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Uuid, AccessTokenError> {
        jwt::validate_access_token(token, &self.settings.secret)
    }

    #[tracing::instrument(skip(self))]
    pub async fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, RefreshTokenError> {
        with_deadline(
            self.settings.store_timeout(),
            refresh_token::issue_refresh_token(
                self.store.as_ref(),
                user_id,
                self.settings.refresh_token_ttl(),
            ),
        )
        .await
    }

    pub async fn redeem_refresh_token(&self, token: &str) -> Result<Uuid, RefreshTokenError> {
        with_deadline(
            self.settings.store_timeout(),
            refresh_token::redeem_refresh_token(self.store.as_ref(), token),
        )
        .await
    }

    pub async fn revoke_refresh_token(&self, token: &str) -> Result<(), RefreshTokenError> {
        with_deadline(
            self.settings.store_timeout(),
            refresh_token::revoke_refresh_token(self.store.as_ref(), token),
        )
        .await
    }

    /// Hash the password and persist a new user
    #[tracing::instrument(skip(self, email, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AppError> {
        let hashed_password = self.hash_password(password)?;
        let user = with_deadline(
            self.settings.store_timeout(),
            self.store.create_user(email, &hashed_password),
        )
        .await?;
        Ok(user)
    }

    /// Replace the caller's password
    ///
    /// The submitted email must be the caller's current one; anything else is
    /// `AuthError::Unauthorized`, as is a caller that no longer exists.
    #[tracing::instrument(skip(self, email, password))]
    pub async fn update_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let deadline = self.settings.store_timeout();

        let current = match with_deadline(deadline, self.store.get_user_by_id(user_id)).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(AuthError::Unauthorized.into()),
            Err(e) => return Err(e.into()),
        };

        if current.email != email {
            tracing::warn!("Credential update rejected: email does not belong to caller");
            return Err(AuthError::Unauthorized.into());
        }

        let hashed_password = self.hash_password(password)?;
        let user = with_deadline(
            deadline,
            self.store.update_user(user_id, email, &hashed_password),
        )
        .await?;
        Ok(user)
    }

    /// Check an email/password pair and open a session
    ///
    /// Unknown email, wrong password and a corrupt stored hash all surface as
    /// `AuthError::AuthenticationFailed`.
    #[tracing::instrument(skip(self, email, password), fields(user_id = tracing::field::Empty))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let deadline = self.settings.store_timeout();

        let credentials =
            match with_deadline(deadline, self.store.get_user_credential_hash(email)).await {
                Ok(credentials) => credentials,
                Err(StoreError::NotFound) => {
                    tracing::warn!("Login failed: user not found");
                    return Err(AuthError::AuthenticationFailed.into());
                }
                Err(e) => return Err(e.into()),
            };

        tracing::Span::current().record("user_id", tracing::field::display(credentials.user_id));

        match self.verify_password(password, &credentials.hashed_password) {
            Ok(()) => {}
            Err(CredentialError::CredentialMismatch) => {
                tracing::warn!("Login failed: invalid password");
                return Err(AuthError::AuthenticationFailed.into());
            }
            Err(e @ CredentialError::MalformedHash(_)) => {
                tracing::error!(error = %e, "Login failed: stored hash is unusable");
                return Err(AuthError::AuthenticationFailed.into());
            }
            Err(e) => return Err(e.into()),
        }

        let user = with_deadline(deadline, self.store.get_user_by_id(credentials.user_id)).await?;
        let access_token = self.issue_access_token(user.id, self.settings.access_token_ttl())?;
        let refresh_token = self.issue_refresh_token(user.id).await?;

        tracing::info!("User logged in successfully");

        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a refresh token. The refresh token is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let user_id = self.redeem_refresh_token(refresh_token).await?;
        let access_token = self.issue_access_token(user_id, self.settings.access_token_ttl())?;

        tracing::info!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }
}
