/// Authentication Routes
///
/// Handles login, access token refresh from a refresh token, and refresh
/// token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{extract_bearer_token, AuthService};
use crate::error::{AppError, ErrorContext};
use crate::storage::User;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User information plus a fresh token pair
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

/// Access token minted from a refresh token
#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// Authenticate user with email and password.
/// Returns the user, an access token and a refresh token on success.
///
/// # Errors
/// - 401: Invalid credentials (unknown email, wrong password)
/// - 500: Internal server error
///
/// # Security Notes
/// - Uses the same response for "not found" and "wrong password"
/// - Prevents user enumeration attacks
pub async fn login(
    form: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let session = auth.login(form.email.trim(), &form.password).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %session.user.id,
        "Session opened"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: session.user,
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Mint a new access token. The refresh token travels as a bearer token and
/// stays valid; it is not rotated.
///
/// # Errors
/// - 401: Missing, unknown, expired or revoked refresh token
/// - 500: Store failure
pub async fn refresh(
    req: HttpRequest,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = extract_bearer_token(req.headers())?;
    let token = auth.refresh(&refresh_token).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Revoke the bearer refresh token. Access tokens already issued from it
/// remain valid until they expire.
///
/// # Errors
/// - 401: Missing, unknown or already revoked refresh token
/// - 500: Store failure
pub async fn revoke(
    req: HttpRequest,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_revoke");

    let refresh_token = extract_bearer_token(req.headers())?;
    auth.revoke_refresh_token(&refresh_token).await?;

    tracing::info!(request_id = %context.request_id, "Refresh token revoked");

    Ok(HttpResponse::NoContent().finish())
}
