/// User Routes
///
/// Registration and self-service account updates.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::AuthService;
use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::validators::{is_valid_email, is_valid_password};

/// Email/password pair used by registration and updates
#[derive(Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/users
///
/// Register a new user. The response never includes the password hash.
///
/// # Errors
/// - 400: Invalid email or password
/// - 409: Email already registered
/// - 500: Hashing or store failure
/// - 503: Store did not answer in time
pub async fn create_user(
    form: web::Json<UserRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let user = auth.register(&email, &form.password).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(user))
}

/// PUT /api/users
///
/// Replace the authenticated user's password. The submitted email must be
/// the caller's own.
///
/// # Errors
/// - 401: Missing or invalid access token (handled by middleware)
/// - 401: Email is not the caller's
/// - 400: Invalid email or password
/// - 503: Store did not answer in time
pub async fn update_user(
    user: AuthenticatedUser,
    form: web::Json<UserRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(user.user_id.to_string());

    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let updated = auth
        .update_credentials(user.user_id, &email, &form.password)
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = ?context.user_id,
        "User updated successfully"
    );

    Ok(HttpResponse::Ok().json(updated))
}
