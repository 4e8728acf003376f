/// Chirp Routes

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, StoreError, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::profanity::clean_chirp_body;
use crate::storage::{ChirpStore, Store};
use crate::validators::is_valid_chirp_body;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

/// POST /api/chirps
///
/// # Errors
/// - 401: Missing or invalid access token (handled by middleware)
/// - 400: Body longer than 140 characters
pub async fn create_chirp(
    user: AuthenticatedUser,
    form: web::Json<CreateChirpRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    is_valid_chirp_body(&form.body)?;
    let body = clean_chirp_body(&form.body);

    let chirp = store
        .create_chirp(&body, user.user_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => AppError::NotFound("user"),
            other => other.into(),
        })?;

    tracing::info!(chirp_id = %chirp.id, user_id = %user.user_id, "Chirp created");

    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
///
/// Oldest first unless `sort=desc`.
pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let author_id = match query.author_id.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ValidationError::InvalidFormat("author_id".to_string()))?,
        ),
    };

    let descending = match query.sort.as_deref() {
        None | Some("") | Some("asc") => false,
        Some("desc") => true,
        Some(_) => return Err(ValidationError::InvalidFormat("sort".to_string()).into()),
    };

    let mut chirps = store.list_chirps(author_id).await?;
    if descending {
        chirps.reverse();
    }

    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
///
/// # Errors
/// - 404: Unknown or malformed chirp id
pub async fn get_chirp(
    path: web::Path<String>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = Uuid::parse_str(path.as_str()).map_err(|_| AppError::NotFound("chirp"))?;

    let chirp = store.get_chirp(chirp_id).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound("chirp"),
        other => other.into(),
    })?;

    Ok(HttpResponse::Ok().json(chirp))
}
