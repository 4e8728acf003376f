/// Payment provider (Polka) webhook
///
/// Authenticated with `Authorization: ApiKey <key>` rather than a user token.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::extract_api_key;
use crate::configuration::WebhookSettings;
use crate::error::{AppError, AuthError, StoreError};
use crate::storage::{Store, UserStore};

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct PolkaEvent {
    pub event: String,
    #[serde(default)]
    pub data: PolkaEventData,
}

#[derive(Deserialize, Default)]
pub struct PolkaEventData {
    #[serde(default)]
    pub user_id: String,
}

/// Constant-time comparison over SHA-256 digests of both keys
fn api_key_matches(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// POST /api/polka/webhooks
///
/// # Errors
/// - 401: Missing or wrong API key
/// - 404: Upgrade for an unknown user
pub async fn polka_webhook(
    req: HttpRequest,
    payload: web::Json<PolkaEvent>,
    webhook: web::Data<WebhookSettings>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let api_key = extract_api_key(req.headers())?;
    if !api_key_matches(&api_key, &webhook.polka_key) {
        tracing::warn!("Webhook rejected: API key mismatch");
        return Err(AuthError::Unauthorized.into());
    }

    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id =
        Uuid::parse_str(&payload.data.user_id).map_err(|_| AppError::NotFound("user"))?;

    store
        .upgrade_to_chirpy_red(user_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => AppError::NotFound("user"),
            other => other.into(),
        })?;

    tracing::info!(user_id = %user_id, "User upgraded to Chirpy Red");

    Ok(HttpResponse::NoContent().finish())
}
