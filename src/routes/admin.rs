/// Metrics and Admin Routes

use actix_web::{web, HttpResponse};

use crate::configuration::ApplicationSettings;
use crate::error::{AppError, AuthError};
use crate::metrics::ServerMetrics;
use crate::storage::{Store, UserStore};

/// GET /api/metrics
pub async fn metrics(metrics: web::Data<ServerMetrics>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("Hits: {}", metrics.hits()))
}

/// GET /admin/metrics
pub async fn admin_metrics(metrics: web::Data<ServerMetrics>) -> HttpResponse {
    let page = format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>"#,
        metrics.hits()
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page)
}

/// POST /admin/reset
///
/// Deletes every user (with their chirps and refresh tokens) and zeroes the
/// hit counter. Only available when `application.platform` is `dev`.
///
/// # Errors
/// - 403: Not running on the dev platform
/// - 500/503: Store failure
pub async fn reset(
    app_settings: web::Data<ApplicationSettings>,
    store: web::Data<dyn Store>,
    metrics: web::Data<ServerMetrics>,
) -> Result<HttpResponse, AppError> {
    if !app_settings.is_dev() {
        tracing::warn!(platform = %app_settings.platform, "Reset refused outside dev platform");
        return Err(AuthError::Forbidden.into());
    }

    store.delete_all_users().await?;
    metrics.reset();

    tracing::info!("All users deleted and hit counter reset");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0"))
}
