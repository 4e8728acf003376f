use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{guard, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::metrics::ServerMetrics;
use crate::middleware::{HitCounter, RequireAuthorization};
use crate::routes::{
    admin_metrics, create_chirp, create_user, get_chirp, health_check, list_chirps, login,
    metrics, polka_webhook, refresh, reset, revoke, update_user,
};
use crate::storage::Store;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn Store>,
    settings: Settings,
    metrics_data: web::Data<ServerMetrics>,
) -> Result<Server, std::io::Error> {
    let auth_service = web::Data::new(AuthService::new(settings.jwt.clone(), Arc::clone(&store)));
    let store = web::Data::from(store);
    let app_settings = web::Data::new(settings.application.clone());
    let webhook_settings = web::Data::new(settings.webhook.clone());
    let signing_key = settings.jwt.secret.clone();
    let static_dir = settings.application.static_dir.clone();

    let server = HttpServer::new(move || {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            tracing::debug!(error = %err, "Rejected request body");
            AppError::from(ValidationError::InvalidFormat("request body".to_string())).into()
        });

        App::new()
            // Global middleware
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(json_config)
            .app_data(store.clone())
            .app_data(auth_service.clone())
            .app_data(app_settings.clone())
            .app_data(webhook_settings.clone())
            .app_data(metrics_data.clone())

            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/metrics", web::get().to(metrics))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .route("/polka/webhooks", web::post().to(polka_webhook))

                    // Protected routes (require a valid access token)
                    .service(
                        web::resource("/users")
                            .guard(guard::Put())
                            .wrap(RequireAuthorization::new(signing_key.clone()))
                            .route(web::put().to(update_user)),
                    )
                    .service(
                        web::resource("/chirps")
                            .guard(guard::Post())
                            .wrap(RequireAuthorization::new(signing_key.clone()))
                            .route(web::post().to(create_chirp)),
                    )

                    .route("/users", web::post().to(create_user))
                    .route("/chirps", web::get().to(list_chirps))
                    .route("/chirps/{chirp_id}", web::get().to(get_chirp)),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(admin_metrics))
                    .route("/reset", web::post().to(reset)),
            )

            // Static files, every request counted
            .service(
                web::scope("/app")
                    .wrap(HitCounter::new(metrics_data.clone()))
                    .service(fs::Files::new("/", &static_dir).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
