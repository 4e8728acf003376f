//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use actix_web::web;
use chirpy::configuration::{
    ApplicationSettings, DatabaseSettings, JwtSettings, Settings, WebhookSettings,
};
use chirpy::metrics::ServerMetrics;
use chirpy::startup::run;
use chirpy::storage::{InMemoryStore, Store};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;

pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub metrics: web::Data<ServerMetrics>,
}

pub fn test_settings(platform: &str) -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "chirpy".to_string(),
        },
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            platform: platform.to_string(),
            static_dir: "./public".to_string(),
        },
        jwt: JwtSettings {
            secret: JWT_SECRET.to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry_days: 60,
            store_timeout_ms: 5000,
        },
        webhook: WebhookSettings {
            polka_key: POLKA_KEY.to_string(),
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_on_platform("dev").await
}

pub async fn spawn_app_on_platform(platform: &str) -> TestApp {
    spawn_app_with(Arc::new(InMemoryStore::new()), test_settings(platform)).await
}

pub async fn spawn_app_with(store: Arc<dyn Store>, settings: Settings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let metrics = web::Data::new(ServerMetrics::new());
    let server = run(listener, store, settings, metrics.clone()).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        metrics,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_user(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register and log in, returning the login body
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Value {
        assert_eq!(self.create_user(email, password).await.status().as_u16(), 201);
        let response = self.login(email, password).await;
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("Failed to parse login response")
    }

    pub async fn post_chirp(&self, token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/chirps"))
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/refresh"))
            .bearer_auth(refresh_token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn revoke(&self, refresh_token: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/revoke"))
            .bearer_auth(refresh_token)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
