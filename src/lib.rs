pub mod appresult;
pub mod auth;
pub mod config;
pub mod db;
pub mod res;
pub mod rooms;
pub mod uploads;

use std::sync::Arc;

use axum::{debug_handler, extract::FromRef, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult};
pub use config::Config;

use auth::CredentialService;
use db::MessageStore;
use rooms::RoomRegistry;
use uploads::BlobStore;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: MessageStore,
    pub blobs: BlobStore,
    pub credentials: Arc<CredentialService>,
    pub registry: Arc<RoomRegistry>,
}

impl AppState {
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            store: MessageStore::connect(&config.database_url).await?,
            blobs: BlobStore::open(&config.upload_dir).await?,
            credentials: Arc::new(CredentialService::new(&config.secret_key)),
            registry: Arc::new(RoomRegistry::new()),
        })
    }
}

#[debug_handler]
async fn ping() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// The whole service: JSON and websocket routes, uploads, and the frontend.
pub fn app(app_state: AppState, config: &Config) -> Router {
    let router = res::mount(api_router(), &app_state.blobs, &config.frontend_dir);

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))

        .merge(auth::router())
        .merge(rooms::router())
        .merge(uploads::router())
}
