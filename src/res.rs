use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;

use crate::{uploads::{BlobStore, UPLOADS_ROUTE}, AppState};

/// Serves stored uploads, and the prebuilt frontend for everything no
/// other route claims.
pub fn mount(router: Router<AppState>, blobs: &BlobStore, frontend_dir: &Path) -> Router<AppState> {
    let router = router.nest_service(UPLOADS_ROUTE, ServeDir::new(blobs.dir()));

    if frontend_dir.is_dir() {
        tracing::info!("serving frontend from {}", frontend_dir.display());
        router.fallback_service(ServeDir::new(frontend_dir).append_index_html_on_directories(true))
    } else {
        tracing::warn!("frontend not found at {}, serving the API only", frontend_dir.display());
        router
    }
}
