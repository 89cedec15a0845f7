use std::{path::{Path, PathBuf}, sync::Arc};

use axum::{debug_handler, extract::{DefaultBodyLimit, Multipart, State}, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::{fs, io::AsyncWriteExt};

use crate::{AppResult, AppState};

pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("expected a `file` field")]
    MissingFile,
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// Write-once file storage under a single directory, served back at `/uploads`.
#[derive(Clone)]
pub struct BlobStore {
    dir: Arc<Path>,
}

impl BlobStore {
    pub async fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir: dir.into() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stores `bytes` as `<16 hex>_<filename>` and returns its locator.
    pub async fn store(&self, filename: &str, bytes: &[u8]) -> std::io::Result<String> {
        let stored_name = format!("{:016x}_{}", rand::random::<u64>(), sanitize(filename));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.dir.join(&stored_name))
            .await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;

        Ok(format!("{UPLOADS_ROUTE}/{stored_name}"))
    }
}

// `?`, `#` and `%` would cut or garble the locator's path
fn sanitize(filename: &str) -> String {
    filename
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty() && *part != "." && *part != "..")
        .unwrap_or("file")
        .replace(['?', '#', '%'], "_")
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Uploaded {
    pub url: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn upload(
    State(blobs): State<BlobStore>,
    mut multipart: Multipart,
) -> AppResult<Json<Uploaded>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;
        let url = blobs.store(&filename, &bytes).await?;
        tracing::debug!(%url, size = bytes.len(), "stored upload");

        return Ok(Json(Uploaded { url }));
    }

    Err(UploadError::MissingFile.into())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload).layer(DefaultBodyLimit::disable()))
}
