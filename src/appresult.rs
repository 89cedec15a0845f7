use axum::{extract::multipart::MultipartError, http::StatusCode, response::{IntoResponse, Response}};

use crate::{auth::CredentialError, uploads::UploadError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<CredentialError>() {
            err.status()
        } else if let Some(err) = self.0.downcast_ref::<UploadError>() {
            err.status()
        } else if let Some(err) = self.0.downcast_ref::<MultipartError>() {
            err.status()
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {:?}", self.0);
        }

        (status, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
