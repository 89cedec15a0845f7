mod accept;
mod invite;

use axum::{routing::post, Router};

use crate::AppState;

pub use accept::AcceptedInvite;
pub use invite::{CredentialError, CredentialService, DEFAULT_INVITE_TTL};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accept-invite", post(accept::accept_invite))
}
