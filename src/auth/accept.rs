use std::sync::Arc;

use axum::{debug_handler, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{AppResult, AppState};

use super::CredentialService;

#[derive(Deserialize)]
pub(crate) struct AcceptInviteBody {
    token: String,
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptedInvite {
    pub room_id: String,
    pub name: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn accept_invite(
    State(credentials): State<Arc<CredentialService>>,
    Json(AcceptInviteBody { token, name }): Json<AcceptInviteBody>,
) -> AppResult<Json<AcceptedInvite>> {
    let room_id = credentials.validate(&token)?;
    tracing::debug!(%room_id, %name, "invite accepted");

    Ok(Json(AcceptedInvite { room_id, name }))
}
