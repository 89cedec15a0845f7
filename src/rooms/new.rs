use std::sync::Arc;

use axum::{debug_handler, extract::State, Json};
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::{auth::{CredentialService, DEFAULT_INVITE_TTL}, AppResult, AppState};

const ROOM_ID_LEN: usize = 11;

#[derive(Debug, Deserialize)]
pub(crate) struct NewRoomBody {
    title: String,
    creator_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewRoom {
    pub room_id: String,
    pub invite_url: String,
    pub title: String,
    pub creator: String,
}

pub(crate) fn new_room_id() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(ROOM_ID_LEN)
        .map(char::from)
        .collect()
}

/// Rooms aren't stored anywhere; creating one just mints an id and an invite for it.
#[debug_handler(state = AppState)]
pub(crate) async fn new_room(
    State(credentials): State<Arc<CredentialService>>,
    Json(NewRoomBody { title, creator_name }): Json<NewRoomBody>,
) -> AppResult<Json<NewRoom>> {
    let room_id = new_room_id();
    let token = credentials.issue(&room_id, DEFAULT_INVITE_TTL)?;
    tracing::info!(%room_id, %title, creator = %creator_name, "room created");

    Ok(Json(NewRoom {
        invite_url: format!("/accept?room={room_id}&invite={token}"),
        room_id,
        title,
        creator: creator_name,
    }))
}
