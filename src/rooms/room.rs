use axum::{debug_handler, extract::{Path, State}, Json};

use crate::{db::{Message, MessageStore, HISTORY_LIMIT}, AppResult, AppState};

#[debug_handler(state = AppState)]
pub(crate) async fn history(
    State(store): State<MessageStore>,
    Path(room_id): Path<String>,
) -> AppResult<Json<Vec<Message>>> {
    Ok(Json(store.list(&room_id, HISTORY_LIMIT).await?))
}
