mod msg;
mod new;
mod room;
mod ws;
pub mod registry;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub use new::NewRoom;
pub use registry::RoomRegistry;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(new::new_room))
        .route("/messages/{room_id}", get(room::history))
        .route("/ws/{room_id}", get(ws::room_ws))
}
