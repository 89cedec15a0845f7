use std::sync::Arc;

use axum::{debug_handler, extract::{ws::{Message as Frame, WebSocket}, Path, State, WebSocketUpgrade}, response::IntoResponse};
use futures_util::{SinkExt, StreamExt};

use crate::{db::MessageStore, AppState};

use super::{msg, registry::{RoomRegistry, SessionHandle, SessionId}};

#[debug_handler(state = AppState)]
pub(crate) async fn room_ws(
    Path(room_id): Path<String>,
    State(store): State<MessageStore>,
    State(registry): State<Arc<RoomRegistry>>,

    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_session(socket, room_id, store, registry))
}

/// Takes the session out of its room when dropped, so every way out of
/// `run_session` (close, error, cancellation, panic) deregisters it.
struct Membership {
    registry: Arc<RoomRegistry>,
    room_id: String,
    session_id: SessionId,
}

impl Drop for Membership {
    fn drop(&mut self) {
        if self.registry.leave(&self.room_id, self.session_id) {
            tracing::debug!(room_id = %self.room_id, session = %self.session_id, "session left");
        }
    }
}

async fn run_session(socket: WebSocket, room_id: String, store: MessageStore, registry: Arc<RoomRegistry>) {
    let (mut sender, mut receiver) = socket.split();
    let (session, mut outbox) = SessionHandle::new();
    let session_id = session.id();

    registry.join(&room_id, session);
    let membership = Membership { registry: registry.clone(), room_id: room_id.clone(), session_id };
    tracing::debug!(%room_id, session = %session_id, "session joined");

    // ends by itself once the registry lets go of the session's handle
    let writer = tokio::spawn(async move {
        while let Some(payload) = outbox.recv().await {
            if sender.send(Frame::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        let raw = match frame {
            Ok(Frame::Text(text)) => text.as_str().to_owned(),
            Ok(Frame::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Frame::Ping(_) | Frame::Pong(_)) => continue,
            Ok(Frame::Close(_)) => break,
            Err(err) => {
                tracing::debug!(%room_id, session = %session_id, "receive failed: {err}");
                break;
            }
        };

        if let Err(err) = msg::send_msg(&store, &registry, &room_id, &raw).await {
            tracing::error!(%room_id, session = %session_id, "closing session: {err:?}");
            break;
        }
    }

    drop(membership);
    writer.abort();
}
