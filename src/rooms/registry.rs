use std::{collections::HashMap, fmt};

use axum::extract::ws::Utf8Bytes;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The registry's side of a session: where to push outbound frames.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    outbox: mpsc::UnboundedSender<Utf8Bytes>,
}

impl SessionHandle {
    /// Creates a handle and the receiving end its writer task drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Utf8Bytes>) {
        let (outbox, inbox) = mpsc::unbounded_channel();
        (Self { id: SessionId::new(), outbox }, inbox)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    fn send(&self, payload: Utf8Bytes) -> Result<(), SendFailure> {
        self.outbox.send(payload).map_err(|_| SendFailure(self.id))
    }
}

/// A session's writer is gone; it can't take any more frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session {0} is no longer receiving")]
pub struct SendFailure(pub SessionId);

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: Vec<SessionId>,
}

/// Which sessions are connected to which room.
///
/// Every room entry is locked on its own (through the map's shard locks),
/// and no lock is held while a payload travels to a socket: `broadcast`
/// only pushes into each session's unbounded outbox.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, HashMap<SessionId, SessionHandle>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, room_id: &str, session: SessionHandle) {
        self.rooms
            .entry(room_id.to_owned())
            .or_default()
            .insert(session.id, session);
    }

    /// Returns whether the session was a member. Drops the room once empty.
    pub fn leave(&self, room_id: &str, session: SessionId) -> bool {
        let removed = match self.rooms.get_mut(room_id) {
            Some(mut members) => members.remove(&session).is_some(),
            None => return false,
        };

        // re-checked under the entry lock, a racing join keeps the room alive
        self.rooms.remove_if(room_id, |_, members| members.is_empty());
        removed
    }

    pub fn broadcast(&self, room_id: &str, payload: Utf8Bytes) -> BroadcastReport {
        let members: Vec<SessionHandle> = match self.rooms.get(room_id) {
            Some(members) => members.values().cloned().collect(),
            None => return BroadcastReport::default(),
        };

        let mut report = BroadcastReport::default();
        for member in &members {
            match member.send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(SendFailure(id)) => report.dropped.push(id),
            }
        }

        for &id in &report.dropped {
            tracing::warn!(%room_id, session = %id, "dropping unreachable session");
            self.leave(room_id, id);
        }

        report
    }

    pub fn member_count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map_or(0, |members| members.len())
    }

    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
