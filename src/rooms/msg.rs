use serde_json::Value;

use crate::db::{Message, MessageStore, NewMessage};

use super::registry::{BroadcastReport, RoomRegistry};

pub(crate) const UNKNOWN_SENDER: &str = "unknown";

/// What a client may put in a frame. Every field is optional, and any
/// JSON type is tolerated; `into_draft` applies the defaults.
#[derive(Debug)]
pub(crate) struct IncomingFrame {
    name: Option<Value>,
    text: Option<Value>,
    attachment_url: Option<Value>,
}

impl IncomingFrame {
    /// Anything that isn't a JSON object is taken as plain text.
    pub(crate) fn parse(raw: &str) -> NewMessage {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(mut fields)) => IncomingFrame {
                name: fields.remove("name"),
                text: fields.remove("text"),
                attachment_url: fields.remove("attachment_url"),
            }.into_draft(),
            parsed => {
                if let Err(err) = parsed {
                    tracing::debug!("plain text frame: {err}");
                }
                NewMessage {
                    name: UNKNOWN_SENDER.to_owned(),
                    text: raw.to_owned(),
                    attachment_url: None,
                }
            }
        }
    }

    fn into_draft(self) -> NewMessage {
        NewMessage {
            name: present(self.name).unwrap_or_else(|| UNKNOWN_SENDER.to_owned()),
            text: present(self.text).unwrap_or_default(),
            attachment_url: present(self.attachment_url),
        }
    }
}

// null, false, 0, "", [] and {} all count as missing
fn present(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Persists one frame from `room_id` and fans the stored record out to the
/// room. The broadcast only starts once the insert has completed.
pub(crate) async fn send_msg(
    store: &MessageStore,
    registry: &RoomRegistry,
    room_id: &str,
    raw: &str,
) -> anyhow::Result<(Message, BroadcastReport)> {
    let msg = store.append(room_id, IncomingFrame::parse(raw)).await?;
    let payload = serde_json::to_string(&msg)?;

    let report = registry.broadcast(room_id, payload.into());
    tracing::debug!(%room_id, id = msg.id, delivered = report.delivered, "message broadcast");

    Ok((msg, report))
}
