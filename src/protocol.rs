//! Wire protocol for the voice session socket.
//!
//! The server interleaves JSON control messages (one `type` tag plus a
//! type-specific payload) with raw binary frames carrying synthesized reply
//! audio. Classification is by transport frame type, never by content:
//! text frames are control, binary frames are audio.

use crate::events::Inbound;
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

/// Textual sentinel the client sends to mark end-of-utterance.
pub const END_OF_UTTERANCE: &str = "END";

/// Structured control messages sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Session established
    Connected {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    /// Refined transcript of the user's utterance
    Transcript { text: String },
    /// Intent classified; the reply stream starts now
    Intent { value: String },
    /// Incremental reply text delta
    TextChunk {
        #[serde(default)]
        text: String,
    },
    /// Generation finished; audio may still trail
    Complete,
    /// Server-side failure
    Error { message: String },
}

/// Demultiplex one transport frame into an inbound unit.
///
/// Malformed control payloads and unknown `type` values are logged and
/// dropped so new server message types never abort the session.
pub fn classify(frame: Message) -> Option<Inbound> {
    match frame {
        Message::Text(text) => match serde_json::from_str::<ServerMsg>(text.as_str()) {
            Ok(msg) => Some(Inbound::Control(msg)),
            Err(e) => {
                match serde_json::from_str::<serde_json::Value>(text.as_str()) {
                    Ok(value) => warn!(
                        "ignoring control message of type {:?}: {}",
                        value.get("type").and_then(|t| t.as_str()),
                        e
                    ),
                    Err(_) => warn!("malformed control payload: {}", e),
                }
                None
            }
        },
        Message::Binary(bytes) => Some(Inbound::Audio(bytes.to_vec())),
        Message::Close(frame) => {
            debug!("close frame received: {:?}", frame);
            Some(Inbound::Closed)
        }
        // ping/pong are the transport's concern
        _ => None,
    }
}
