//! Event types flowing between the transport, the session core, and the
//! rendering collaborator.

use crate::chunks::ArtifactHandle;
use crate::protocol::ServerMsg;

/// Inbound units after the dispatcher has classified a transport frame.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// Structured control message
    Control(ServerMsg),
    /// One raw fragment of synthesized reply audio
    Audio(Vec<u8>),
    /// Transport signalled close
    Closed,
}

/// Outbound units handed to the websocket writer task.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Raw 16-bit LE mono 16 kHz PCM frame
    Audio(Vec<u8>),
    /// Textual end-of-utterance sentinel
    EndOfUtterance,
}

/// Change notifications emitted by the session core on every mutation.
///
/// The rendering collaborator consumes these and calls back into the core
/// only via `Session::toggle_text`.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Server acknowledged the session
    Connected { session_id: String },
    /// User finished speaking; a turn exists with placeholder user text
    UserTurnStarted { turn_id: u64 },
    /// Transcript refined the user's utterance
    UserTextUpdated { turn_id: u64, text: String },
    /// Reply generation started (renderer shows its loading state)
    ReplyStarted {
        turn_id: u64,
        intent: Option<String>,
    },
    /// Reply text grew; content stays hidden until an explicit reveal
    ReplyTextBuffered { turn_id: u64, buffered_bytes: usize },
    /// A new artifact snapshot was published (the old handle is already
    /// revoked)
    ArtifactUpdated {
        turn_id: u64,
        handle: ArtifactHandle,
        size: usize,
        complete: bool,
    },
    /// Quiet period elapsed: the artifact is final and playable
    AudioComplete {
        turn_id: u64,
        handle: ArtifactHandle,
        size: usize,
        has_text: bool,
    },
    /// Buffered reply text was revealed or hidden on user request
    TextVisibility {
        turn_id: u64,
        visible: bool,
        text: Option<String>,
    },
    /// Server-reported failure; partial buffers are retained
    ServerError { message: String },
    /// Session torn down
    Disconnected,
}
