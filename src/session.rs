//! Session and turn state machine.
//!
//! The session is the single owner of all turn-scoped state. Every inbound
//! control message, audio fragment, quiet-period expiry, and user action
//! funnels through `&mut self` methods that return change notifications for
//! the rendering collaborator, so no two mutations can interleave and no
//! locks are needed. Text and audio arrive independently and in unspecified
//! relative order; neither path assumes the other ran first.

use crate::chunks::{ArtifactHandle, ChunkAccumulator, HandleRegistry};
use crate::completion::{CompletionDetector, QUIET_PERIOD};
use crate::events::{Inbound, SessionEvent};
use crate::protocol::ServerMsg;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Session phase. `transition` is the only writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No reply in flight
    Idle,
    /// User finished speaking, server is transcribing
    AwaitingTranscript,
    /// Reply text and/or audio chunks arriving
    RepliesStreaming,
    /// Generation logically complete, audio may still trail
    RepliesFinalizing,
}

/// One user-utterance / assistant-reply cycle.
///
/// Replaced by value on hard reset so partially-reset state is never
/// observable.
#[derive(Debug)]
struct Turn {
    id: u64,
    user_text: Option<String>,
    /// Append-only within the turn; buffered, not revealed, until the
    /// artifact is complete and the user asks for it
    reply_text: String,
    chunks: ChunkAccumulator,
    /// Monotonic within the turn: never true -> false except by hard reset
    audio_complete: bool,
    text_visible: bool,
    /// Currently published artifact, revoked before every replacement
    artifact: Option<ArtifactHandle>,
}

impl Turn {
    fn new(id: u64) -> Self {
        Self {
            id,
            user_text: None,
            reply_text: String::new(),
            chunks: ChunkAccumulator::new(),
            audio_complete: false,
            text_visible: false,
            artifact: None,
        }
    }
}

/// Consumer-facing snapshot of the current turn: the artifact handle, its
/// completion state, and the reply text only while revealed.
#[derive(Debug, Clone)]
pub struct TurnView {
    pub turn_id: u64,
    pub user_text: Option<String>,
    pub artifact: Option<ArtifactHandle>,
    pub artifact_size: usize,
    pub is_complete: bool,
    pub revealed_text: Option<String>,
}

pub struct Session {
    active: bool,
    session_id: Option<String>,
    phase: Phase,
    turn: Option<Turn>,
    next_turn_id: u64,
    detector: CompletionDetector,
    registry: HandleRegistry,
}

impl Session {
    pub fn new() -> Self {
        Self::with_quiet_period(QUIET_PERIOD)
    }

    pub fn with_quiet_period(quiet: Duration) -> Self {
        Self {
            active: false,
            session_id: None,
            phase: Phase::Idle,
            turn: None,
            next_turn_id: 0,
            detector: CompletionDetector::new(quiet),
            registry: HandleRegistry::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Next quiet-period deadline, if one is pending. The driver sleeps
    /// until this and then calls `on_quiet_elapsed`.
    pub fn deadline(&self) -> Option<Instant> {
        self.detector.deadline()
    }

    /// Resolve a live artifact handle to its bytes.
    pub fn artifact_bytes(&self, handle: ArtifactHandle) -> Option<Arc<[u8]>> {
        self.registry.bytes(handle)
    }

    /// Number of artifact handles not yet revoked.
    pub fn live_artifacts(&self) -> usize {
        self.registry.live_count()
    }

    pub fn view(&self) -> Option<TurnView> {
        self.turn.as_ref().map(|turn| TurnView {
            turn_id: turn.id,
            user_text: turn.user_text.clone(),
            artifact: turn.artifact,
            artifact_size: turn.chunks.total_len(),
            is_complete: turn.audio_complete,
            revealed_text: if turn.text_visible {
                Some(turn.reply_text.clone())
            } else {
                None
            },
        })
    }

    fn transition(&mut self, next: Phase) {
        if self.phase != next {
            debug!("session phase {:?} -> {:?}", self.phase, next);
            self.phase = next;
        }
    }

    fn alloc_turn_id(&mut self) -> u64 {
        let id = self.next_turn_id;
        self.next_turn_id += 1;
        id
    }

    /// Drop the current turn, revoking its published artifact first.
    fn discard_turn(&mut self) {
        if let Some(mut turn) = self.turn.take() {
            if let Some(handle) = turn.artifact.take() {
                self.registry.release(handle);
            }
        }
    }

    /// Local end-of-speech signal: materialize the next turn with
    /// placeholder user text, superseding the previous one.
    pub fn end_of_speech(&mut self) -> Vec<SessionEvent> {
        if self.phase != Phase::Idle {
            warn!("end of speech ignored in phase {:?}", self.phase);
            return vec![];
        }
        self.detector.cancel();
        self.discard_turn();
        let id = self.alloc_turn_id();
        self.turn = Some(Turn::new(id));
        self.transition(Phase::AwaitingTranscript);
        info!("🎤 turn {} awaiting transcript", id);
        vec![SessionEvent::UserTurnStarted { turn_id: id }]
    }

    /// Process one classified inbound unit.
    pub fn handle(&mut self, inbound: Inbound, now: Instant) -> Vec<SessionEvent> {
        match inbound {
            Inbound::Control(msg) => self.handle_control(msg, now),
            Inbound::Audio(bytes) => self.handle_audio(bytes, now),
            Inbound::Closed => self.close(),
        }
    }

    fn handle_control(&mut self, msg: ServerMsg, now: Instant) -> Vec<SessionEvent> {
        match msg {
            ServerMsg::Connected { session_id } => {
                info!("✓ session {} active", session_id);
                self.active = true;
                self.session_id = Some(session_id.clone());
                vec![SessionEvent::Connected { session_id }]
            }
            ServerMsg::Transcript { text } => {
                if let Some(turn) = self.turn.as_mut() {
                    info!("📝 transcript for turn {}: {}", turn.id, text);
                    turn.user_text = Some(text.clone());
                    vec![SessionEvent::UserTextUpdated {
                        turn_id: turn.id,
                        text,
                    }]
                } else {
                    debug!("transcript with no current turn, ignored");
                    vec![]
                }
            }
            ServerMsg::Intent { value } => self.hard_reset(Some(value)),
            ServerMsg::TextChunk { text } => {
                if text.is_empty() {
                    return vec![];
                }
                let mut events = Vec::new();
                self.ensure_streaming_turn(&mut events);
                if let Some(turn) = self.turn.as_mut() {
                    turn.reply_text.push_str(&text);
                    debug!(
                        "buffered reply text for turn {} ({} bytes, hidden until reveal)",
                        turn.id,
                        turn.reply_text.len()
                    );
                    events.push(SessionEvent::ReplyTextBuffered {
                        turn_id: turn.id,
                        buffered_bytes: turn.reply_text.len(),
                    });
                }
                events
            }
            ServerMsg::Complete => self.handle_complete(now),
            ServerMsg::Error { message } => {
                // Partial buffers are kept on purpose: whatever already
                // arrived stays inspectable. The phase does return to
                // idle so the next utterance can start.
                warn!("❌ server error: {}", message);
                self.transition(Phase::Idle);
                vec![SessionEvent::ServerError { message }]
            }
        }
    }

    /// The one destructive transition: discard the previous reply's buffers,
    /// cancel any pending completion, and enter the streaming phase. The
    /// turn is replaced by value, not mutated field-by-field.
    fn hard_reset(&mut self, intent: Option<String>) -> Vec<SessionEvent> {
        self.detector.cancel();
        let replacement = match self.turn.take() {
            // reply to the utterance we were waiting on: keep its identity
            Some(mut prev) if self.phase == Phase::AwaitingTranscript => {
                if let Some(handle) = prev.artifact.take() {
                    self.registry.release(handle);
                }
                let mut turn = Turn::new(prev.id);
                turn.user_text = prev.user_text.take();
                turn
            }
            // the next turn's reply started before the previous one was
            // confirmed finished: the old buffers are discarded entirely
            prev => {
                if let Some(mut prev) = prev {
                    if let Some(handle) = prev.artifact.take() {
                        self.registry.release(handle);
                    }
                }
                Turn::new(self.alloc_turn_id())
            }
        };
        let id = replacement.id;
        self.turn = Some(replacement);
        self.transition(Phase::RepliesStreaming);
        info!("🔄 reply buffers reset, streaming turn {}", id);
        vec![SessionEvent::ReplyStarted {
            turn_id: id,
            intent,
        }]
    }

    /// Fallback materialization: reply data arriving with no turn-start
    /// control message still gets a turn to land in.
    fn ensure_streaming_turn(&mut self, events: &mut Vec<SessionEvent>) {
        if self.turn.is_none() {
            let id = self.alloc_turn_id();
            warn!("reply data before intent, materializing turn {}", id);
            self.turn = Some(Turn::new(id));
            self.transition(Phase::RepliesStreaming);
            events.push(SessionEvent::ReplyStarted {
                turn_id: id,
                intent: None,
            });
        } else if matches!(self.phase, Phase::Idle | Phase::AwaitingTranscript)
            && !self.turn.as_ref().is_some_and(|t| t.audio_complete)
        {
            // a trailing chunk on a completed turn must not reopen the phase
            self.transition(Phase::RepliesStreaming);
        }
    }

    fn handle_audio(&mut self, bytes: Vec<u8>, now: Instant) -> Vec<SessionEvent> {
        if bytes.is_empty() {
            warn!("⚠️ empty audio frame, ignored");
            return vec![];
        }
        let mut events = Vec::new();
        self.ensure_streaming_turn(&mut events);
        if let Some(turn) = self.turn.as_mut() {
            let len = bytes.len();
            if !turn.chunks.append(bytes) {
                return events;
            }
            // the quiet window restarts from this chunk; if completion was
            // already declared the eventual fire is a no-op
            self.detector.arm(now);
            let snapshot = turn.chunks.snapshot();
            let size = snapshot.len();
            if let Some(old) = turn.artifact.take() {
                self.registry.release(old);
            }
            let handle = self.registry.publish(snapshot);
            turn.artifact = Some(handle);
            info!(
                "🔊 audio chunk: {} bytes (turn {}: {} chunks, {} bytes total)",
                len,
                turn.id,
                turn.chunks.chunk_count(),
                size
            );
            events.push(SessionEvent::ArtifactUpdated {
                turn_id: turn.id,
                handle,
                size,
                complete: turn.audio_complete,
            });
        }
        events
    }

    fn handle_complete(&mut self, now: Instant) -> Vec<SessionEvent> {
        if self.phase == Phase::RepliesStreaming {
            self.transition(Phase::RepliesFinalizing);
        } else {
            debug!("complete received in phase {:?}", self.phase);
        }
        let mut events = Vec::new();
        let has_chunks = self
            .turn
            .as_ref()
            .is_some_and(|turn| !turn.chunks.is_empty());
        if let Some(turn) = self.turn.as_mut() {
            info!(
                "✓ generation complete for turn {}, waiting for trailing audio",
                turn.id
            );
            if !turn.chunks.is_empty() {
                // provisional snapshot so a playable-once-confirmed message
                // can be shown right away
                let snapshot = turn.chunks.snapshot();
                let size = snapshot.len();
                if let Some(old) = turn.artifact.take() {
                    self.registry.release(old);
                }
                let handle = self.registry.publish(snapshot);
                turn.artifact = Some(handle);
                events.push(SessionEvent::ArtifactUpdated {
                    turn_id: turn.id,
                    handle,
                    size,
                    complete: turn.audio_complete,
                });
                // the quiet window keeps counting from the last chunk, not
                // from this message
                if !self.detector.is_pending() && !turn.audio_complete {
                    self.detector.arm(now);
                }
            }
        }
        if !has_chunks {
            // text-only reply: no trailing audio to wait for, the next
            // utterance can start right away
            self.transition(Phase::Idle);
        }
        events
    }

    /// Called by the driver once the detector deadline has passed. Firing is
    /// idempotent: without chunks, or with completion already confirmed,
    /// this is a no-op, so a stale wakeup is harmless.
    pub fn on_quiet_elapsed(&mut self, now: Instant) -> Vec<SessionEvent> {
        if !self.detector.poll(now) {
            return vec![];
        }
        let mut events = Vec::new();
        if let Some(turn) = self.turn.as_mut() {
            if turn.audio_complete || turn.chunks.is_empty() {
                return events;
            }
            turn.audio_complete = true;
            let snapshot = turn.chunks.snapshot();
            let size = snapshot.len();
            if let Some(old) = turn.artifact.take() {
                self.registry.release(old);
            }
            let handle = self.registry.publish(snapshot);
            turn.artifact = Some(handle);
            info!("✓ audio complete for turn {} ({} bytes)", turn.id, size);
            events.push(SessionEvent::AudioComplete {
                turn_id: turn.id,
                handle,
                size,
                has_text: !turn.reply_text.is_empty(),
            });
        }
        if !events.is_empty()
            && matches!(
                self.phase,
                Phase::RepliesStreaming | Phase::RepliesFinalizing
            )
        {
            // soft transition: the turn stays addressable for replay and
            // reveal until it is superseded
            self.transition(Phase::Idle);
        }
        events
    }

    /// Reveal or hide the buffered reply text. Only meaningful once the
    /// audio artifact is confirmed complete and text exists.
    pub fn toggle_text(&mut self, turn_id: u64) -> Vec<SessionEvent> {
        if let Some(turn) = self.turn.as_mut() {
            if turn.id != turn_id {
                debug!("toggle_text for stale turn {}, ignored", turn_id);
                return vec![];
            }
            if !turn.audio_complete || turn.reply_text.is_empty() {
                debug!("toggle_text before audio completion, ignored");
                return vec![];
            }
            turn.text_visible = !turn.text_visible;
            let text = if turn.text_visible {
                Some(turn.reply_text.clone())
            } else {
                None
            };
            return vec![SessionEvent::TextVisibility {
                turn_id,
                visible: turn.text_visible,
                text,
            }];
        }
        vec![]
    }

    /// Tear the session down: explicit end or connection loss. Forces
    /// `Idle`, cancels any pending completion, and releases every artifact
    /// handle exactly once.
    pub fn close(&mut self) -> Vec<SessionEvent> {
        self.detector.cancel();
        self.discard_turn();
        self.transition(Phase::Idle);
        if !self.active {
            return vec![];
        }
        self.active = false;
        info!("session closed");
        vec![SessionEvent::Disconnected]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected() -> Inbound {
        Inbound::Control(ServerMsg::Connected {
            session_id: "s1".to_string(),
        })
    }

    fn intent() -> Inbound {
        Inbound::Control(ServerMsg::Intent {
            value: "chat".to_string(),
        })
    }

    fn transcript(text: &str) -> Inbound {
        Inbound::Control(ServerMsg::Transcript {
            text: text.to_string(),
        })
    }

    fn text(delta: &str) -> Inbound {
        Inbound::Control(ServerMsg::TextChunk {
            text: delta.to_string(),
        })
    }

    fn complete() -> Inbound {
        Inbound::Control(ServerMsg::Complete)
    }

    fn chunk(len: usize) -> Inbound {
        Inbound::Audio(vec![0xAA; len])
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn completion_fires_once_measured_from_last_chunk() {
        let mut session = Session::new();
        let t0 = Instant::now();
        session.handle(intent(), t0);
        session.handle(chunk(100), t0);
        session.handle(chunk(250), t0 + ms(500));
        session.handle(chunk(80), t0 + ms(1000));
        session.handle(complete(), t0 + ms(1200));

        // the quiet window counts from the last chunk, not from `complete`
        assert_eq!(session.deadline(), Some(t0 + ms(1000) + ms(3000)));
        assert!(session.on_quiet_elapsed(t0 + ms(3900)).is_empty());

        let events = session.on_quiet_elapsed(t0 + ms(4000));
        assert_eq!(events.len(), 1);
        match &events[0] {
            SessionEvent::AudioComplete { size, .. } => assert_eq!(*size, 430),
            other => panic!("unexpected event: {:?}", other),
        }
        let view = session.view().unwrap();
        assert!(view.is_complete);
        assert_eq!(view.artifact_size, 430);
        assert_eq!(session.phase(), Phase::Idle);

        // exactly one completion notification, ever
        assert!(session.on_quiet_elapsed(t0 + ms(60_000)).is_empty());
    }

    #[test]
    fn hard_reset_discards_previous_buffers_and_pending_fire() {
        let mut session = Session::new();
        let t0 = Instant::now();
        session.handle(intent(), t0);
        session.handle(chunk(50), t0);
        assert_eq!(session.view().unwrap().artifact_size, 50);
        assert!(session.deadline().is_some());

        // second reply starts 200ms later, inside the quiet window
        let events = session.handle(intent(), t0 + ms(200));
        assert!(matches!(events[0], SessionEvent::ReplyStarted { .. }));
        assert_eq!(session.view().unwrap().artifact_size, 0);
        assert!(session.deadline().is_none());
        // the superseded artifact handle was revoked
        assert_eq!(session.live_artifacts(), 0);

        // no completion for the first turn ever fires
        assert!(session.on_quiet_elapsed(t0 + ms(10_000)).is_empty());
        assert!(!session.view().unwrap().is_complete);
    }

    #[test]
    fn text_before_intent_materializes_a_turn_and_stays_hidden() {
        let mut session = Session::new();
        let t0 = Instant::now();
        let events = session.handle(text("Hello"), t0);
        assert!(matches!(
            events[0],
            SessionEvent::ReplyStarted { intent: None, .. }
        ));
        session.handle(text(" world"), t0);

        let view = session.view().unwrap();
        let turn_id = view.turn_id;
        assert!(view.revealed_text.is_none());

        // reveal is refused before the audio artifact is confirmed complete
        assert!(session.toggle_text(turn_id).is_empty());

        session.handle(chunk(10), t0);
        session.on_quiet_elapsed(t0 + ms(3000));
        let events = session.toggle_text(turn_id);
        match &events[0] {
            SessionEvent::TextVisibility {
                visible: true,
                text: Some(text),
                ..
            } => assert_eq!(text, "Hello world"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn toggle_twice_round_trips_to_hidden() {
        let mut session = Session::new();
        let t0 = Instant::now();
        session.handle(intent(), t0);
        session.handle(text("answer"), t0);
        session.handle(chunk(10), t0);
        session.on_quiet_elapsed(t0 + ms(3000));

        let turn_id = session.view().unwrap().turn_id;
        session.toggle_text(turn_id);
        assert_eq!(
            session.view().unwrap().revealed_text.as_deref(),
            Some("answer")
        );

        let events = session.toggle_text(turn_id);
        assert!(matches!(
            events[0],
            SessionEvent::TextVisibility {
                visible: false,
                text: None,
                ..
            }
        ));
        assert!(session.view().unwrap().revealed_text.is_none());

        // buffered text is unchanged by the round trip
        session.toggle_text(turn_id);
        assert_eq!(
            session.view().unwrap().revealed_text.as_deref(),
            Some("answer")
        );
    }

    #[test]
    fn audio_complete_is_monotonic_within_a_turn() {
        let mut session = Session::new();
        let t0 = Instant::now();
        session.handle(intent(), t0);
        session.handle(chunk(100), t0);
        session.on_quiet_elapsed(t0 + ms(3000));
        assert!(session.view().unwrap().is_complete);

        // a late chunk after the window cannot un-declare completion
        let events = session.handle(chunk(20), t0 + ms(3500));
        match &events[0] {
            SessionEvent::ArtifactUpdated { size, complete, .. } => {
                assert_eq!(*size, 120);
                assert!(*complete);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(session.view().unwrap().is_complete);
        // the re-armed window fires as a no-op
        assert!(session.on_quiet_elapsed(t0 + ms(6500)).is_empty());

        // the trailing chunk did not reopen the turn: the next utterance
        // can still start
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.end_of_speech().is_empty());
    }

    #[test]
    fn empty_audio_frame_changes_nothing() {
        let mut session = Session::new();
        let t0 = Instant::now();
        assert!(session.handle(chunk(0), t0).is_empty());
        assert!(session.view().is_none());
        assert!(session.deadline().is_none());
    }

    #[test]
    fn server_error_keeps_partial_buffers() {
        let mut session = Session::new();
        let t0 = Instant::now();
        session.handle(intent(), t0);
        session.handle(text("partial"), t0);
        session.handle(chunk(100), t0);

        let events = session.handle(
            Inbound::Control(ServerMsg::Error {
                message: "tts failed".to_string(),
            }),
            t0,
        );
        assert!(matches!(events[0], SessionEvent::ServerError { .. }));
        assert_eq!(session.view().unwrap().artifact_size, 100);
    }

    #[test]
    fn server_error_reenables_input() {
        let mut session = Session::new();
        let t0 = Instant::now();
        session.handle(intent(), t0);
        session.handle(chunk(100), t0);
        session.handle(
            Inbound::Control(ServerMsg::Error {
                message: "tts failed".to_string(),
            }),
            t0 + ms(100),
        );
        assert_eq!(session.phase(), Phase::Idle);

        // the next utterance starts normally and supersedes the failed turn
        let events = session.end_of_speech();
        assert!(matches!(events[0], SessionEvent::UserTurnStarted { .. }));
        assert_eq!(session.phase(), Phase::AwaitingTranscript);
        assert_eq!(session.live_artifacts(), 0);
    }

    #[test]
    fn text_only_reply_returns_to_idle() {
        let mut session = Session::new();
        let t0 = Instant::now();
        session.handle(intent(), t0);
        session.handle(text("all done"), t0);
        session.handle(complete(), t0 + ms(100));

        // nothing to wait for: no quiet window is armed
        assert!(session.deadline().is_none());
        assert_eq!(session.phase(), Phase::Idle);

        let events = session.end_of_speech();
        assert!(matches!(events[0], SessionEvent::UserTurnStarted { .. }));
    }

    #[test]
    fn transcript_refines_user_text_in_place() {
        let mut session = Session::new();
        let t0 = Instant::now();
        let events = session.end_of_speech();
        assert!(matches!(events[0], SessionEvent::UserTurnStarted { .. }));
        assert_eq!(session.phase(), Phase::AwaitingTranscript);

        session.handle(transcript("turn on the lights"), t0);
        assert_eq!(
            session.view().unwrap().user_text.as_deref(),
            Some("turn on the lights")
        );
        assert_eq!(session.phase(), Phase::AwaitingTranscript);

        // the reply to this utterance keeps the turn's identity
        let turn_id = session.view().unwrap().turn_id;
        session.handle(intent(), t0);
        let view = session.view().unwrap();
        assert_eq!(view.turn_id, turn_id);
        assert_eq!(view.user_text.as_deref(), Some("turn on the lights"));
    }

    #[test]
    fn end_of_speech_is_only_accepted_when_idle() {
        let mut session = Session::new();
        let t0 = Instant::now();
        session.handle(intent(), t0);
        assert!(session.end_of_speech().is_empty());
        assert_eq!(session.phase(), Phase::RepliesStreaming);
    }

    #[test]
    fn artifact_handles_are_released_on_supersede_and_close() {
        let mut session = Session::new();
        let t0 = Instant::now();
        session.handle(connected(), t0);
        session.handle(intent(), t0);
        session.handle(chunk(10), t0);
        session.handle(chunk(10), t0 + ms(100));
        // republish revokes the previous handle, so only one stays live
        assert_eq!(session.live_artifacts(), 1);

        session.handle(intent(), t0 + ms(200));
        assert_eq!(session.live_artifacts(), 0);

        session.handle(chunk(10), t0 + ms(300));
        assert_eq!(session.live_artifacts(), 1);

        let events = session.close();
        assert!(matches!(events[0], SessionEvent::Disconnected));
        assert_eq!(session.live_artifacts(), 0);
        assert!(session.view().is_none());
        assert!(!session.is_active());
        assert!(session.deadline().is_none());
    }

    #[test]
    fn completed_turn_is_superseded_by_next_utterance() {
        let mut session = Session::new();
        let t0 = Instant::now();
        session.handle(intent(), t0);
        session.handle(chunk(42), t0);
        session.on_quiet_elapsed(t0 + ms(3000));
        let first = session.view().unwrap().turn_id;
        assert_eq!(session.live_artifacts(), 1);

        // the finished turn stays addressable until the user speaks again
        let events = session.end_of_speech();
        assert!(matches!(events[0], SessionEvent::UserTurnStarted { .. }));
        let second = session.view().unwrap().turn_id;
        assert_ne!(first, second);
        assert_eq!(session.live_artifacts(), 0);
    }

    #[test]
    fn artifact_bytes_resolve_for_the_live_handle_only() {
        let mut session = Session::new();
        let t0 = Instant::now();
        session.handle(intent(), t0);
        session.handle(Inbound::Audio(vec![1, 2, 3]), t0);
        let stale = session.view().unwrap().artifact.unwrap();
        session.handle(Inbound::Audio(vec![4, 5]), t0 + ms(100));
        let live = session.view().unwrap().artifact.unwrap();

        assert!(session.artifact_bytes(stale).is_none());
        assert_eq!(
            session.artifact_bytes(live).as_deref(),
            Some(&[1, 2, 3, 4, 5][..])
        );
    }
}
