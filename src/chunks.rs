//! Audio chunk accumulation and artifact publication.
//!
//! Reply audio arrives as unframed binary fragments in transport order, with
//! no reordering attempted and no per-frame header. The accumulator keeps
//! every non-empty fragment; an artifact is an immutable concatenation built
//! on demand, republished on every arrival so a best-effort playable preview
//! exists before completion is confirmed.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Growing set of audio fragments for the current turn.
#[derive(Debug, Default)]
pub struct ChunkAccumulator {
    chunks: Vec<Vec<u8>>,
    total_len: usize,
}

impl ChunkAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fragment in arrival order. Previously appended chunks are
    /// never mutated or dropped. Empty frames are rejected and logged, not
    /// stored; returns whether the chunk was kept.
    pub fn append(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            warn!("rejecting empty audio frame");
            return false;
        }
        self.total_len += chunk.len();
        self.chunks.push(chunk);
        debug!(
            "accumulated audio chunk ({} chunks, {} bytes total)",
            self.chunks.len(),
            self.total_len
        );
        true
    }

    /// Immutable concatenation of all chunks in arrival order.
    ///
    /// The snapshot length must equal the sum of appended chunk lengths;
    /// anything else is a programming error, not a recoverable condition.
    pub fn snapshot(&self) -> Arc<[u8]> {
        let mut combined = Vec::with_capacity(self.total_len);
        for chunk in &self.chunks {
            combined.extend_from_slice(chunk);
        }
        if combined.len() != self.total_len {
            error!(
                "artifact size mismatch: expected {} bytes, built {}",
                self.total_len,
                combined.len()
            );
            debug_assert_eq!(combined.len(), self.total_len);
        }
        combined.into()
    }

    /// Discard all chunks. Part of turn teardown, never called while the
    /// turn is live.
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.total_len = 0;
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Opaque identity of a published artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactHandle(u64);

/// Tracks live artifact handles so every published snapshot is revoked
/// exactly once, on the same path that discards the underlying buffer.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    next_id: u64,
    live: HashMap<u64, Arc<[u8]>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, bytes: Arc<[u8]>) -> ArtifactHandle {
        let handle = ArtifactHandle(self.next_id);
        self.next_id += 1;
        self.live.insert(handle.0, bytes);
        handle
    }

    /// Revoke a handle. A release of an unknown or already-revoked handle is
    /// a caller bug; it is logged and reported, never a panic.
    pub fn release(&mut self, handle: ArtifactHandle) -> bool {
        if self.live.remove(&handle.0).is_none() {
            warn!("release of unknown artifact handle {:?}", handle);
            return false;
        }
        true
    }

    pub fn bytes(&self, handle: ArtifactHandle) -> Option<Arc<[u8]>> {
        self.live.get(&handle.0).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
