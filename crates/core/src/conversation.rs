//! Conversation-related types and the per-thread transcript store.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use threadbot_completion::Turn;

/// The maximum number of turns a transcript may hold after trimming,
/// directive included.
pub const MAX_TRANSCRIPT_TURNS: usize = 20;

/// Identifier of a platform thread (a sub-channel rooted under a
/// parent channel).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The conversational memory for one thread.
///
/// The first turn, when present, is always the persona directive; it
/// survives trimming and is only replaced by an explicit reset or a
/// persona change.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    fn seeded(persona: &str) -> Self {
        Self {
            turns: vec![Turn::directive(persona)],
        }
    }

    /// Returns the turns in chronological order.
    #[inline]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the number of turns, directive included.
    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` if the transcript holds no turns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.trim();
    }

    // Keeps the directive at index 0 and evicts the oldest
    // non-directive turns once the ceiling is exceeded.
    fn trim(&mut self) {
        if self.turns.len() <= MAX_TRANSCRIPT_TURNS {
            return;
        }
        let keep_from = self.turns.len() - (MAX_TRANSCRIPT_TURNS - 1);
        self.turns.drain(1..keep_from);
    }
}

/// Aggregate counters for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of threads with a live transcript.
    pub thread_count: usize,
    /// Total number of turns across all transcripts, directives
    /// included.
    pub total_turn_count: usize,
}

/// In-process store mapping thread ids to transcripts.
///
/// The store exclusively owns every transcript plus the process-wide
/// persona directive, and is meant to be created once and shared
/// behind an `Arc`. The internal lock is never held across an await
/// point. Nothing here survives process termination.
pub struct ConversationStore {
    inner: Mutex<Inner>,
}

struct Inner {
    persona: String,
    transcripts: HashMap<ThreadId, Transcript>,
}

impl ConversationStore {
    /// Creates a store with the given persona directive.
    pub fn new<S: Into<String>>(persona: S) -> Self {
        Self {
            inner: Mutex::new(Inner {
                persona: persona.into(),
                transcripts: HashMap::new(),
            }),
        }
    }

    /// Returns a snapshot of the transcript for a thread, creating one
    /// seeded with the current persona directive if the thread is new.
    ///
    /// The returned transcript is never empty.
    pub fn get_or_create(&self, thread: ThreadId) -> Transcript {
        let mut inner = self.lock();
        let persona = inner.persona.clone();
        inner
            .transcripts
            .entry(thread)
            .or_insert_with(|| Transcript::seeded(&persona))
            .clone()
    }

    /// Returns up to `limit` most-recent turns for the thread, without
    /// mutating anything.
    ///
    /// The directive is always part of a non-empty window: when the
    /// plain suffix slice would cut it off, the window becomes the
    /// directive plus the most recent `limit - 1` turns, so every
    /// completion request stays framed by the persona. Threads without
    /// a transcript get an empty window.
    pub fn recent_window(&self, thread: ThreadId, limit: usize) -> Vec<Turn> {
        let inner = self.lock();
        let Some(transcript) = inner.transcripts.get(&thread) else {
            return Vec::new();
        };
        let turns = &transcript.turns;
        if turns.len() <= limit || limit == 0 {
            return turns[turns.len().saturating_sub(limit)..].to_vec();
        }
        let mut window = Vec::with_capacity(limit);
        window.push(turns[0].clone());
        window.extend_from_slice(&turns[turns.len() - (limit - 1)..]);
        window
    }

    /// Appends a turn to the thread's transcript, creating the
    /// transcript first if needed, then applies the retention policy.
    pub fn append(&self, thread: ThreadId, turn: Turn) {
        let mut inner = self.lock();
        let persona = inner.persona.clone();
        inner
            .transcripts
            .entry(thread)
            .or_insert_with(|| Transcript::seeded(&persona))
            .push(turn);
    }

    /// Replaces the thread's transcript with a fresh single-directive
    /// transcript.
    pub fn reset(&self, thread: ThreadId) {
        let mut inner = self.lock();
        let persona = inner.persona.clone();
        inner
            .transcripts
            .insert(thread, Transcript::seeded(&persona));
    }

    /// Replaces the persona directive and clears every transcript, so
    /// that no thread continues a conversation under a stale persona.
    pub fn set_persona<S: Into<String>>(&self, persona: S) {
        let mut inner = self.lock();
        inner.persona = persona.into();
        let cleared = inner.transcripts.len();
        inner.transcripts.clear();
        debug!("persona replaced, {cleared} transcripts cleared");
    }

    /// Returns the current persona directive text.
    pub fn persona(&self) -> String {
        self.lock().persona.clone()
    }

    /// Returns aggregate counters for diagnostics.
    pub fn stats(&self) -> StoreStats {
        let inner = self.lock();
        StoreStats {
            thread_count: inner.transcripts.len(),
            total_turn_count: inner
                .transcripts
                .values()
                .map(Transcript::len)
                .sum(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
