use crate::story::{Story, StorySequence, UserId};

/// Identity of one open-to-close viewer lifetime.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SessionId(pub u32);

/// Transient playback state; exists only while the viewer is open.
#[derive(Clone, Debug)]
pub struct PlaybackSession {
    id: SessionId,
    sequence: StorySequence,
    current_index: usize,
    elapsed_ms: u32,
    paused: bool,
    viewer: UserId,
}

impl PlaybackSession {
    /// `sequence` must be non-empty; `start_index` is clamped into it.
    pub(super) fn new(
        id: SessionId,
        sequence: StorySequence,
        start_index: usize,
        viewer: UserId,
    ) -> Self {
        let current_index = start_index.min(sequence.len().saturating_sub(1));
        Self {
            id,
            sequence,
            current_index,
            elapsed_ms: 0,
            paused: false,
            viewer,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn sequence(&self) -> &StorySequence {
        &self.sequence
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_story(&self) -> &Story {
        // The index is kept in bounds of a non-empty sequence.
        &self.sequence.as_slice()[self.current_index]
    }

    pub fn last_index(&self) -> usize {
        self.sequence.len().saturating_sub(1)
    }

    pub fn is_last(&self) -> bool {
        self.current_index >= self.last_index()
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn viewer(&self) -> UserId {
        self.viewer
    }

    pub fn progress_pct(&self, story_duration_ms: u32) -> f32 {
        let duration = story_duration_ms.max(1) as f32;
        (self.elapsed_ms as f32 * 100.0 / duration).min(100.0)
    }

    /// Move to `index` and restart the story timer.
    pub(super) fn set_index(&mut self, index: usize) {
        self.current_index = index.min(self.last_index());
        self.elapsed_ms = 0;
    }

    /// Accrue one tick; returns `true` once the story's duration is used up.
    pub(super) fn accrue(&mut self, tick_ms: u32, story_duration_ms: u32) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(tick_ms);
        self.elapsed_ms >= story_duration_ms
    }

    pub(super) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub(super) fn current_story_mut(&mut self) -> Option<&mut Story> {
        self.sequence.get_mut(self.current_index)
    }
}
