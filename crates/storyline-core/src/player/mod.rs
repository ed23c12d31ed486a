//! Story playback state machine with auto-advance and view tracking.
//!
//! The player is polled: the host calls [`StoryPlayer::tick`] with a
//! monotonic `now_ms`, issues commands between ticks, and drains
//! [`PlayerEvent`]s. Every entry point takes `&mut self`, so a transition
//! always completes before the next input, tick, or reply is handled.

use core::fmt;

use heapless::Deque;
use log::warn;

use crate::{
    clock::PlaybackClock,
    config::PlayerConfig,
    input::InputProvider,
    repository::StoryRepository,
    story::{Story, StoryId},
};

mod input;
mod navigation;
mod runtime;
mod session;
mod tracker;
mod view;

#[cfg(test)]
mod tests;

pub use input::{Command, route_input};
pub use session::{PlaybackSession, SessionId};
pub use tracker::ViewStats;

use input::InputRouter;
use tracker::ViewTracker;

const MAX_PENDING_EVENTS: usize = 32;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlayerState {
    /// Viewer closed, no session.
    Idle,
    /// Locating the entry story; only observable from inside `open`.
    Resolving,
    Playing,
    Paused,
    /// Session torn down; the next `open` starts a fresh one.
    Closed,
}

impl PlayerState {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Resolving | Self::Playing | Self::Paused)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlayerError {
    /// `open` was handed a sequence with no stories.
    EmptySequence,
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySequence => write!(f, "story sequence is empty"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CloseReason {
    /// Escape, backdrop click, close control, or a host `close()`.
    Requested,
    /// Advanced past the last story, by timer, command, or media failure.
    Completed,
    /// A new `open` replaced the live session.
    Replaced,
}

/// Notifications for the host, drained with [`StoryPlayer::poll_event`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlayerEvent {
    CurrentStoryChanged { index: usize, story: StoryId },
    ViewerMarked { story: StoryId },
    PauseChanged { paused: bool },
    MediaSkipped { story: StoryId },
    Closed { reason: CloseReason },
    ConfigurationError(PlayerError),
}

pub struct StoryPlayer<R, IN>
where
    R: StoryRepository,
    IN: InputProvider,
{
    repository: R,
    input: IN,
    config: PlayerConfig,
    state: PlayerState,
    session: Option<PlaybackSession>,
    clock: PlaybackClock,
    router: InputRouter,
    tracker: ViewTracker,
    events: Deque<PlayerEvent, MAX_PENDING_EVENTS>,
    next_session_id: u32,
    pending_redraw: bool,
}

impl<R, IN> StoryPlayer<R, IN>
where
    R: StoryRepository,
    IN: InputProvider,
{
    pub fn new(repository: R, input: IN, config: PlayerConfig) -> Self {
        let config = config.normalized();

        Self {
            repository,
            input,
            config,
            state: PlayerState::Idle,
            session: None,
            clock: PlaybackClock::new(config.tick_interval_ms),
            router: InputRouter::new(),
            tracker: ViewTracker::new(),
            events: Deque::new(),
            next_session_id: 1,
            pending_redraw: false,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn config(&self) -> PlayerConfig {
        self.config
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.session.as_ref().map(PlaybackSession::current_index)
    }

    pub fn current_story(&self) -> Option<&Story> {
        self.session.as_ref().map(PlaybackSession::current_story)
    }

    /// Progress through the current story in `[0, 100]`.
    pub fn progress_pct(&self) -> Option<f32> {
        self.session
            .as_ref()
            .map(|session| session.progress_pct(self.config.story_duration_ms))
    }

    pub fn view_stats(&self) -> ViewStats {
        self.tracker.stats()
    }

    /// Times the input listener has been detached over the player's lifetime.
    pub fn input_detach_count(&self) -> u32 {
        self.router.detach_count()
    }

    pub fn poll_event(&mut self) -> Option<PlayerEvent> {
        self.events.pop_front()
    }

    pub fn with_input_mut<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut IN) -> T,
    {
        f(&mut self.input)
    }

    pub fn with_repository_mut<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut R) -> T,
    {
        f(&mut self.repository)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn push_event(&mut self, event: PlayerEvent) {
        if let Err(event) = self.events.push_back(event) {
            let dropped = self.events.pop_front();
            warn!(
                "player: event queue full; dropped={:?} queued={:?}",
                dropped, event
            );
            let _ = self.events.push_back(event);
        }
        self.pending_redraw = true;
    }
}
