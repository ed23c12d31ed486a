use log::{debug, info, warn};

use super::{
    CloseReason, PlayerError, PlayerEvent, PlayerState, StoryPlayer,
    session::{PlaybackSession, SessionId},
    tracker::MarkOutcome,
};
use crate::{
    input::InputProvider,
    repository::StoryRepository,
    story::{StoryId, StorySequence, UserId},
};

impl<R, IN> StoryPlayer<R, IN>
where
    R: StoryRepository,
    IN: InputProvider,
{
    /// Open the viewer on `target` within `sequence`.
    ///
    /// A target missing from the sequence starts playback at the first story.
    /// An empty sequence leaves the player idle and reports a configuration error.
    pub fn open(
        &mut self,
        sequence: StorySequence,
        target: StoryId,
        viewer: UserId,
        now_ms: u64,
    ) -> Result<(), PlayerError> {
        if self.state.is_open() {
            self.teardown(CloseReason::Replaced);
        }

        if sequence.is_empty() {
            warn!("player: open refused; empty sequence target={}", target);
            self.state = PlayerState::Idle;
            self.push_event(PlayerEvent::ConfigurationError(PlayerError::EmptySequence));
            return Err(PlayerError::EmptySequence);
        }

        self.state = PlayerState::Resolving;
        let start_index = match sequence.position_of(target) {
            Some(index) => index,
            None => {
                debug!(
                    "player: target={} not in sequence; starting at first story",
                    target
                );
                0
            }
        };

        let session_id = SessionId(self.next_session_id);
        self.next_session_id = self.next_session_id.wrapping_add(1).max(1);
        info!(
            "player: open session={} target={} index={} total={} viewer={}",
            session_id.0,
            target,
            start_index,
            sequence.len(),
            viewer
        );

        self.session = Some(PlaybackSession::new(
            session_id,
            sequence,
            start_index,
            viewer,
        ));
        self.tracker.begin_session(session_id);
        self.router.attach();
        self.clock.stop();

        self.story_became_current(now_ms);
        self.state = PlayerState::Playing;
        self.clock.start(now_ms);
        Ok(())
    }

    /// Next story, or close when already on the last one.
    pub fn advance(&mut self, now_ms: u64) {
        let Some(session) = self.session.as_mut() else {
            debug!("player: advance ignored state={:?}", self.state);
            return;
        };

        if session.is_last() {
            debug!(
                "player: terminal advance index={} total={}",
                session.current_index(),
                session.sequence().len()
            );
            self.teardown(CloseReason::Completed);
            return;
        }

        let next = session.current_index().saturating_add(1);
        session.set_index(next);
        debug!(
            "player: advance index={} total={}",
            next,
            session.sequence().len()
        );
        self.story_became_current(now_ms);
    }

    /// Previous story; no-op on the first one.
    pub fn retreat(&mut self, now_ms: u64) {
        let Some(session) = self.session.as_mut() else {
            debug!("player: retreat ignored state={:?}", self.state);
            return;
        };

        let index = session.current_index();
        if index == 0 {
            return;
        }

        session.set_index(index - 1);
        debug!(
            "player: retreat index={} total={}",
            index - 1,
            session.sequence().len()
        );
        self.story_became_current(now_ms);
    }

    pub fn toggle_pause(&mut self, now_ms: u64) {
        let paused = match self.state {
            PlayerState::Playing => {
                self.clock.stop();
                self.state = PlayerState::Paused;
                true
            }
            PlayerState::Paused => {
                self.state = PlayerState::Playing;
                self.clock.start(now_ms);
                false
            }
            PlayerState::Idle | PlayerState::Resolving | PlayerState::Closed => {
                debug!("player: toggle_pause ignored state={:?}", self.state);
                return;
            }
        };

        if let Some(session) = self.session.as_mut() {
            session.set_paused(paused);
            debug!(
                "player: paused={} index={} elapsed_ms={}",
                paused,
                session.current_index(),
                session.elapsed_ms()
            );
        }
        self.push_event(PlayerEvent::PauseChanged { paused });
    }

    pub fn close(&mut self, _now_ms: u64) {
        if !self.state.is_open() {
            debug!("player: close ignored state={:?}", self.state);
            return;
        }
        self.teardown(CloseReason::Requested);
    }

    /// The host failed to load `story`'s media; skip it like a finished timer.
    ///
    /// Reports for anything but the current story of the live session are stale.
    pub fn report_media_failure(&mut self, story: StoryId, now_ms: u64) {
        let is_current = self
            .session
            .as_ref()
            .is_some_and(|session| session.current_story().id == story);
        if !is_current {
            debug!("player: stale media failure ignored story={}", story);
            return;
        }

        warn!("player: media failed to load story={}; skipping", story);
        self.push_event(PlayerEvent::MediaSkipped { story });
        self.advance(now_ms);
    }

    fn story_became_current(&mut self, now_ms: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let index = session.current_index();
        let story = session.current_story().id;
        if self.state == PlayerState::Playing {
            // Each story gets a full duration from the moment it is shown.
            self.clock.stop();
            self.clock.start(now_ms);
        }
        let outcome = self
            .tracker
            .story_became_current(session, &mut self.repository, now_ms);

        self.push_event(PlayerEvent::CurrentStoryChanged { index, story });
        if outcome == MarkOutcome::Marked {
            self.push_event(PlayerEvent::ViewerMarked { story });
        }
    }

    pub(super) fn teardown(&mut self, reason: CloseReason) {
        self.clock.stop();
        self.router.detach();
        self.discard_pending_input();
        self.tracker.end_session();

        if let Some(session) = self.session.take() {
            info!(
                "player: close session={} reason={:?} index={} total={}",
                session.id().0,
                reason,
                session.current_index(),
                session.sequence().len()
            );
        }
        self.state = PlayerState::Closed;
        self.push_event(PlayerEvent::Closed { reason });
    }
}
