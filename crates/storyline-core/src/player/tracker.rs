use core::fmt::Debug;

use heapless::Vec;
use log::{debug, warn};

use super::session::{PlaybackSession, SessionId};
use crate::{
    repository::{RepositoryReply, RepositoryRequest, RequestTicket, StoryRepository},
    story::{MAX_SEQUENCE_STORIES, StoryError, StoryId},
};

const MAX_IN_FLIGHT_MARKS: usize = 16;

/// Counters for mark-viewed traffic over the player's lifetime.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ViewStats {
    /// Requests accepted by the repository.
    pub issued: u32,
    pub acknowledged: u32,
    /// Refused submissions and failed replies, stale or not.
    pub failed: u32,
    /// Successful replies that arrived after their session or story was gone.
    pub stale: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum MarkOutcome {
    /// First time this session; the viewer was applied locally.
    Marked,
    AlreadyMarked,
}

#[derive(Clone, Copy, Debug)]
struct InFlightMark {
    ticket: RequestTicket,
    session: SessionId,
    story: StoryId,
}

/// Per-session de-duplication of mark-viewed requests.
#[derive(Debug)]
pub(super) struct ViewTracker {
    session: Option<SessionId>,
    marked: Vec<StoryId, MAX_SEQUENCE_STORIES>,
    in_flight: Vec<InFlightMark, MAX_IN_FLIGHT_MARKS>,
    stats: ViewStats,
}

impl ViewTracker {
    pub(super) const fn new() -> Self {
        Self {
            session: None,
            marked: Vec::new(),
            in_flight: Vec::new(),
            stats: ViewStats {
                issued: 0,
                acknowledged: 0,
                failed: 0,
                stale: 0,
            },
        }
    }

    pub(super) fn stats(&self) -> ViewStats {
        self.stats
    }

    pub(super) fn begin_session(&mut self, session: SessionId) {
        self.session = Some(session);
        self.marked.clear();
    }

    /// In-flight requests are kept so their late replies can be recognized as stale.
    pub(super) fn end_session(&mut self) {
        self.session = None;
        self.marked.clear();
    }

    /// Record the current story as seen: locally right away, remotely fire-and-forget.
    pub(super) fn story_became_current<R>(
        &mut self,
        session: &mut PlaybackSession,
        repository: &mut R,
        now_ms: u64,
    ) -> MarkOutcome
    where
        R: StoryRepository,
    {
        let session_id = session.id();
        let viewer = session.viewer();
        let story = session.current_story().id;

        if self.marked.contains(&story) {
            debug!(
                "views: already marked session={} story={} viewer={}",
                session_id.0, story, viewer
            );
            return MarkOutcome::AlreadyMarked;
        }
        // Capacity matches the sequence bound, so every distinct story fits.
        let _ = self.marked.push(story);

        if let Some(record) = session.current_story_mut() {
            if let Err(StoryError::ViewersFull) = record.add_viewer(viewer) {
                warn!(
                    "views: local viewer set full story={} viewer={}",
                    story, viewer
                );
            }
        }

        match repository.submit(RepositoryRequest::MarkViewed { story, viewer }, now_ms) {
            Ok(ticket) => {
                self.stats.issued = self.stats.issued.saturating_add(1);
                let entry = InFlightMark {
                    ticket,
                    session: session_id,
                    story,
                };
                if self.in_flight.push(entry).is_err() {
                    // Oldest entry loses tracking; its reply will read as unrelated.
                    self.in_flight.remove(0);
                    let _ = self.in_flight.push(entry);
                }
                debug!(
                    "views: mark submitted session={} story={} viewer={} ticket={}",
                    session_id.0, story, viewer, ticket.0
                );
            }
            Err(err) => {
                self.stats.failed = self.stats.failed.saturating_add(1);
                warn!(
                    "views: mark-viewed refused story={} viewer={} err={:?}",
                    story, viewer, err
                );
            }
        }

        MarkOutcome::Marked
    }

    /// Reconcile a repository reply against the live session.
    ///
    /// Returns `false` for replies this tracker never asked for.
    pub(super) fn on_reply<E>(
        &mut self,
        ticket: RequestTicket,
        reply: &Result<RepositoryReply, E>,
        current: Option<(SessionId, StoryId)>,
    ) -> bool
    where
        E: Debug,
    {
        let Some(slot) = self.in_flight.iter().position(|mark| mark.ticket == ticket) else {
            return false;
        };
        let mark = self.in_flight.remove(slot);

        if let Err(err) = reply {
            self.stats.failed = self.stats.failed.saturating_add(1);
            warn!(
                "views: mark-viewed failed story={} session={} err={:?}; playback unaffected",
                mark.story, mark.session.0, err
            );
            return true;
        }

        if current != Some((mark.session, mark.story)) {
            self.stats.stale = self.stats.stale.saturating_add(1);
            debug!(
                "views: stale reply discarded ticket={} session={} story={}",
                ticket.0, mark.session.0, mark.story
            );
            return true;
        }

        self.stats.acknowledged = self.stats.acknowledged.saturating_add(1);
        debug!("views: mark acknowledged story={}", mark.story);
        true
    }
}
