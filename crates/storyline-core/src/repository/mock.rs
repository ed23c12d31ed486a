use heapless::Vec;
use log::{debug, warn};

use super::{RepositoryError, RepositoryReply, RepositoryRequest, RequestTicket, StoryRepository};
use crate::story::{AuthorProfile, Story, StoryError, StoryId, StorySequence, UserId};

const MAX_PENDING_REQUESTS: usize = 16;
const MAX_FAILING_MARKS: usize = 8;
const MAX_AUTHORS: usize = 16;

const DEMO_STORIES: [(u32, u32, &str, u64); 5] = [
    (1, 2, "https://images.unsplash.com/photo-1506905925346-21bda4d32df4", 5 * 60_000),
    (2, 3, "https://images.unsplash.com/photo-1469474968028-56623f02e42e", 35 * 60_000),
    (3, 4, "https://images.unsplash.com/photo-1501785888041-af3ef285b470", 80 * 60_000),
    (4, 5, "https://images.unsplash.com/photo-1470071459604-3b5ec3a7fe05", 125 * 60_000),
    (5, 6, "https://images.unsplash.com/photo-1441974231531-c6227db76b6e", 190 * 60_000),
];

const DEMO_AUTHORS: [(u32, &str, &str); 5] = [
    (2, "Maya Chen", "https://i.pravatar.cc/150?u=2"),
    (3, "Jonas Berg", "https://i.pravatar.cc/150?u=3"),
    (4, "Amara Okafor", "https://i.pravatar.cc/150?u=4"),
    (5, "Luis Ortega", "https://i.pravatar.cc/150?u=5"),
    (6, "Priya Nair", "https://i.pravatar.cc/150?u=6"),
];

/// Sample stories used by the demo host, created `age` milliseconds before `now_epoch_ms`.
pub fn demo_catalog(now_epoch_ms: u64) -> Result<StorySequence, StoryError> {
    let mut sequence = StorySequence::new();
    for (id, author, url, age_ms) in DEMO_STORIES {
        sequence.push(Story::new(
            StoryId(id),
            UserId(author),
            url,
            now_epoch_ms.saturating_sub(age_ms),
        )?)?;
    }
    Ok(sequence)
}

/// Simulated round-trip time per request kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MockLatency {
    pub fetch_all_ms: u64,
    pub fetch_by_id_ms: u64,
    pub mark_viewed_ms: u64,
    pub create_ms: u64,
}

impl Default for MockLatency {
    fn default() -> Self {
        Self {
            fetch_all_ms: 300,
            fetch_by_id_ms: 200,
            mark_viewed_ms: 200,
            create_ms: 300,
        }
    }
}

impl MockLatency {
    pub const fn uniform(ms: u64) -> Self {
        Self {
            fetch_all_ms: ms,
            fetch_by_id_ms: ms,
            mark_viewed_ms: ms,
            create_ms: ms,
        }
    }

    fn for_request(&self, request: &RepositoryRequest) -> u64 {
        match request {
            RepositoryRequest::FetchAll => self.fetch_all_ms,
            RepositoryRequest::FetchById(_) => self.fetch_by_id_ms,
            RepositoryRequest::MarkViewed { .. } => self.mark_viewed_ms,
            RepositoryRequest::Create(_) => self.create_ms,
        }
    }
}

#[derive(Clone, Debug)]
struct PendingRequest {
    ticket: RequestTicket,
    due_ms: u64,
    request: RepositoryRequest,
}

/// In-memory repository that answers after an artificial delay.
///
/// Requests take effect when their reply becomes due, not when they are
/// submitted, so a late mark-viewed lands after the caller moved on.
#[derive(Debug)]
pub struct MockStoryRepository {
    records: StorySequence,
    pending: Vec<PendingRequest, MAX_PENDING_REQUESTS>,
    latency: MockLatency,
    epoch_ms: u64,
    next_ticket: u32,
    next_story_id: u32,
    failing_marks: Vec<StoryId, MAX_FAILING_MARKS>,
    authors: Vec<AuthorProfile, MAX_AUTHORS>,
    unavailable: bool,
    submitted_marks: u32,
}

impl MockStoryRepository {
    /// `epoch_ms` is the wall-clock time at engine `now_ms == 0`; it stamps created stories.
    pub fn new(records: StorySequence, epoch_ms: u64) -> Self {
        let next_story_id = records
            .iter()
            .map(|story| story.id.0)
            .max()
            .unwrap_or(0)
            .saturating_add(1);

        Self {
            records,
            pending: Vec::new(),
            latency: MockLatency::default(),
            epoch_ms,
            next_ticket: 1,
            next_story_id,
            failing_marks: Vec::new(),
            authors: Vec::new(),
            unavailable: false,
            submitted_marks: 0,
        }
    }

    /// Demo catalog plus the profiles of its authors.
    pub fn demo(now_epoch_ms: u64) -> Result<Self, StoryError> {
        let mut repository = Self::new(demo_catalog(now_epoch_ms)?, now_epoch_ms);
        for (id, display_name, avatar_url) in DEMO_AUTHORS {
            repository.add_author(AuthorProfile::new(UserId(id), display_name, avatar_url)?);
        }
        Ok(repository)
    }

    /// Register or replace the profile joined onto stories by `author.id`.
    pub fn add_author(&mut self, author: AuthorProfile) {
        if let Some(known) = self.authors.iter_mut().find(|known| known.id == author.id) {
            *known = author;
        } else if let Err(author) = self.authors.push(author) {
            warn!("repo: author directory full; dropped author={}", author.id);
        }
    }

    pub fn author(&self, id: UserId) -> Option<&AuthorProfile> {
        self.authors.iter().find(|author| author.id == id)
    }

    pub fn with_latency(mut self, latency: MockLatency) -> Self {
        self.latency = latency;
        self
    }

    /// Make every mark-viewed reply for `story` fail.
    pub fn fail_mark_viewed(&mut self, story: StoryId) {
        if !self.failing_marks.contains(&story) {
            let _ = self.failing_marks.push(story);
        }
    }

    /// Refuse new submissions while `unavailable` is set.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    pub fn record(&self, id: StoryId) -> Option<&Story> {
        self.records.iter().find(|story| story.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Mark-viewed requests accepted so far, including duplicates.
    pub fn submitted_marks(&self) -> u32 {
        self.submitted_marks
    }

    fn with_author(&self, mut story: Story) -> Story {
        story.author = self.author(story.author_id).cloned();
        story
    }

    fn resolve(
        &mut self,
        request: RepositoryRequest,
        at_ms: u64,
    ) -> Result<RepositoryReply, RepositoryError> {
        match request {
            RepositoryRequest::FetchAll => {
                let mut stories = StorySequence::new();
                for story in &self.records {
                    stories.push(self.with_author(story.clone()))?;
                }
                stories.sort_newest_first();
                Ok(RepositoryReply::Stories(stories))
            }
            RepositoryRequest::FetchById(id) => Ok(RepositoryReply::Story(
                self.record(id).cloned().map(|story| self.with_author(story)),
            )),
            RepositoryRequest::MarkViewed { story, viewer } => {
                if self.failing_marks.contains(&story) {
                    return Err(RepositoryError::Unavailable);
                }

                let index = self
                    .records
                    .position_of(story)
                    .ok_or(RepositoryError::UnknownStory(story))?;
                if let Some(record) = self.records.get_mut(index) {
                    record.add_viewer(viewer)?;
                }
                Ok(RepositoryReply::Marked { story, viewer })
            }
            RepositoryRequest::Create(new_story) => {
                let id = StoryId(self.next_story_id);
                let story = Story::new(
                    id,
                    new_story.author_id,
                    &new_story.media_url,
                    self.epoch_ms.saturating_add(at_ms),
                )?;
                self.records.push(story.clone())?;
                self.next_story_id = self.next_story_id.saturating_add(1);
                Ok(RepositoryReply::Created(self.with_author(story)))
            }
        }
    }
}

impl StoryRepository for MockStoryRepository {
    type Error = RepositoryError;

    fn submit(
        &mut self,
        request: RepositoryRequest,
        now_ms: u64,
    ) -> Result<RequestTicket, Self::Error> {
        if self.unavailable {
            return Err(RepositoryError::Unavailable);
        }

        let ticket = RequestTicket(self.next_ticket);
        let due_ms = now_ms.saturating_add(self.latency.for_request(&request));
        let is_mark = matches!(request, RepositoryRequest::MarkViewed { .. });
        debug!(
            "repo: submit ticket={} kind={} due_ms={}",
            ticket.0,
            request.kind(),
            due_ms
        );

        self.pending
            .push(PendingRequest {
                ticket,
                due_ms,
                request,
            })
            .map_err(|_| RepositoryError::Busy)?;
        self.next_ticket = self.next_ticket.wrapping_add(1).max(1);
        if is_mark {
            self.submitted_marks = self.submitted_marks.saturating_add(1);
        }
        Ok(ticket)
    }

    fn poll_reply(
        &mut self,
        now_ms: u64,
    ) -> Option<(RequestTicket, Result<RepositoryReply, Self::Error>)> {
        // Earliest due first; submission order breaks ties.
        let (slot, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.due_ms <= now_ms)
            .min_by_key(|(slot, pending)| (pending.due_ms, *slot))?;

        let pending = self.pending.remove(slot);
        let reply = self.resolve(pending.request, pending.due_ms);
        debug!(
            "repo: reply ticket={} ok={}",
            pending.ticket.0,
            reply.is_ok()
        );
        Some((pending.ticket, reply))
    }
}
