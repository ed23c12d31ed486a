//! Story repository contract.
//!
//! The repository is remote and latency-bearing: a request is submitted and
//! answered later through [`StoryRepository::poll_reply`], matched by its
//! [`RequestTicket`]. The player never waits on a reply.

pub mod mock;

use core::fmt;

use crate::story::{NewStory, Story, StoryError, StoryId, StorySequence, UserId};

/// Correlates a submitted request with its reply.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RequestTicket(pub u32);

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RepositoryRequest {
    FetchAll,
    FetchById(StoryId),
    MarkViewed { story: StoryId, viewer: UserId },
    Create(NewStory),
}

impl RepositoryRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchAll => "fetch_all",
            Self::FetchById(_) => "fetch_by_id",
            Self::MarkViewed { .. } => "mark_viewed",
            Self::Create(_) => "create",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RepositoryReply {
    /// All stories, newest first.
    Stories(StorySequence),
    Story(Option<Story>),
    Marked { story: StoryId, viewer: UserId },
    Created(Story),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RepositoryError {
    /// Too many requests in flight.
    Busy,
    Unavailable,
    UnknownStory(StoryId),
    Story(StoryError),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "repository busy"),
            Self::Unavailable => write!(f, "repository unavailable"),
            Self::UnknownStory(id) => write!(f, "unknown story {id}"),
            Self::Story(err) => write!(f, "story record rejected: {err}"),
        }
    }
}

impl From<StoryError> for RepositoryError {
    fn from(err: StoryError) -> Self {
        Self::Story(err)
    }
}

/// Polled, latency-bearing story store.
pub trait StoryRepository {
    type Error: fmt::Debug;

    /// Queue a request. Errors here mean the request was never accepted.
    fn submit(
        &mut self,
        request: RepositoryRequest,
        now_ms: u64,
    ) -> Result<RequestTicket, Self::Error>;

    /// Next reply that is due at `now_ms`, if any.
    fn poll_reply(
        &mut self,
        now_ms: u64,
    ) -> Option<(RequestTicket, Result<RepositoryReply, Self::Error>)>;
}
