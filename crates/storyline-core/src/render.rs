//! View models consumed by the host renderer.

use crate::story::{AuthorProfile, Story, StoryId, UserId};

/// Fill state of one progress-bar segment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SegmentFill {
    Complete,
    /// 0..=100
    Partial(u8),
    Empty,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StoryHeader<'a> {
    pub story_id: StoryId,
    pub author_id: UserId,
    pub author: Option<&'a AuthorProfile>,
    pub created_at_ms: u64,
    pub media_url: &'a str,
}

impl<'a> StoryHeader<'a> {
    pub fn author_name(&self) -> Option<&'a str> {
        self.author.map(|author| author.display_name.as_str())
    }

    pub fn author_avatar_url(&self) -> Option<&'a str> {
        self.author.map(|author| author.avatar_url.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StoryScreen<'a> {
    pub stories: &'a [Story],
    pub current_index: usize,
    /// 0.0..=100.0
    pub progress_pct: f32,
    pub paused: bool,
    pub header: StoryHeader<'a>,
}

impl StoryScreen<'_> {
    pub fn segment(&self, index: usize) -> SegmentFill {
        if index < self.current_index {
            SegmentFill::Complete
        } else if index == self.current_index {
            SegmentFill::Partial(self.progress_pct.clamp(0.0, 100.0) as u8)
        } else {
            SegmentFill::Empty
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = SegmentFill> + '_ {
        (0..self.stories.len()).map(|index| self.segment(index))
    }

    /// One-based position and total, as shown in the story counter.
    pub fn counter(&self) -> (usize, usize) {
        (self.current_index.saturating_add(1), self.stories.len())
    }
}

/// App-level view model for the story viewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Screen<'a> {
    Hidden,
    Story(StoryScreen<'a>),
}

/// Ring drawn around a story avatar in the stories bar.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoryRing {
    Unseen,
    Viewed,
}

impl StoryRing {
    pub fn for_viewer(story: &Story, viewer: UserId) -> Self {
        if story.has_viewer(viewer) {
            Self::Viewed
        } else {
            Self::Unseen
        }
    }
}
