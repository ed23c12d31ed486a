//! Story records and the ordered sequences handed to the player.

use core::fmt;

use heapless::{String, Vec};

pub const MAX_SEQUENCE_STORIES: usize = 32;
pub const MAX_STORY_VIEWERS: usize = 32;
pub const MEDIA_URL_BYTES: usize = 160;
pub const DISPLAY_NAME_BYTES: usize = 32;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct StoryId(pub u32);

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a user, either as a story author or as a viewer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoryError {
    MediaUrlTooLong,
    DisplayNameTooLong,
    ViewersFull,
    SequenceFull,
}

impl fmt::Display for StoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MediaUrlTooLong => write!(f, "media url exceeds {MEDIA_URL_BYTES} bytes"),
            Self::DisplayNameTooLong => {
                write!(f, "display name exceeds {DISPLAY_NAME_BYTES} bytes")
            }
            Self::ViewersFull => write!(f, "viewer set holds {MAX_STORY_VIEWERS} ids already"),
            Self::SequenceFull => write!(f, "sequence holds {MAX_SEQUENCE_STORIES} stories already"),
        }
    }
}

/// Outcome of recording a viewer on a story.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ViewerInsert {
    Added,
    AlreadyPresent,
}

fn bounded<const N: usize>(text: &str, too_long: StoryError) -> Result<String<N>, StoryError> {
    let mut out = String::new();
    out.push_str(text).map_err(|_| too_long)?;
    Ok(out)
}

fn media_url_from(media_url: &str) -> Result<String<MEDIA_URL_BYTES>, StoryError> {
    bounded(media_url, StoryError::MediaUrlTooLong)
}

/// Public profile of a story author, joined onto stories read from the repository.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthorProfile {
    pub id: UserId,
    pub display_name: String<DISPLAY_NAME_BYTES>,
    pub avatar_url: String<MEDIA_URL_BYTES>,
}

impl AuthorProfile {
    pub fn new(id: UserId, display_name: &str, avatar_url: &str) -> Result<Self, StoryError> {
        Ok(Self {
            id,
            display_name: bounded(display_name, StoryError::DisplayNameTooLong)?,
            avatar_url: media_url_from(avatar_url)?,
        })
    }
}

/// A single ephemeral media post.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Story {
    pub id: StoryId,
    pub author_id: UserId,
    pub media_url: String<MEDIA_URL_BYTES>,
    pub created_at_ms: u64,
    pub active: bool,
    /// Filled in by repository reads; `None` when the author is unknown.
    pub author: Option<AuthorProfile>,
    viewers: Vec<UserId, MAX_STORY_VIEWERS>,
}

impl Story {
    pub fn new(
        id: StoryId,
        author_id: UserId,
        media_url: &str,
        created_at_ms: u64,
    ) -> Result<Self, StoryError> {
        Ok(Self {
            id,
            author_id,
            media_url: media_url_from(media_url)?,
            created_at_ms,
            active: true,
            author: None,
            viewers: Vec::new(),
        })
    }

    pub fn viewers(&self) -> &[UserId] {
        &self.viewers
    }

    pub fn has_viewer(&self, viewer: UserId) -> bool {
        self.viewers.contains(&viewer)
    }

    /// Append-only insert; re-adding a known viewer is a no-op.
    pub fn add_viewer(&mut self, viewer: UserId) -> Result<ViewerInsert, StoryError> {
        if self.has_viewer(viewer) {
            return Ok(ViewerInsert::AlreadyPresent);
        }

        self.viewers
            .push(viewer)
            .map_err(|_| StoryError::ViewersFull)?;
        Ok(ViewerInsert::Added)
    }
}

/// Attributes for a story that does not exist yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewStory {
    pub author_id: UserId,
    pub media_url: String<MEDIA_URL_BYTES>,
}

impl NewStory {
    pub fn new(author_id: UserId, media_url: &str) -> Result<Self, StoryError> {
        Ok(Self {
            author_id,
            media_url: media_url_from(media_url)?,
        })
    }
}

/// Ordered stories for one playback session.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StorySequence {
    stories: Vec<Story, MAX_SEQUENCE_STORIES>,
}

impl StorySequence {
    pub const fn new() -> Self {
        Self {
            stories: Vec::new(),
        }
    }

    pub fn from_stories<I>(stories: I) -> Result<Self, StoryError>
    where
        I: IntoIterator<Item = Story>,
    {
        let mut sequence = Self::new();
        for story in stories {
            sequence.push(story)?;
        }
        Ok(sequence)
    }

    pub fn push(&mut self, story: Story) -> Result<(), StoryError> {
        self.stories
            .push(story)
            .map_err(|_| StoryError::SequenceFull)
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Story> {
        self.stories.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Story> {
        self.stories.get_mut(index)
    }

    /// Position of `id` within the sequence, if present.
    pub fn position_of(&self, id: StoryId) -> Option<usize> {
        self.stories.iter().position(|story| story.id == id)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Story> {
        self.stories.iter()
    }

    pub fn as_slice(&self) -> &[Story] {
        &self.stories
    }

    pub(crate) fn sort_newest_first(&mut self) {
        self.stories
            .sort_unstable_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
    }
}

impl<'a> IntoIterator for &'a StorySequence {
    type Item = &'a Story;
    type IntoIter = core::slice::Iter<'a, Story>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
