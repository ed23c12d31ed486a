use std::time::{Duration, Instant};

use anyhow::{Result, anyhow, bail};
use log::{debug, info};
use storyline_core::{
    render::StoryRing,
    repository::{RepositoryReply, RepositoryRequest, StoryRepository},
    story::{StoryId, StorySequence, UserId},
};

use super::elapsed_ms;

const FETCH_POLL_INTERVAL_MS: u64 = 20;

/// Load the feed, newest first, before the viewer takes ownership of the repository.
pub(super) async fn fetch_feed<R>(repository: &mut R, start: Instant) -> Result<StorySequence>
where
    R: StoryRepository,
{
    let ticket = repository
        .submit(RepositoryRequest::FetchAll, elapsed_ms(start))
        .map_err(|err| anyhow!("fetch stories refused: {err:?}"))?;
    debug!("feed: fetch submitted ticket={}", ticket.0);

    loop {
        while let Some((reply_ticket, reply)) = repository.poll_reply(elapsed_ms(start)) {
            if reply_ticket != ticket {
                debug!("feed: ignoring reply ticket={}", reply_ticket.0);
                continue;
            }
            return match reply {
                Ok(RepositoryReply::Stories(stories)) => {
                    info!(
                        "feed: loaded {} stories in {} ms",
                        stories.len(),
                        elapsed_ms(start)
                    );
                    Ok(stories)
                }
                Ok(other) => bail!("fetch stories: unexpected reply {other:?}"),
                Err(err) => bail!("fetch stories failed: {err:?}"),
            };
        }
        tokio::time::sleep(Duration::from_millis(FETCH_POLL_INTERVAL_MS)).await;
    }
}

struct BarEntry {
    story: StoryId,
    author: String,
    ring: StoryRing,
}

/// Avatar row with seen/unseen rings for one viewer.
pub(super) struct StoriesBar {
    entries: Vec<BarEntry>,
}

impl StoriesBar {
    pub(super) fn new(feed: &StorySequence, viewer: UserId) -> Self {
        let entries = feed
            .iter()
            .map(|story| BarEntry {
                story: story.id,
                author: match &story.author {
                    Some(profile) => profile.display_name.to_string(),
                    None => format!("@{}", story.author_id),
                },
                ring: StoryRing::for_viewer(story, viewer),
            })
            .collect();
        Self { entries }
    }

    /// Mirror a `ViewerMarked` so the ring flips before the repository answers.
    pub(super) fn mark_viewed(&mut self, story: StoryId) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.story == story) {
            entry.ring = StoryRing::Viewed;
        }
    }

    pub(super) fn line(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let ring = match entry.ring {
                    StoryRing::Unseen => '*',
                    StoryRing::Viewed => ' ',
                };
                format!("({ring}#{} {})", entry.story, entry.author)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
