use super::StoryPlayer;
use crate::{
    input::InputProvider,
    render::{Screen, StoryHeader, StoryScreen},
    repository::StoryRepository,
};

impl<R, IN> StoryPlayer<R, IN>
where
    R: StoryRepository,
    IN: InputProvider,
{
    pub fn with_screen<T, F>(&self, f: F) -> T
    where
        F: FnOnce(Screen<'_>) -> T,
    {
        let Some(session) = self.session.as_ref() else {
            return f(Screen::Hidden);
        };

        let story = session.current_story();
        f(Screen::Story(StoryScreen {
            stories: session.sequence().as_slice(),
            current_index: session.current_index(),
            progress_pct: session.progress_pct(self.config.story_duration_ms),
            paused: session.paused(),
            header: StoryHeader {
                story_id: story.id,
                author_id: story.author_id,
                author: story.author.as_ref(),
                created_at_ms: story.created_at_ms,
                media_url: story.media_url.as_str(),
            },
        }))
    }
}
