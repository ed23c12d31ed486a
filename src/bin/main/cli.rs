use clap::Parser;
use storyline_core::config::{DEFAULT_STORY_DURATION_MS, DEFAULT_TICK_INTERVAL_MS, PlayerConfig};

#[derive(Parser, Debug)]
#[clap(
    name = "storyline",
    version,
    about = "Terminal story viewer over the in-memory story repository.",
    long_about = "Plays the demo story feed with auto-advance. Type commands on stdin: \
    `l`/`right` next, `h`/`left` previous, `p`/`space` pause, `q`/`esc` close, \
    `tap <0-99>`, `backdrop`, `fail`, `open [id]`, `quit`."
)]
pub(super) struct Args {
    /// Story to open first; a story missing from the feed starts at the newest one.
    #[clap(long, default_value_t = 1)]
    pub(super) story: u32,

    /// User id recorded on every viewed story.
    #[clap(long, default_value_t = 1)]
    pub(super) viewer: u32,

    #[clap(long, default_value_t = DEFAULT_STORY_DURATION_MS)]
    pub(super) duration_ms: u32,

    #[clap(long, default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    pub(super) tick_ms: u32,

    /// Same latency for every repository request instead of the per-kind defaults.
    #[clap(long)]
    pub(super) latency_ms: Option<u64>,

    /// Simulate a media load failure whenever this story becomes current.
    #[clap(long)]
    pub(super) fail_media: Option<u32>,

    /// Make the repository reject mark-viewed for this story.
    #[clap(long)]
    pub(super) fail_mark: Option<u32>,
}

impl Args {
    pub(super) fn player_config(&self) -> PlayerConfig {
        PlayerConfig::default()
            .with_story_duration_ms(self.duration_ms)
            .with_tick_interval_ms(self.tick_ms)
    }
}
