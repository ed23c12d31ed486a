//! Player timing configuration.

pub const DEFAULT_STORY_DURATION_MS: u32 = 5_000;
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 100;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlayerConfig {
    /// Display time of one story before auto-advance.
    pub story_duration_ms: u32,
    /// Clock resolution; progress accrues once per interval.
    pub tick_interval_ms: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            story_duration_ms: DEFAULT_STORY_DURATION_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl PlayerConfig {
    pub const fn with_story_duration_ms(mut self, story_duration_ms: u32) -> Self {
        self.story_duration_ms = story_duration_ms;
        self
    }

    pub const fn with_tick_interval_ms(mut self, tick_interval_ms: u32) -> Self {
        self.tick_interval_ms = tick_interval_ms;
        self
    }

    /// Tick of at least 1 ms and a story lasting at least one tick.
    pub fn normalized(mut self) -> Self {
        self.tick_interval_ms = self.tick_interval_ms.max(1);
        self.story_duration_ms = self.story_duration_ms.max(self.tick_interval_ms);
        self
    }
}
