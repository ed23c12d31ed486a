#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

//! Terminal host for the story player: feeds it stdin commands, a monotonic
//! clock and the in-memory repository, and draws the viewer as one line.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Result, anyhow};
use clap::Parser;
use embassy_futures::select::{Either, select};
use log::{info, warn};
use storyline_core::{
    input::mock::QueuedInput,
    player::{CloseReason, PlayerEvent, StoryPlayer, TickResult},
    repository::mock::{MockLatency, MockStoryRepository},
    story::{StoryId, StorySequence, UserId},
};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use cli::Args;
use keyboard::HostCommand;
use stories_bar::StoriesBar;
use terminal::TerminalRenderer;

#[path = "main/cli.rs"]
mod cli;
#[path = "main/keyboard.rs"]
mod keyboard;
#[path = "main/stories_bar.rs"]
mod stories_bar;
#[path = "main/terminal.rs"]
mod terminal;

const UI_POLL_INTERVAL_MS: u64 = 10;
const INPUT_QUEUE_DEPTH: usize = 16;

type HostPlayer = StoryPlayer<MockStoryRepository, QueuedInput<INPUT_QUEUE_DEPTH>>;

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn epoch_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since| u64::try_from(since.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

struct Host {
    player: HostPlayer,
    feed: StorySequence,
    bar: StoriesBar,
    renderer: TerminalRenderer,
    viewer: UserId,
    entry_story: StoryId,
    fail_media: Option<StoryId>,
    epoch_ms: u64,
    start: Instant,
}

impl Host {
    async fn run(&mut self, mut commands: UnboundedReceiver<HostCommand>) -> Result<()> {
        // An empty feed is reported as `ConfigurationError`; the host keeps
        // accepting `open` and `quit`.
        self.apply_command(HostCommand::Open(None), elapsed_ms(self.start))?;

        loop {
            let now_ms = elapsed_ms(self.start);
            while let Ok(command) = commands.try_recv() {
                if !self.apply_command(command, now_ms)? {
                    return Ok(());
                }
            }

            let render_requested = self.player.tick(now_ms) == TickResult::RenderRequested;
            while let Some(event) = self.player.poll_event() {
                self.on_event(event, now_ms)?;
            }

            if render_requested {
                let now_epoch_ms = self.epoch_ms.saturating_add(now_ms);
                let renderer = &mut self.renderer;
                self.player
                    .with_screen(|screen| renderer.render(screen, now_epoch_ms))?;
            }

            tokio::time::sleep(Duration::from_millis(UI_POLL_INTERVAL_MS)).await;
        }
    }

    fn open(&mut self, target: Option<u32>) -> Result<()> {
        let target = target.map(StoryId).unwrap_or(self.entry_story);
        self.player
            .open(self.feed.clone(), target, self.viewer, elapsed_ms(self.start))
            .map_err(|err| anyhow!("open viewer on story {target}: {err}"))
    }

    /// Returns `false` once the host should exit.
    fn apply_command(&mut self, command: HostCommand, now_ms: u64) -> Result<bool> {
        match command {
            HostCommand::Input(event) => {
                if let Err(event) = self.player.with_input_mut(|input| input.push(event)) {
                    warn!("host: input queue full; dropped {:?}", event);
                }
            }
            HostCommand::MediaFailed => {
                if let Some(story) = self.player.current_story().map(|story| story.id) {
                    self.player.report_media_failure(story, now_ms);
                }
            }
            HostCommand::Open(target) => {
                if let Err(err) = self.open(target) {
                    warn!("host: {err}");
                }
            }
            HostCommand::Quit => {
                self.player.close(now_ms);
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn on_event(&mut self, event: PlayerEvent, now_ms: u64) -> Result<()> {
        match event {
            PlayerEvent::CurrentStoryChanged { index, story } => {
                info!("host: showing story={} index={}", story, index);
                if self.fail_media == Some(story) {
                    self.player.report_media_failure(story, now_ms);
                }
            }
            PlayerEvent::ViewerMarked { story } => self.bar.mark_viewed(story),
            PlayerEvent::PauseChanged { paused } => info!("host: paused={}", paused),
            PlayerEvent::MediaSkipped { story } => {
                self.renderer
                    .print_line(&format!("media for story #{story} failed to load; skipped"))?;
            }
            PlayerEvent::Closed { reason } => {
                if reason != CloseReason::Replaced {
                    self.renderer.print_line(&self.bar.line())?;
                    self.renderer
                        .print_line("viewer closed; `open [id]` to watch again, `quit` to exit")?;
                }
            }
            PlayerEvent::ConfigurationError(err) => warn!("host: viewer not opened: {err}"),
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start = Instant::now();
    let epoch_ms = epoch_now_ms();
    let mut repository =
        MockStoryRepository::demo(epoch_ms).map_err(|err| anyhow!("demo repository: {err}"))?;
    if let Some(latency_ms) = args.latency_ms {
        repository = repository.with_latency(MockLatency::uniform(latency_ms));
    }
    if let Some(story) = args.fail_mark {
        repository.fail_mark_viewed(StoryId(story));
    }

    let feed = stories_bar::fetch_feed(&mut repository, start).await?;
    let viewer = UserId(args.viewer);
    let bar = StoriesBar::new(&feed, viewer);
    let mut renderer = TerminalRenderer::new();
    renderer.print_line(&bar.line())?;

    let config = args.player_config();
    info!(
        "host: viewer={} entry_story={} duration_ms={} tick_ms={}",
        viewer, args.story, config.story_duration_ms, config.tick_interval_ms
    );

    let mut host = Host {
        player: StoryPlayer::new(repository, QueuedInput::new(), config),
        feed,
        bar,
        renderer,
        viewer,
        entry_story: StoryId(args.story),
        fail_media: args.fail_media.map(StoryId),
        epoch_ms,
        start,
    };

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let outcome = select(host.run(command_rx), keyboard::read_commands(command_tx)).await;
    match outcome {
        Either::First(result) => result?,
        Either::Second(result) => {
            result?;
            info!("host: stdin closed");
        }
    }

    let stats = host.player.view_stats();
    info!(
        "host: views issued={} acknowledged={} failed={} stale={}",
        stats.issued, stats.acknowledged, stats.failed, stats.stale
    );
    Ok(())
}
