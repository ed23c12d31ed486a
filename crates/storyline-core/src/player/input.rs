use log::debug;

use super::StoryPlayer;
use crate::{
    input::{InputEvent, InputProvider, Key},
    repository::StoryRepository,
};

/// Player operations reachable from user input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Advance,
    Retreat,
    TogglePause,
    Close,
}

/// Map one input event to a player command.
///
/// Taps split the media area into equal halves: left retreats, right advances.
/// Taps outside `0..width` are dropped.
pub fn route_input(event: InputEvent) -> Option<Command> {
    match event {
        InputEvent::Key(Key::ArrowRight) => Some(Command::Advance),
        InputEvent::Key(Key::ArrowLeft) => Some(Command::Retreat),
        InputEvent::Key(Key::Escape) | InputEvent::BackdropClick | InputEvent::CloseControl => {
            Some(Command::Close)
        }
        InputEvent::Key(Key::Space) | InputEvent::PauseControl => Some(Command::TogglePause),
        InputEvent::Tap { x, width } if x >= width => None,
        InputEvent::Tap { x, width } => {
            if x < width / 2 {
                Some(Command::Retreat)
            } else {
                Some(Command::Advance)
            }
        }
    }
}

/// Session-scoped input listener.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(super) struct InputRouter {
    attached: bool,
    detach_count: u32,
}

impl InputRouter {
    pub(super) const fn new() -> Self {
        Self {
            attached: false,
            detach_count: 0,
        }
    }

    pub(super) fn attach(&mut self) {
        self.attached = true;
    }

    /// Returns `false` when the listener was already detached.
    pub(super) fn detach(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.attached = false;
        self.detach_count = self.detach_count.saturating_add(1);
        true
    }

    pub(super) fn is_attached(&self) -> bool {
        self.attached
    }

    pub(super) fn detach_count(&self) -> u32 {
        self.detach_count
    }

    pub(super) fn dispatch(&self, event: InputEvent) -> Option<Command> {
        if !self.attached {
            return None;
        }
        route_input(event)
    }
}

impl<R, IN> StoryPlayer<R, IN>
where
    R: StoryRepository,
    IN: InputProvider,
{
    pub(super) fn process_inputs(&mut self, now_ms: u64) {
        loop {
            match self.input.poll_event() {
                Ok(Some(event)) => self.apply_input_event(event, now_ms),
                Ok(None) => break,
                Err(_) => {
                    debug!("player: input provider error; dropping remaining input this tick");
                    break;
                }
            }
        }
    }

    /// Drain queued input without acting on it.
    pub(super) fn discard_pending_input(&mut self) {
        let mut discarded = 0u32;
        while let Ok(Some(_)) = self.input.poll_event() {
            discarded = discarded.saturating_add(1);
        }
        if discarded > 0 {
            debug!("player: discarded {} input events after close", discarded);
        }
    }

    fn apply_input_event(&mut self, event: InputEvent, now_ms: u64) {
        let Some(command) = self.router.dispatch(event) else {
            debug!(
                "player: input ignored event={:?} state={:?} attached={}",
                event,
                self.state,
                self.router.is_attached()
            );
            return;
        };

        debug!("player: input event={:?} command={:?}", event, command);
        self.apply_command(command, now_ms);
    }

    pub fn apply_command(&mut self, command: Command, now_ms: u64) {
        match command {
            Command::Advance => self.advance(now_ms),
            Command::Retreat => self.retreat(now_ms),
            Command::TogglePause => self.toggle_pause(now_ms),
            Command::Close => self.close(now_ms),
        }
    }
}
