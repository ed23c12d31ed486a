use log::debug;

use super::{PlayerState, StoryPlayer, TickResult};
use crate::{clock::Tick, input::InputProvider, repository::StoryRepository};

impl<R, IN> StoryPlayer<R, IN>
where
    R: StoryRepository,
    IN: InputProvider,
{
    /// Run one scheduling step: input, then repository replies, then due clock ticks.
    pub fn tick(&mut self, now_ms: u64) -> TickResult {
        self.process_inputs(now_ms);
        self.process_replies(now_ms);
        self.process_clock(now_ms);

        if self.pending_redraw {
            self.pending_redraw = false;
            TickResult::RenderRequested
        } else {
            TickResult::NoRender
        }
    }

    fn process_replies(&mut self, now_ms: u64) {
        while let Some((ticket, reply)) = self.repository.poll_reply(now_ms) {
            let current = self
                .session
                .as_ref()
                .map(|session| (session.id(), session.current_story().id));
            if !self.tracker.on_reply(ticket, &reply, current) {
                debug!(
                    "player: unclaimed repository reply ticket={} ok={}",
                    ticket.0,
                    reply.is_ok()
                );
            }
        }
    }

    fn process_clock(&mut self, now_ms: u64) {
        // Re-check the state per tick: a tick that closes the session must
        // not be followed by another one. Catch-up ticks stay within the
        // current story; finishing it restarts the clock at `now_ms`.
        while self.state == PlayerState::Playing {
            let Some(tick) = self.clock.poll(now_ms) else {
                break;
            };
            self.apply_tick(tick, now_ms);
        }
    }

    fn apply_tick(&mut self, tick: Tick, now_ms: u64) {
        let tick_ms = self.clock.interval_ms();
        let duration_ms = self.config.story_duration_ms;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        self.pending_redraw = true;
        if session.accrue(tick_ms, duration_ms) {
            debug!(
                "player: story finished index={} at_ms={}",
                session.current_index(),
                tick.at_ms
            );
            self.advance(now_ms);
        }
    }
}
