//! Input abstraction layer.

pub mod mock;

/// Keys the story viewer reacts to; anything else never reaches the player.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Space,
}

/// Logical input delivered to the story viewer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputEvent {
    Key(Key),
    /// Tap inside the media area, `x` measured from its left edge.
    Tap { x: u16, width: u16 },
    /// Click on the backdrop outside the media area.
    BackdropClick,
    PauseControl,
    CloseControl,
}

/// Polled input provider.
pub trait InputProvider {
    type Error;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error>;
}
