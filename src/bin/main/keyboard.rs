use anyhow::Result;
use log::{debug, warn};
use storyline_core::input::{InputEvent, Key};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc::UnboundedSender,
};

/// Width reported for `tap <x>`; the media area spans `0..TAP_AREA_WIDTH`.
pub(super) const TAP_AREA_WIDTH: u16 = 100;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum HostCommand {
    Input(InputEvent),
    /// The current story's media failed to load.
    MediaFailed,
    /// Reopen the viewer, optionally on a specific story.
    Open(Option<u32>),
    Quit,
}

pub(super) fn parse_line(line: &str) -> Option<HostCommand> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        // Bare enter toggles pause, like the space bar.
        return Some(HostCommand::Input(InputEvent::Key(Key::Space)));
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "l" | "right" | "next" => HostCommand::Input(InputEvent::Key(Key::ArrowRight)),
        "h" | "left" | "prev" => HostCommand::Input(InputEvent::Key(Key::ArrowLeft)),
        "p" | "space" => HostCommand::Input(InputEvent::Key(Key::Space)),
        "pause" => HostCommand::Input(InputEvent::PauseControl),
        "q" | "esc" => HostCommand::Input(InputEvent::Key(Key::Escape)),
        "x" | "close" => HostCommand::Input(InputEvent::CloseControl),
        "backdrop" => HostCommand::Input(InputEvent::BackdropClick),
        "tap" => {
            let x = words.next()?.parse::<u16>().ok()?;
            HostCommand::Input(InputEvent::Tap {
                x: x.min(TAP_AREA_WIDTH - 1),
                width: TAP_AREA_WIDTH,
            })
        }
        "fail" => HostCommand::MediaFailed,
        "open" => match words.next() {
            Some(id) => HostCommand::Open(Some(id.parse().ok()?)),
            None => HostCommand::Open(None),
        },
        "quit" | "exit" => HostCommand::Quit,
        _ => return None,
    };
    Some(command)
}

/// Forward stdin lines to the UI loop until stdin closes or the loop goes away.
pub(super) async fn read_commands(commands: UnboundedSender<HostCommand>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_line(&line) else {
            warn!("keyboard: unrecognized command {:?}", line.trim());
            continue;
        };

        debug!("keyboard: {:?}", command);
        if commands.send(command).is_err() {
            break;
        }
    }
    Ok(())
}
