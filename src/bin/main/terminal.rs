use std::io::{self, Stdout, Write};

use storyline_core::render::{Screen, SegmentFill, StoryScreen};

const SEGMENT_CELLS: usize = 8;
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Single-line story viewer redrawn in place.
pub(super) struct TerminalRenderer {
    out: Stdout,
}

impl TerminalRenderer {
    pub(super) fn new() -> Self {
        Self { out: io::stdout() }
    }

    pub(super) fn render(&mut self, screen: Screen<'_>, now_epoch_ms: u64) -> io::Result<()> {
        match screen {
            Screen::Hidden => write!(self.out, "{CLEAR_LINE}")?,
            Screen::Story(story) => {
                write!(self.out, "{CLEAR_LINE}{}", story_line(&story, now_epoch_ms))?
            }
        }
        self.out.flush()
    }

    /// Print a full line below the viewer without tearing it.
    pub(super) fn print_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{CLEAR_LINE}{line}")?;
        self.out.flush()
    }
}

fn story_line(story: &StoryScreen<'_>, now_epoch_ms: u64) -> String {
    let mut line = String::new();
    for segment in story.segments() {
        line.push('[');
        push_segment(&mut line, segment);
        line.push(']');
    }

    let (position, total) = story.counter();
    let author = match story.header.author_name() {
        Some(name) => name.to_string(),
        None => format!("user {}", story.header.author_id),
    };
    line.push_str(&format!(
        " {position}/{total}  story #{} by {author} · {}",
        story.header.story_id,
        relative_age(now_epoch_ms, story.header.created_at_ms)
    ));
    if story.paused {
        line.push_str("  [paused]");
    }
    line
}

fn push_segment(line: &mut String, segment: SegmentFill) {
    let filled = match segment {
        SegmentFill::Complete => SEGMENT_CELLS,
        SegmentFill::Partial(pct) => usize::from(pct.min(100)) * SEGMENT_CELLS / 100,
        SegmentFill::Empty => 0,
    };
    for cell in 0..SEGMENT_CELLS {
        line.push(if cell < filled { '#' } else { '-' });
    }
}

pub(super) fn relative_age(now_epoch_ms: u64, created_at_ms: u64) -> String {
    let minutes = now_epoch_ms.saturating_sub(created_at_ms) / 60_000;
    match minutes {
        0 => "just now".to_string(),
        1..=59 => format!("{minutes}m ago"),
        60..=1_439 => format!("{}h ago", minutes / 60),
        _ => format!("{}d ago", minutes / 1_440),
    }
}
