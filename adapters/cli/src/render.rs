//! Plain text rendering of a terminal frame.

use std::fmt::Write as _;

use refinement_system_bootstrap::TerminalStatus;
use refinement_world::query::VisibleTile;

const BAR_SEGMENTS: usize = 10;

/// Renders the viewport followed by the bars, the day counters and the sensor reading.
///
/// Scary tiles are bracketed.
pub(crate) fn render_frame(
    tiles: &[VisibleTile],
    status: &TerminalStatus,
    proximity: f32,
) -> String {
    let mut frame = String::new();
    let _ = writeln!(
        frame,
        "scroll {:>4},{:<4} proximity {:.2}",
        status.viewport.scroll_x, status.viewport.scroll_y, proximity
    );

    let columns = status.viewport.width.max(1) as usize;
    for row in tiles.chunks(columns) {
        for tile in row {
            if tile.scary {
                let _ = write!(frame, "[{}]", tile.value);
            } else {
                let _ = write!(frame, " {} ", tile.value);
            }
        }
        frame.push('\n');
    }

    for (slot, value) in status.bars.iter().enumerate() {
        let _ = writeln!(frame, "bar {slot} {} {value:.2}", meter(*value));
    }
    let _ = write!(
        frame,
        "master {:.2} files {}/{}",
        status.master_progress, status.day.files_refined, status.day.files_per_day
    );
    frame
}

fn meter(value: f32) -> String {
    let filled =
        ((value.clamp(0.0, 1.0) * BAR_SEGMENTS as f32).round() as usize).min(BAR_SEGMENTS);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_SEGMENTS - filled))
}
