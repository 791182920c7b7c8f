#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares what a terminal shows when the player sits down.

use refinement_core::{ViewportSnapshot, BAR_COUNT};
use refinement_world::{
    query::{self, DayStatus, VisibleTile},
    World,
};

/// Produces data required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the terminal starts.
    #[must_use]
    pub fn welcome_banner(&self, world: &World) -> &'static str {
        query::welcome_banner(world)
    }

    /// Exposes the visible tiles in row-major order for presentation.
    #[must_use]
    pub fn visible_tiles(&self, world: &World) -> Vec<VisibleTile> {
        query::visible_tiles(world)
    }

    /// Collects the state shown next to the viewport.
    #[must_use]
    pub fn status(&self, world: &World) -> TerminalStatus {
        TerminalStatus {
            viewport: query::viewport(world),
            bars: query::progress_bars(world),
            master_progress: query::master_progress(world),
            day: query::day_status(world),
        }
    }
}

/// Snapshot of the terminal chrome surrounding the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerminalStatus {
    /// Position of the viewport on the global grid.
    pub viewport: ViewportSnapshot,
    /// Values of the four progress bars.
    pub bars: [f32; BAR_COUNT],
    /// Mean of the four bars.
    pub master_progress: f32,
    /// Day and file counters.
    pub day: DayStatus,
}
