//! Resolution of dropped tile selections into progress chunks.

use std::time::Duration;

use rand::Rng;
use refinement_core::{
    BarIndex, Event, ScreenIndex, SCARY_VALUE_MULTIPLIER, VALUE_PROGRESS_SCALE,
};

use crate::{
    grid::{ConsumedTile, WrappingGrid},
    progress::ProgressEngine,
    scroll::ScrollState,
    AllBarsFullHook,
};

/// Mutable collaborators a drop touches.
pub(crate) struct DropContext<'a, R: Rng + ?Sized> {
    pub(crate) grid: &'a mut WrappingGrid,
    pub(crate) scroll: &'a ScrollState,
    pub(crate) progress: &'a mut ProgressEngine,
    pub(crate) all_bars_full: &'a mut dyn AllBarsFullHook,
    pub(crate) rng: &'a mut R,
    pub(crate) now: Duration,
}

/// Consumes every selected tile, sums its contribution into the pending chunk
/// and applies the chunk to `bar`.
///
/// Screen indices outside the viewport are skipped. A repeated index consumes
/// the same cell again, scoring whatever value it respawned with.
pub(crate) fn resolve_drop<R: Rng + ?Sized>(
    context: DropContext<'_, R>,
    tiles: &[ScreenIndex],
    bar: BarIndex,
    out_events: &mut Vec<Event>,
) {
    let DropContext {
        grid,
        scroll,
        progress,
        all_bars_full,
        rng,
        now,
    } = context;

    let dimensions = grid.dimensions();
    let mut total = 0.0_f32;
    let mut cleared = Vec::with_capacity(tiles.len());
    for screen in tiles {
        let Some(index) = scroll.screen_to_global(*screen, dimensions) else {
            continue;
        };
        let Some(consumed) = grid.consume_and_respawn(index, rng) else {
            continue;
        };
        total += contribution(consumed);
        cleared.push(index);
    }

    if !cleared.is_empty() {
        out_events.push(Event::GroupCleared { indices: cleared });
    }

    progress.set_pending_chunk(total, out_events);
    progress.apply_chunk(bar, now, all_bars_full, out_events);
    out_events.push(Event::GridScrolled);
}

fn contribution(tile: ConsumedTile) -> f32 {
    let base = f32::from(tile.value) * VALUE_PROGRESS_SCALE;
    if tile.was_scary {
        base * SCARY_VALUE_MULTIPLIER
    } else {
        base
    }
}
