#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative terminal state management for Refinement.
//!
//! The [`World`] owns the toroidal tile grid, the scroll position, the
//! progress bars and the day/file counters. It is only ever mutated through
//! [`apply`], which executes a single [`Command`] synchronously and appends the
//! resulting [`Event`] values to the caller's buffer. Reads go through the
//! [`query`] module.

mod grid;
mod progress;
mod scroll;
mod selection;

use std::{fmt, time::Duration};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use refinement_core::{Command, ConfigError, Event, TerminalConfig, BAR_COUNT, WELCOME_BANNER};
use tracing::{debug, info};

use crate::{
    grid::WrappingGrid,
    progress::ProgressEngine,
    scroll::ScrollState,
    selection::DropContext,
};

/// Seed used by [`World::new`].
pub const DEFAULT_SEED: u64 = 0x6d61_6372_6f64_6174;

/// Strategy invoked whenever a chunk leaves every bar full.
pub trait AllBarsFullHook: fmt::Debug {
    /// Reacts to every bar being full, optionally emitting further events.
    fn on_all_bars_full(&mut self, bars: &[f32; BAR_COUNT], out_events: &mut Vec<Event>);
}

/// Default strategy that announces [`Event::AllBarsFull`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AnnounceAllBarsFull;

impl AllBarsFullHook for AnnounceAllBarsFull {
    fn on_all_bars_full(&mut self, bars: &[f32; BAR_COUNT], out_events: &mut Vec<Event>) {
        info!(?bars, "all bars are full");
        out_events.push(Event::AllBarsFull);
    }
}

/// Represents the authoritative terminal state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: TerminalConfig,
    grid: WrappingGrid,
    scroll: ScrollState,
    progress: ProgressEngine,
    rng: ChaCha8Rng,
    clock: Duration,
    all_bars_full: Box<dyn AllBarsFullHook>,
}

impl World {
    /// Creates a terminal with the default configuration and a freshly generated grid.
    #[must_use]
    pub fn new() -> Self {
        Self::build(TerminalConfig::default(), DEFAULT_SEED)
    }

    /// Creates a terminal from a validated configuration and RNG seed.
    pub fn with_config(config: TerminalConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    /// Replaces the strategy invoked when every bar is full.
    #[must_use]
    pub fn with_all_bars_full_hook(mut self, hook: impl AllBarsFullHook + 'static) -> Self {
        self.all_bars_full = Box::new(hook);
        self
    }

    fn build(config: TerminalConfig, seed: u64) -> Self {
        let mut world = Self {
            banner: WELCOME_BANNER,
            grid: WrappingGrid::new(config.grid_dimensions()),
            scroll: ScrollState::new(&config),
            progress: ProgressEngine::new(config.files_per_day, config.bar_cooldown()),
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock: Duration::ZERO,
            all_bars_full: Box::new(AnnounceAllBarsFull),
            config,
        };
        world.regenerate_grid(&mut Vec::new());
        world
    }

    fn regenerate_grid(&mut self, out_events: &mut Vec<Event>) {
        let summary = self.grid.generate(&mut self.rng);
        out_events.push(Event::GridGenerated {
            scary_tiles: summary.scary_tiles,
            prime_tiles: summary.prime_tiles,
        });
        out_events.push(Event::GridScrolled);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::GenerateGrid => world.regenerate_grid(out_events),
        Command::StartDay => {
            world.progress.begin_day(world.clock, out_events);
            world.regenerate_grid(out_events);
            out_events.push(Event::DayStarted);
        }
        Command::EndDay => world.progress.end_day(out_events),
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.progress.tick(dt, out_events);
        }
        Command::ApplyTrackballInput { axis_x, axis_y } => {
            world
                .scroll
                .apply_input(axis_x, axis_y, world.grid.dimensions());
            out_events.push(Event::GridScrolled);
        }
        Command::DropSelection { tiles, bar } => selection::resolve_drop(
            DropContext {
                grid: &mut world.grid,
                scroll: &world.scroll,
                progress: &mut world.progress,
                all_bars_full: world.all_bars_full.as_mut(),
                rng: &mut world.rng,
                now: world.clock,
            },
            &tiles,
            bar,
            out_events,
        ),
        Command::ApplyPendingChunk { bar } => world.progress.apply_chunk(
            bar,
            world.clock,
            world.all_bars_full.as_mut(),
            out_events,
        ),
        Command::ResetBars => world.progress.reset_bars(out_events),
        Command::CompleteFile => world.progress.complete_file(world.clock, out_events),
        Command::HighlightRandomPrime => {
            if let Some(index) = world.grid.activate_random_prime(&mut world.rng) {
                debug!(index = index.get(), "prime tile turned scary");
                out_events.push(Event::ScaryActivated { index });
            }
        }
        Command::StartBarCooldown { bar } => world.progress.start_cooldown(bar, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use refinement_core::{
        BarIndex, GlobalIndex, GridDimensions, ScaryFieldView, ScreenIndex, TerminalConfig,
        ViewportSnapshot, BAR_COUNT,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides the configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &TerminalConfig {
        &world.config
    }

    /// Dimensions of the global grid.
    #[must_use]
    pub fn dimensions(world: &World) -> GridDimensions {
        world.grid.dimensions()
    }

    /// Simulated time accumulated through [`refinement_core::Command::Tick`].
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Captures the current viewport position.
    #[must_use]
    pub fn viewport(world: &World) -> ViewportSnapshot {
        world.scroll.snapshot()
    }

    /// Exposes a read-only view of the scary flags.
    #[must_use]
    pub fn scary_field(world: &World) -> ScaryFieldView<'_> {
        world.grid.scary_view()
    }

    /// Value of the tile at an unbounded coordinate, wrapped onto the grid.
    #[must_use]
    pub fn grid_number(world: &World, x: i64, y: i64) -> u8 {
        world.grid.value_at(x, y)
    }

    /// Value of the tile at a global index, or zero outside the grid.
    #[must_use]
    pub fn tile_value(world: &World, index: GlobalIndex) -> u8 {
        world.grid.value(index)
    }

    /// Reports whether the tile at a global index is scary.
    #[must_use]
    pub fn is_scary(world: &World, index: GlobalIndex) -> bool {
        world.grid.is_scary(index)
    }

    /// Reports whether the visible tile at a screen index is scary.
    #[must_use]
    pub fn is_index_scary(world: &World, screen: ScreenIndex) -> bool {
        global_index_from_screen_index(world, screen)
            .map_or(false, |index| world.grid.is_scary(index))
    }

    /// Maps a viewport tile onto the global grid, or `None` outside the viewport.
    #[must_use]
    pub fn global_index_from_screen_index(world: &World, screen: ScreenIndex) -> Option<GlobalIndex> {
        world
            .scroll
            .screen_to_global(screen, world.grid.dimensions())
    }

    /// Indices of the 3x3 block around `center`, clipped at the grid edges.
    #[must_use]
    pub fn group_3x3(world: &World, center: GlobalIndex) -> Vec<GlobalIndex> {
        world.grid.neighborhood_3x3(center)
    }

    /// Number of tiles recorded as eligible for prime highlighting.
    #[must_use]
    pub fn prime_tile_count(world: &World) -> usize {
        world.grid.prime_count()
    }

    /// Captures every visible tile in row-major order.
    #[must_use]
    pub fn visible_tiles(world: &World) -> Vec<VisibleTile> {
        let dimensions = world.grid.dimensions();
        (0..world.scroll.visible_tile_count())
            .map(ScreenIndex::new)
            .filter_map(|screen| {
                let global = world.scroll.screen_to_global(screen, dimensions)?;
                Some(VisibleTile {
                    screen,
                    global,
                    value: world.grid.value(global),
                    scary: world.grid.is_scary(global),
                })
            })
            .collect()
    }

    /// Values of every progress bar.
    #[must_use]
    pub fn progress_bars(world: &World) -> [f32; BAR_COUNT] {
        world.progress.bars()
    }

    /// Value of a single bar, or zero for an invalid index.
    #[must_use]
    pub fn bar_progress(world: &World, bar: BarIndex) -> f32 {
        world.progress.bar_value(bar)
    }

    /// Reports whether the bar can receive a chunk: not cooling and not full.
    #[must_use]
    pub fn is_bar_available(world: &World, bar: BarIndex) -> bool {
        world.progress.is_bar_available(bar)
    }

    /// Reports whether the bar reached `1.0`.
    #[must_use]
    pub fn is_bar_full(world: &World, bar: BarIndex) -> bool {
        world.progress.is_bar_full(bar)
    }

    /// Remaining fraction of the bar's cooldown within `[0, 1]`.
    #[must_use]
    pub fn bar_cooldown_ratio(world: &World, bar: BarIndex) -> f32 {
        world.progress.cooldown_ratio(bar)
    }

    /// Mean of all bars within `[0, 1]`.
    #[must_use]
    pub fn master_progress(world: &World) -> f32 {
        world.progress.master_progress()
    }

    /// Chunk awaiting application, zero when none is pending.
    #[must_use]
    pub fn pending_chunk(world: &World) -> f32 {
        world.progress.pending_chunk()
    }

    /// Reports whether a positive chunk awaits application.
    #[must_use]
    pub fn has_pending_chunk(world: &World) -> bool {
        world.progress.pending_chunk() > 0.0
    }

    /// Captures the day/file counters.
    #[must_use]
    pub fn day_status(world: &World) -> DayStatus {
        DayStatus {
            active: world.progress.is_day_active(),
            files_refined: world.progress.files_refined(),
            files_per_day: world.progress.files_per_day(),
            started_at: world.progress.day_started_at(),
        }
    }

    /// Immutable representation of a visible tile.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct VisibleTile {
        /// Position of the tile inside the viewport.
        pub screen: ScreenIndex,
        /// Position of the tile inside the global grid.
        pub global: GlobalIndex,
        /// Value shown on the tile.
        pub value: u8,
        /// Indicates whether the tile is scary.
        pub scary: bool,
    }

    /// Immutable snapshot of the day/file state machine.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DayStatus {
        /// Indicates whether a day is in progress.
        pub active: bool,
        /// Files refined since the day started.
        pub files_refined: u32,
        /// Files required to finish the day.
        pub files_per_day: u32,
        /// Clock reading when the day started.
        pub started_at: Duration,
    }
}

/// Helpers that place tile state directly, for tests that need exact values.
#[cfg(feature = "scaffolding")]
pub mod scaffolding {
    use super::World;
    use refinement_core::GlobalIndex;

    /// Overwrites the value of a tile.
    pub fn set_tile_value(world: &mut World, index: GlobalIndex, value: u8) {
        world.grid.set_value(index, value);
    }

    /// Sets or clears the scary flag of a tile.
    pub fn set_scary(world: &mut World, index: GlobalIndex, scary: bool) {
        world.grid.set_scary(index, scary);
    }

    /// Clears every scary flag.
    pub fn clear_scary(world: &mut World) {
        world.grid.clear_scary();
    }
}
