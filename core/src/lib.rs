#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Refinement terminal engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative terminal world, and pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that presentation, audio and systems react to. Systems consume event
//! streams, query immutable views such as [`ScaryFieldView`] and
//! [`ViewportSnapshot`], and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the terminal boots.
pub const WELCOME_BANNER: &str = "Welcome to Macrodata Refinement.";

/// Number of progress bars a file is refined into.
pub const BAR_COUNT: usize = 4;

/// Edge length of the square sectors that each seed exactly one scary tile.
pub const SECTOR_SIZE: u32 = 50;

/// Distance kept between a sector edge and the scary tile it seeds.
pub const SECTOR_MARGIN: u32 = 5;

/// Smallest value a tile can hold.
pub const TILE_VALUE_MIN: u8 = 1;

/// Largest value a tile can hold.
pub const TILE_VALUE_MAX: u8 = 9;

/// Tile values treated as prime. The value domain is closed, so this is a
/// lookup table rather than a primality test.
pub const PRIME_TILE_VALUES: [u8; 4] = [2, 3, 5, 7];

/// Progress contributed by a single point of tile value.
pub const VALUE_PROGRESS_SCALE: f32 = 0.005;

/// Bonus applied to the contribution of a scary tile.
pub const SCARY_VALUE_MULTIPLIER: f32 = 4.0;

/// Reward multiplier applied when a pending chunk lands in a bar.
pub const CHUNK_REWARD_MULTIPLIER: f32 = 1.5;

/// Reports whether the tile value belongs to the prime lookup table.
#[must_use]
pub fn is_prime_value(value: u8) -> bool {
    PRIME_TILE_VALUES.contains(&value)
}

/// Reduces `value` into `[0, modulus)` using floored modulo.
///
/// This is the single wrapping rule of the toroidal grid. A zero modulus
/// yields zero instead of dividing by zero.
#[must_use]
pub fn wrap_coordinate(value: i64, modulus: u32) -> u32 {
    if modulus == 0 {
        return 0;
    }
    let wrapped = value.rem_euclid(i64::from(modulus));
    u32::try_from(wrapped).unwrap_or(0)
}

/// Commands that express all permissible terminal mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Refills the global grid with fresh values and reseeds scary tiles.
    GenerateGrid,
    /// Begins a working day: records the start time, clears progress and
    /// regenerates the grid.
    StartDay,
    /// Ends the current working day unconditionally.
    EndDay,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Feeds continuous two-axis trackball motion into the scroll state.
    ApplyTrackballInput {
        /// Horizontal input axis. Positive values scroll the content left.
        axis_x: f32,
        /// Vertical input axis. Positive values scroll the content up.
        axis_y: f32,
    },
    /// Consumes a selection of visible tiles and deposits its value into a bar.
    DropSelection {
        /// Screen indices of the selected tiles in row-major viewport order.
        tiles: Vec<ScreenIndex>,
        /// Bar that receives the resulting chunk.
        bar: BarIndex,
    },
    /// Applies the pending chunk, if any, to the provided bar.
    ApplyPendingChunk {
        /// Bar that receives the pending chunk.
        bar: BarIndex,
    },
    /// Zeroes every progress bar.
    ResetBars,
    /// Marks the current file as refined.
    CompleteFile,
    /// Activates one random prime-valued tile that is not already scary.
    HighlightRandomPrime,
    /// Places a bar into cooldown for the configured duration.
    StartBarCooldown {
        /// Bar entering cooldown.
        bar: BarIndex,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the global grid was regenerated.
    GridGenerated {
        /// Number of scary tiles seeded across all sectors.
        scary_tiles: usize,
        /// Number of tiles recorded as eligible for prime highlighting.
        prime_tiles: usize,
    },
    /// Indicates that the visible tiles may have changed and should be redrawn.
    GridScrolled,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports the new value of a single progress bar.
    ProgressUpdated {
        /// Bar whose value changed.
        bar: BarIndex,
        /// Value of the bar after the change, within `[0, 1]`.
        value: f32,
    },
    /// Announces that a drop produced a chunk awaiting application.
    ChunkReady {
        /// Raw progress carried by the chunk before the reward multiplier.
        value: f32,
    },
    /// Confirms that the pending chunk landed in a bar.
    ChunkConsumed,
    /// Reports that the pending chunk could not be applied.
    ChunkRejected {
        /// Bar the chunk was aimed at.
        bar: BarIndex,
        /// Specific reason the chunk was not applied.
        reason: ChunkRejection,
    },
    /// Lists the global tiles consumed and respawned by a drop.
    GroupCleared {
        /// Global indices of the consumed tiles in selection order.
        indices: Vec<GlobalIndex>,
    },
    /// Confirms that a prime tile became scary.
    ScaryActivated {
        /// Global index of the newly scary tile.
        index: GlobalIndex,
    },
    /// Announces that a bar entered cooldown.
    BarCooldownStarted {
        /// Bar entering cooldown.
        bar: BarIndex,
        /// Length of the cooldown.
        duration: Duration,
    },
    /// Announces that a bar left cooldown.
    BarCooldownEnded {
        /// Bar leaving cooldown.
        bar: BarIndex,
    },
    /// Announces that a working day began.
    DayStarted,
    /// Announces that the working day was ended explicitly.
    DayCompleted,
    /// Reports that a file was refined.
    FileCompleted {
        /// Files refined so far during the day.
        done: u32,
        /// Files required to finish the day.
        target: u32,
    },
    /// Reports that the final file of the day was refined.
    DayComplete {
        /// Simulated time elapsed since the day started.
        duration: Duration,
    },
    /// Requests that the presentation offer the next file.
    FileSelectionRequested,
    /// Announces that every bar is full.
    AllBarsFull,
}

/// Reasons a pending chunk may be left unapplied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkRejection {
    /// No working day is active.
    DayInactive,
    /// No positive chunk is pending.
    NothingPending,
    /// The bar index does not name one of the progress bars.
    InvalidBar,
    /// The bar is already full.
    BarFull,
}

/// Index of a cell inside the dense global grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalIndex(usize);

impl GlobalIndex {
    /// Creates a new global index with the provided numeric value.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Index of a tile inside the viewport, counted row-major from the top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreenIndex(u32);

impl ScreenIndex {
    /// Creates a new screen index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifies one of the progress bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BarIndex(usize);

impl BarIndex {
    /// Creates a new bar index with the provided numeric value.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Reports whether the index names one of the [`BAR_COUNT`] bars.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 < BAR_COUNT
    }

    /// Iterates over every valid bar index in order.
    pub fn all() -> impl Iterator<Item = BarIndex> {
        (0..BAR_COUNT).map(BarIndex)
    }
}

/// Size of the toroidal global grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    width: u32,
    height: u32,
}

impl GridDimensions {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells, or zero when the product does not fit `usize`.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let cells = u64::from(self.width) * u64::from(self.height);
        usize::try_from(cells).unwrap_or(0)
    }

    /// Reports whether either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Wraps an unbounded coordinate pair onto the torus.
    ///
    /// Returns `None` only for an empty grid.
    #[must_use]
    pub fn wrap(&self, x: i64, y: i64) -> Option<GlobalIndex> {
        if self.is_empty() {
            return None;
        }
        let column = usize::try_from(wrap_coordinate(x, self.width)).ok()?;
        let row = usize::try_from(wrap_coordinate(y, self.height)).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(GlobalIndex::new(row * width + column))
    }

    /// Splits a global index into its column and row.
    #[must_use]
    pub fn coordinates(&self, index: GlobalIndex) -> Option<(u32, u32)> {
        if !self.contains(index) {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let column = u32::try_from(index.get() % width).ok()?;
        let row = u32::try_from(index.get() / width).ok()?;
        Some((column, row))
    }

    /// Reports whether the index addresses a cell of the grid.
    #[must_use]
    pub fn contains(&self, index: GlobalIndex) -> bool {
        index.get() < self.cell_count()
    }
}

/// Read-only view over the scary flags of the global grid.
#[derive(Clone, Copy, Debug)]
pub struct ScaryFieldView<'a> {
    flags: &'a [bool],
    dimensions: GridDimensions,
}

impl<'a> ScaryFieldView<'a> {
    /// Captures a new view backed by the provided flag slice.
    #[must_use]
    pub fn new(flags: &'a [bool], dimensions: GridDimensions) -> Self {
        Self { flags, dimensions }
    }

    /// Dimensions of the grid the flags belong to.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Reports whether the cell at the global index is scary.
    #[must_use]
    pub fn is_scary(&self, index: GlobalIndex) -> bool {
        self.flags.get(index.get()).copied().unwrap_or(false)
    }

    /// Reports whether the cell at the unbounded coordinate is scary after wrapping.
    #[must_use]
    pub fn is_scary_at(&self, x: i64, y: i64) -> bool {
        self.dimensions
            .wrap(x, y)
            .map_or(false, |index| self.is_scary(index))
    }

    /// Number of scary cells currently flagged.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.flags.iter().filter(|flag| **flag).count()
    }
}

/// Immutable snapshot of the viewport position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSnapshot {
    /// Global column of the top-left visible tile.
    pub scroll_x: u32,
    /// Global row of the top-left visible tile.
    pub scroll_y: u32,
    /// Horizontal sub-tile motion not yet converted into a scroll step.
    pub accumulator_x: f32,
    /// Vertical sub-tile motion not yet converted into a scroll step.
    pub accumulator_y: f32,
    /// Number of visible columns.
    pub width: u32,
    /// Number of visible rows.
    pub height: u32,
}

impl ViewportSnapshot {
    /// Continuous position of the viewport centre in global tile units.
    ///
    /// The value is not wrapped so it stays continuous with the scroll
    /// position it was derived from.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        let x = self.scroll_x as f32 + self.accumulator_x + (self.width as f32 / 2.0 - 0.5);
        let y = self.scroll_y as f32 + self.accumulator_y + (self.height as f32 / 2.0 - 0.5);
        (x, y)
    }
}

/// Upper bound on the number of cells a configured grid may allocate.
pub const MAX_GRID_CELLS: u64 = 1 << 28;

/// Tunable parameters of a terminal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalConfig {
    /// Number of visible columns.
    pub viewport_width: u32,
    /// Number of visible rows.
    pub viewport_height: u32,
    /// Number of columns in the global grid.
    pub global_width: u32,
    /// Number of rows in the global grid.
    pub global_height: u32,
    /// Global column the viewport starts at.
    pub scroll_origin_x: u32,
    /// Global row the viewport starts at.
    pub scroll_origin_y: u32,
    /// Scale applied to trackball input before it is accumulated.
    pub scroll_sensitivity: f32,
    /// Length of a bar cooldown in seconds.
    pub bar_cooldown_seconds: f32,
    /// Number of files refined to finish a day.
    pub files_per_day: u32,
    /// Distance, in tiles, at which the scary sensor starts reacting.
    pub sensor_max_distance: f32,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            viewport_width: 10,
            viewport_height: 10,
            global_width: 1_000,
            global_height: 1_000,
            scroll_origin_x: 500,
            scroll_origin_y: 500,
            scroll_sensitivity: 0.5,
            bar_cooldown_seconds: 2.5,
            files_per_day: 2,
            sensor_max_distance: 15.0,
        }
    }
}

impl TerminalConfig {
    /// Dimensions of the global grid.
    #[must_use]
    pub const fn grid_dimensions(&self) -> GridDimensions {
        GridDimensions::new(self.global_width, self.global_height)
    }

    /// Checks every field for values the terminal cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::EmptyViewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        if self.global_width == 0 || self.global_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.global_width,
                height: self.global_height,
            });
        }
        let cells = u64::from(self.global_width) * u64::from(self.global_height);
        if cells > MAX_GRID_CELLS || usize::try_from(cells).is_err() {
            return Err(ConfigError::GridTooLarge { cells });
        }
        check_tuning("scroll_sensitivity", self.scroll_sensitivity)?;
        check_tuning("bar_cooldown_seconds", self.bar_cooldown_seconds)?;
        check_tuning("sensor_max_distance", self.sensor_max_distance)?;
        if self.files_per_day == 0 {
            return Err(ConfigError::NoFilesPerDay);
        }
        Ok(())
    }

    /// Bar cooldown expressed as a [`Duration`].
    #[must_use]
    pub fn bar_cooldown(&self) -> Duration {
        Duration::try_from_secs_f32(self.bar_cooldown_seconds).unwrap_or(Duration::ZERO)
    }
}

fn check_tuning(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidTuning { field, value })
    }
}

/// Reasons a [`TerminalConfig`] may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The viewport has no visible tiles.
    #[error("viewport must be at least 1x1, got {width}x{height}")]
    EmptyViewport {
        /// Configured viewport width.
        width: u32,
        /// Configured viewport height.
        height: u32,
    },
    /// The global grid has no cells.
    #[error("global grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid {
        /// Configured grid width.
        width: u32,
        /// Configured grid height.
        height: u32,
    },
    /// The global grid exceeds [`MAX_GRID_CELLS`].
    #[error("global grid of {cells} cells exceeds the supported maximum")]
    GridTooLarge {
        /// Requested number of cells.
        cells: u64,
    },
    /// A tuning value is negative or not finite.
    #[error("`{field}` must be finite and non-negative, got {value}")]
    InvalidTuning {
        /// Name of the offending field.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A day would never require any files.
    #[error("`files_per_day` must be at least 1")]
    NoFilesPerDay,
}
