//! Toroidal tile storage backing the terminal.

use rand::{seq::SliceRandom, Rng};
use refinement_core::{
    is_prime_value, GlobalIndex, GridDimensions, ScaryFieldView, SECTOR_MARGIN, SECTOR_SIZE,
    TILE_VALUE_MAX, TILE_VALUE_MIN,
};
use tracing::{debug, trace};

/// Dense tile values and scary flags of the global grid.
#[derive(Clone, Debug)]
pub(crate) struct WrappingGrid {
    dimensions: GridDimensions,
    values: Vec<u8>,
    scary: Vec<bool>,
    primes: Vec<GlobalIndex>,
}

/// Counts reported after a generation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct GenerationSummary {
    pub(crate) scary_tiles: usize,
    pub(crate) prime_tiles: usize,
}

/// State of a tile immediately before it was consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ConsumedTile {
    pub(crate) value: u8,
    pub(crate) was_scary: bool,
}

impl WrappingGrid {
    /// Creates an unfilled grid; every lookup reports zero until [`Self::generate`] runs.
    pub(crate) fn new(dimensions: GridDimensions) -> Self {
        Self {
            dimensions,
            values: Vec::new(),
            scary: Vec::new(),
            primes: Vec::new(),
        }
    }

    pub(crate) fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Reallocates and refills the grid, then seeds one scary tile per sector.
    pub(crate) fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GenerationSummary {
        let cells = self.dimensions.cell_count();
        self.values = (0..cells)
            .map(|_| rng.gen_range(TILE_VALUE_MIN..=TILE_VALUE_MAX))
            .collect();
        self.scary = vec![false; cells];
        self.primes = self
            .values
            .iter()
            .enumerate()
            .filter(|(_, value)| is_prime_value(**value))
            .map(|(index, _)| GlobalIndex::new(index))
            .collect();

        let width = self.dimensions.width();
        let height = self.dimensions.height();
        let mut scary_tiles = 0;
        for sector_row in (0..height).step_by(SECTOR_SIZE as usize) {
            let extent_y = (height - sector_row).min(SECTOR_SIZE);
            for sector_column in (0..width).step_by(SECTOR_SIZE as usize) {
                let extent_x = (width - sector_column).min(SECTOR_SIZE);
                let column = sector_column + interior_offset(extent_x, rng);
                let row = sector_row + interior_offset(extent_y, rng);
                let Some(index) = self.dimensions.wrap(i64::from(column), i64::from(row)) else {
                    continue;
                };
                if let Some(flag) = self.scary.get_mut(index.get()) {
                    *flag = true;
                    scary_tiles += 1;
                    trace!(index = index.get(), "scary tile seeded");
                }
            }
        }

        let summary = GenerationSummary {
            scary_tiles,
            prime_tiles: self.primes.len(),
        };
        debug!(
            width,
            height,
            scary_tiles = summary.scary_tiles,
            prime_tiles = summary.prime_tiles,
            "global grid generated"
        );
        summary
    }

    pub(crate) fn wrap(&self, x: i64, y: i64) -> Option<GlobalIndex> {
        self.dimensions.wrap(x, y)
    }

    /// Value stored at the index, or zero outside the grid.
    pub(crate) fn value(&self, index: GlobalIndex) -> u8 {
        self.values.get(index.get()).copied().unwrap_or(0)
    }

    pub(crate) fn value_at(&self, x: i64, y: i64) -> u8 {
        self.wrap(x, y).map_or(0, |index| self.value(index))
    }

    pub(crate) fn is_scary(&self, index: GlobalIndex) -> bool {
        self.scary.get(index.get()).copied().unwrap_or(false)
    }

    pub(crate) fn scary_view(&self) -> ScaryFieldView<'_> {
        ScaryFieldView::new(&self.scary, self.dimensions)
    }

    pub(crate) fn prime_count(&self) -> usize {
        self.primes.len()
    }

    /// Clears the scary flag of the tile and draws a fresh value for it.
    pub(crate) fn consume_and_respawn<R: Rng + ?Sized>(
        &mut self,
        index: GlobalIndex,
        rng: &mut R,
    ) -> Option<ConsumedTile> {
        let value = self.values.get_mut(index.get())?;
        let consumed = *value;
        *value = rng.gen_range(TILE_VALUE_MIN..=TILE_VALUE_MAX);

        let was_scary = match self.scary.get_mut(index.get()) {
            Some(flag) => std::mem::replace(flag, false),
            None => false,
        };

        Some(ConsumedTile {
            value: consumed,
            was_scary,
        })
    }

    /// Indices of the 3x3 block around the centre, clipped at the grid edges.
    ///
    /// Unlike every other lookup this one does not wrap.
    pub(crate) fn neighborhood_3x3(&self, center: GlobalIndex) -> Vec<GlobalIndex> {
        let Some((column, row)) = self.dimensions.coordinates(center) else {
            return Vec::new();
        };
        let width = i64::from(self.dimensions.width());
        let height = i64::from(self.dimensions.height());

        let mut group = Vec::with_capacity(9);
        for y in i64::from(row) - 1..=i64::from(row) + 1 {
            for x in i64::from(column) - 1..=i64::from(column) + 1 {
                if (0..width).contains(&x) && (0..height).contains(&y) {
                    if let Ok(index) = usize::try_from(y * width + x) {
                        group.push(GlobalIndex::new(index));
                    }
                }
            }
        }
        group
    }

    /// Marks one randomly chosen prime tile that is not already scary.
    ///
    /// The prime list is recorded at generation while drops keep respawning
    /// values, so candidates are rechecked against their current value.
    pub(crate) fn activate_random_prime<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Option<GlobalIndex> {
        let candidates: Vec<GlobalIndex> = self
            .primes
            .iter()
            .copied()
            .filter(|index| is_prime_value(self.value(*index)) && !self.is_scary(*index))
            .collect();

        let chosen = *candidates.choose(rng)?;
        if let Some(flag) = self.scary.get_mut(chosen.get()) {
            *flag = true;
        }
        Some(chosen)
    }

    #[cfg(any(test, feature = "scaffolding"))]
    pub(crate) fn set_value(&mut self, index: GlobalIndex, value: u8) {
        if let Some(slot) = self.values.get_mut(index.get()) {
            *slot = value;
        }
    }

    #[cfg(any(test, feature = "scaffolding"))]
    pub(crate) fn set_scary(&mut self, index: GlobalIndex, scary: bool) {
        if let Some(flag) = self.scary.get_mut(index.get()) {
            *flag = scary;
        }
    }

    #[cfg(any(test, feature = "scaffolding"))]
    pub(crate) fn clear_scary(&mut self) {
        self.scary.fill(false);
    }
}

/// Picks an offset inside a sector of the given extent, keeping clear of its edges
/// whenever the sector is wide enough to allow it.
fn interior_offset<R: Rng + ?Sized>(extent: u32, rng: &mut R) -> u32 {
    if extent > 2 * SECTOR_MARGIN {
        rng.gen_range(SECTOR_MARGIN..=extent - SECTOR_MARGIN)
    } else {
        rng.gen_range(0..extent)
    }
}
