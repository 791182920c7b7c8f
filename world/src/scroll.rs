//! Sub-tile trackball scrolling over the toroidal grid.

use refinement_core::{
    wrap_coordinate, GlobalIndex, GridDimensions, ScreenIndex, TerminalConfig, ViewportSnapshot,
};

/// Discrete viewport position plus the fractional motion not yet applied to it.
#[derive(Clone, Debug)]
pub(crate) struct ScrollState {
    scroll_x: u32,
    scroll_y: u32,
    accumulator_x: f32,
    accumulator_y: f32,
    sensitivity: f32,
    viewport_width: u32,
    viewport_height: u32,
}

impl ScrollState {
    pub(crate) fn new(config: &TerminalConfig) -> Self {
        Self {
            scroll_x: wrap_coordinate(i64::from(config.scroll_origin_x), config.global_width),
            scroll_y: wrap_coordinate(i64::from(config.scroll_origin_y), config.global_height),
            accumulator_x: 0.0,
            accumulator_y: 0.0,
            sensitivity: config.scroll_sensitivity,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
        }
    }

    /// Accumulates inverted input and moves the viewport by whole tiles.
    pub(crate) fn apply_input(&mut self, axis_x: f32, axis_y: f32, dimensions: GridDimensions) {
        let step_x = accumulate(&mut self.accumulator_x, axis_x, self.sensitivity);
        let step_y = accumulate(&mut self.accumulator_y, axis_y, self.sensitivity);

        self.scroll_x = wrap_coordinate(
            i64::from(self.scroll_x).saturating_add(step_x),
            dimensions.width(),
        );
        self.scroll_y = wrap_coordinate(
            i64::from(self.scroll_y).saturating_add(step_y),
            dimensions.height(),
        );
    }

    /// Maps a viewport tile onto the global grid.
    ///
    /// Returns `None` for indices outside the viewport.
    pub(crate) fn screen_to_global(
        &self,
        screen: ScreenIndex,
        dimensions: GridDimensions,
    ) -> Option<GlobalIndex> {
        if screen.get() >= self.visible_tile_count() {
            return None;
        }
        let local_x = screen.get() % self.viewport_width;
        let local_y = screen.get() / self.viewport_width;
        dimensions.wrap(
            i64::from(self.scroll_x) + i64::from(local_x),
            i64::from(self.scroll_y) + i64::from(local_y),
        )
    }

    pub(crate) fn visible_tile_count(&self) -> u32 {
        self.viewport_width.saturating_mul(self.viewport_height)
    }

    pub(crate) fn snapshot(&self) -> ViewportSnapshot {
        ViewportSnapshot {
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
            accumulator_x: self.accumulator_x,
            accumulator_y: self.accumulator_y,
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }
}

/// Adds the inverted, scaled input to the accumulator and extracts its whole part.
fn accumulate(accumulator: &mut f32, input: f32, sensitivity: f32) -> i64 {
    let delta = -input * sensitivity;
    if delta.is_finite() {
        *accumulator += delta;
    }
    let whole = accumulator.trunc();
    *accumulator -= whole;
    whole as i64
}
