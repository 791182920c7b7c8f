#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that measures how close the nearest scary tile is to the
//! viewport centre.
//!
//! The sensor is pull-based: callers ask for a reading whenever they need one
//! and pass in read-only views of the world. Distances are measured between
//! unwrapped scan coordinates and the continuous viewport centre, so the
//! signal stays continuous while the viewport crosses the wrap seam.

use refinement_core::{GlobalIndex, ScaryFieldView, ViewportSnapshot};

/// Default distance, in tiles, beyond which a scary tile is not sensed.
pub const DEFAULT_MAX_DISTANCE: f32 = 15.0;

/// Configuration parameters for the scary sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    max_distance: f32,
}

impl Config {
    /// Creates a configuration with the provided detection distance.
    #[must_use]
    pub const fn new(max_distance: f32) -> Self {
        Self { max_distance }
    }

    /// Distance, in tiles, at which proximity falls to zero.
    #[must_use]
    pub const fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Half-extent of the scan window beyond the viewport, in whole tiles.
    ///
    /// One extra tile covers the sub-tile offset of the viewport centre. The
    /// float to integer cast saturates for huge distances.
    fn search_radius(&self) -> i64 {
        (self.max_distance.ceil() as i64).saturating_add(1)
    }
}

/// Inclusive range of unwrapped coordinates scanned along one axis.
///
/// A window wider than the grid period would only revisit images of tiles it
/// already covers, so it is replaced by the single period centred on the
/// viewport, which holds the nearest image of every tile.
fn scan_range(origin: u32, visible: u32, radius: i64, center: f32, period: u32) -> (i64, i64) {
    let first = i64::from(origin).saturating_sub(radius);
    let last = i64::from(origin)
        .saturating_add(i64::from(visible))
        .saturating_add(radius);
    if last.saturating_sub(first) < i64::from(period) {
        return (first, last);
    }
    let first = (center - period as f32 / 2.0).ceil() as i64;
    (first, first + i64::from(period) - 1)
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE)
    }
}

/// Nearest scary tile found by a scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorReading {
    /// Global index of the nearest scary tile.
    pub index: GlobalIndex,
    /// Euclidean distance from the viewport centre in tiles.
    pub distance: f32,
}

/// Scary tile proximity sensor.
#[derive(Debug, Default)]
pub struct ScarySensor {
    config: Config,
}

impl ScarySensor {
    /// Creates a new sensor using the provided configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Normalised proximity in `[0, 1]`: `1` at the centre, `0` when nothing is in range.
    #[must_use]
    pub fn proximity(&self, field: &ScaryFieldView<'_>, viewport: &ViewportSnapshot) -> f32 {
        self.nearest(field, viewport).map_or(0.0, |reading| {
            (1.0 - reading.distance / self.config.max_distance()).clamp(0.0, 1.0)
        })
    }

    /// Finds the scary tile closest to the viewport centre within the detection distance.
    #[must_use]
    pub fn nearest(
        &self,
        field: &ScaryFieldView<'_>,
        viewport: &ViewportSnapshot,
    ) -> Option<SensorReading> {
        let max_distance = self.config.max_distance();
        let dimensions = field.dimensions();
        if !max_distance.is_finite() || max_distance <= 0.0 || dimensions.is_empty() {
            return None;
        }

        let (center_x, center_y) = viewport.center();
        let radius = self.config.search_radius();
        let (first_column, last_column) = scan_range(
            viewport.scroll_x,
            viewport.width,
            radius,
            center_x,
            dimensions.width(),
        );
        let (first_row, last_row) = scan_range(
            viewport.scroll_y,
            viewport.height,
            radius,
            center_y,
            dimensions.height(),
        );

        let mut best: Option<(f32, GlobalIndex)> = None;
        let mut best_distance_sq = max_distance * max_distance;

        for y in first_row..=last_row {
            let dy = y as f32 - center_y;
            for x in first_column..=last_column {
                let Some(index) = dimensions.wrap(x, y) else {
                    continue;
                };
                if !field.is_scary(index) {
                    continue;
                }
                let dx = x as f32 - center_x;
                let distance_sq = dx * dx + dy * dy;
                if distance_sq < best_distance_sq {
                    best_distance_sq = distance_sq;
                    best = Some((distance_sq, index));
                }
            }
        }

        best.map(|(distance_sq, index)| SensorReading {
            index,
            distance: distance_sq.sqrt(),
        })
    }
}
