//! Scripted player that drives a terminal through a day.

use std::{cmp::Reverse, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use refinement_core::{BarIndex, Command, ConfigError, Event, ScreenIndex};
use refinement_system_bootstrap::Bootstrap;
use refinement_system_prime_highlight::{Config as HighlightConfig, PrimeHighlighting};
use refinement_system_sensor::{Config as SensorConfig, ScarySensor};
use refinement_world::{self as world, query, World};
use tracing::{debug, trace};

use crate::{config::Settings, render::render_frame};

/// Counters accumulated while a session runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SessionReport {
    pub(crate) steps: usize,
    pub(crate) chunks_applied: usize,
    pub(crate) tiles_cleared: usize,
    pub(crate) scary_consumed: usize,
    pub(crate) highlights: usize,
    pub(crate) files_refined: u32,
    pub(crate) day_duration: Option<Duration>,
}

/// Terminal plus the systems and scripted player operating it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    bootstrap: Bootstrap,
    sensor: ScarySensor,
    highlighting: PrimeHighlighting,
    rng: ChaCha8Rng,
    tick: Duration,
    selection_size: usize,
    drift: f32,
    report: SessionReport,
}

impl Session {
    pub(crate) fn new(settings: &Settings, seed: u64) -> Result<Self, ConfigError> {
        let world = World::with_config(settings.terminal.clone(), seed)?;
        Ok(Self {
            world,
            bootstrap: Bootstrap,
            sensor: ScarySensor::new(SensorConfig::new(settings.terminal.sensor_max_distance)),
            highlighting: PrimeHighlighting::new(HighlightConfig::new(
                settings.autoplay.highlight_interval(),
            )),
            rng: ChaCha8Rng::seed_from_u64(seed.rotate_left(17)),
            tick: settings.autoplay.tick(),
            selection_size: settings.autoplay.selection_size,
            drift: settings.autoplay.drift,
            report: SessionReport::default(),
        })
    }

    pub(crate) fn banner(&self) -> &'static str {
        self.bootstrap.welcome_banner(&self.world)
    }

    /// Starts a day and steps until it completes or `max_steps` elapse.
    pub(crate) fn run(
        &mut self,
        max_steps: usize,
        mut on_frame: impl FnMut(&Self),
    ) -> SessionReport {
        let _ = self.dispatch(Command::StartDay);
        on_frame(self);
        for _ in 0..max_steps {
            let day_active = self.step();
            on_frame(self);
            if !day_active {
                break;
            }
        }
        self.report
    }

    /// Performs one tick of play and reports whether the day is still running.
    pub(crate) fn step(&mut self) -> bool {
        let advanced = self.dispatch(Command::Tick { dt: self.tick });
        let mut commands = Vec::new();
        self.highlighting
            .handle(&advanced, query::day_status(&self.world).active, &mut commands);
        for command in commands {
            let _ = self.dispatch(command);
        }

        if self.drift > 0.0 {
            let axis_x = self.rng.gen_range(-self.drift..=self.drift);
            let axis_y = self.rng.gen_range(-self.drift..=self.drift);
            let _ = self.dispatch(Command::ApplyTrackballInput { axis_x, axis_y });
        }

        if let Some(bar) = self.least_filled_available_bar() {
            let tiles = self.best_visible_tiles();
            let events = self.dispatch(Command::DropSelection { tiles, bar });
            if events.contains(&Event::ChunkConsumed) && !query::is_bar_full(&self.world, bar) {
                let _ = self.dispatch(Command::StartBarCooldown { bar });
            }
        }

        self.report.steps += 1;
        query::day_status(&self.world).active
    }

    pub(crate) fn proximity(&self) -> f32 {
        self.sensor
            .proximity(&query::scary_field(&self.world), &query::viewport(&self.world))
    }

    pub(crate) fn frame(&self) -> String {
        render_frame(
            &self.bootstrap.visible_tiles(&self.world),
            &self.bootstrap.status(&self.world),
            self.proximity(),
        )
    }

    fn least_filled_available_bar(&self) -> Option<BarIndex> {
        BarIndex::all()
            .filter(|bar| query::is_bar_available(&self.world, *bar))
            .min_by(|left, right| {
                query::bar_progress(&self.world, *left)
                    .total_cmp(&query::bar_progress(&self.world, *right))
            })
    }

    /// Scary tiles first, then the highest values, ties in row-major order.
    fn best_visible_tiles(&self) -> Vec<ScreenIndex> {
        let mut tiles = self.bootstrap.visible_tiles(&self.world);
        tiles.sort_by_key(|tile| Reverse((tile.scary, tile.value)));
        tiles
            .into_iter()
            .take(self.selection_size)
            .map(|tile| tile.screen)
            .collect()
    }

    fn dispatch(&mut self, command: Command) -> Vec<Event> {
        trace!(?command, "dispatching command");
        let scary_before = query::scary_field(&self.world).active_count();
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        for event in &events {
            match event {
                Event::ChunkConsumed => self.report.chunks_applied += 1,
                Event::GroupCleared { indices } => {
                    self.report.tiles_cleared += indices.len();
                    let scary_after = query::scary_field(&self.world).active_count();
                    self.report.scary_consumed += scary_before.saturating_sub(scary_after);
                }
                Event::ScaryActivated { .. } => self.report.highlights += 1,
                Event::FileCompleted { done, .. } => self.report.files_refined = *done,
                Event::DayComplete { duration } => self.report.day_duration = Some(*duration),
                Event::TimeAdvanced { .. } | Event::GridScrolled => continue,
                _ => {}
            }
            debug!(?event, "terminal event");
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse;

    fn compact_settings() -> Settings {
        parse(
            "[terminal]\nglobal_width = 120\nglobal_height = 120\nscroll_origin_x = 60\nscroll_origin_y = 60\n",
        )
        .expect("valid settings")
    }

    #[test]
    fn autoplay_finishes_the_day() {
        let mut session = Session::new(&compact_settings(), 42).expect("valid config");
        let report = session.run(5_000, |_| {});

        assert_eq!(report.files_refined, 2);
        assert!(report.day_duration.is_some());
        assert!(report.steps < 5_000);
        assert!(report.chunks_applied >= 8);
        assert!(report.tiles_cleared >= report.chunks_applied);
        assert!(!query::day_status(&session.world).active);
    }

    #[test]
    fn sessions_with_the_same_seed_replay_identically() {
        let mut first = Session::new(&compact_settings(), 7).expect("valid config");
        let mut second = Session::new(&compact_settings(), 7).expect("valid config");
        let mut first_frames = Vec::new();
        let mut second_frames = Vec::new();

        let first_report = first.run(40, |session| first_frames.push(session.frame()));
        let second_report = second.run(40, |session| second_frames.push(session.frame()));

        assert_eq!(first_report, second_report);
        assert_eq!(first_frames, second_frames);
    }

    #[test]
    fn selection_prefers_scary_then_high_values() {
        let session = Session::new(&compact_settings(), 3).expect("valid config");
        let chosen = session.best_visible_tiles();
        assert_eq!(chosen.len(), 6);

        let tiles = session.bootstrap.visible_tiles(&session.world);
        let ranked: Vec<(bool, u8)> = chosen
            .iter()
            .map(|screen| {
                let tile = tiles[screen.get() as usize];
                (tile.scary, tile.value)
            })
            .collect();
        assert!(ranked.windows(2).all(|pair| pair[0] >= pair[1]));
        let weakest = ranked[ranked.len() - 1];
        let unchosen_best = tiles
            .iter()
            .filter(|tile| !chosen.contains(&tile.screen))
            .map(|tile| (tile.scary, tile.value))
            .max()
            .expect("more tiles than the selection");
        assert!(unchosen_best <= weakest);
    }

    #[test]
    fn chunks_put_their_bar_into_cooldown() {
        let mut session = Session::new(&compact_settings(), 9).expect("valid config");
        let _ = session.dispatch(Command::StartDay);
        let _ = session.step();

        let cooling = BarIndex::all()
            .filter(|bar| query::bar_cooldown_ratio(&session.world, *bar) > 0.0)
            .count();
        assert_eq!(cooling, 1);
    }
}
