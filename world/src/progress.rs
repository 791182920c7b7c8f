//! Progress bars, bar cooldowns and the day/file state machine.

use std::time::Duration;

use refinement_core::{BarIndex, ChunkRejection, Event, BAR_COUNT, CHUNK_REWARD_MULTIPLIER};
use tracing::{debug, info};

use crate::AllBarsFullHook;

/// Owns the four bars, their cooldowns, the pending chunk and the day counters.
#[derive(Clone, Debug)]
pub(crate) struct ProgressEngine {
    bars: [f32; BAR_COUNT],
    cooling: [bool; BAR_COUNT],
    cooldown_remaining: [f32; BAR_COUNT],
    cooldown: Duration,
    pending_chunk: f32,
    files_per_day: u32,
    files_refined: u32,
    day_active: bool,
    day_started_at: Duration,
}

impl ProgressEngine {
    pub(crate) fn new(files_per_day: u32, cooldown: Duration) -> Self {
        Self {
            bars: [0.0; BAR_COUNT],
            cooling: [false; BAR_COUNT],
            cooldown_remaining: [0.0; BAR_COUNT],
            cooldown,
            pending_chunk: 0.0,
            files_per_day,
            files_refined: 0,
            day_active: false,
            day_started_at: Duration::ZERO,
        }
    }

    /// Activates the day and starts its first file from empty bars.
    pub(crate) fn begin_day(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        self.day_active = true;
        self.day_started_at = now;
        self.files_refined = 0;
        self.pending_chunk = 0.0;
        self.reset_bars(out_events);
        info!(files_per_day = self.files_per_day, "day started");
    }

    pub(crate) fn end_day(&mut self, out_events: &mut Vec<Event>) {
        self.day_active = false;
        info!(files_refined = self.files_refined, "day ended");
        out_events.push(Event::DayCompleted);
    }

    /// Zeroes every bar and clears any running cooldown.
    pub(crate) fn reset_bars(&mut self, out_events: &mut Vec<Event>) {
        for bar in BarIndex::all() {
            let slot = bar.get();
            if self.cooling[slot] {
                self.cooling[slot] = false;
                self.cooldown_remaining[slot] = 0.0;
                out_events.push(Event::BarCooldownEnded { bar });
            }
            self.bars[slot] = 0.0;
            out_events.push(Event::ProgressUpdated { bar, value: 0.0 });
        }
    }

    /// Replaces the pending chunk. Only one chunk is ever pending.
    pub(crate) fn set_pending_chunk(&mut self, value: f32, out_events: &mut Vec<Event>) {
        self.pending_chunk = value;
        if value > 0.0 {
            out_events.push(Event::ChunkReady { value });
        }
    }

    pub(crate) fn apply_chunk(
        &mut self,
        bar: BarIndex,
        now: Duration,
        all_bars_full: &mut dyn AllBarsFullHook,
        out_events: &mut Vec<Event>,
    ) {
        if let Err(reason) = self.check_chunk(bar) {
            debug!(bar = bar.get(), ?reason, "chunk not applied");
            out_events.push(Event::ChunkRejected { bar, reason });
            return;
        }

        let slot = &mut self.bars[bar.get()];
        *slot = (*slot + self.pending_chunk * CHUNK_REWARD_MULTIPLIER).clamp(0.0, 1.0);
        let value = *slot;
        self.pending_chunk = 0.0;
        out_events.push(Event::ChunkConsumed);
        out_events.push(Event::ProgressUpdated { bar, value });

        // Both predicates and the bars handed to the hook are sampled before
        // file completion can reset the bars.
        let file_refined = self.master_progress() >= 1.0;
        let every_bar_full = self.all_bars_full();
        let filled = self.bars;

        if file_refined {
            self.complete_file(now, out_events);
        }
        if every_bar_full {
            all_bars_full.on_all_bars_full(&filled, out_events);
        }
    }

    fn check_chunk(&self, bar: BarIndex) -> Result<(), ChunkRejection> {
        if !self.day_active {
            return Err(ChunkRejection::DayInactive);
        }
        if self.pending_chunk <= 0.0 {
            return Err(ChunkRejection::NothingPending);
        }
        if !bar.is_valid() {
            return Err(ChunkRejection::InvalidBar);
        }
        if self.bars[bar.get()] >= 1.0 {
            return Err(ChunkRejection::BarFull);
        }
        Ok(())
    }

    pub(crate) fn complete_file(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        self.files_refined = self.files_refined.saturating_add(1);
        out_events.push(Event::FileCompleted {
            done: self.files_refined,
            target: self.files_per_day,
        });

        if self.files_refined >= self.files_per_day {
            self.day_active = false;
            let duration = now.saturating_sub(self.day_started_at);
            info!(
                files_refined = self.files_refined,
                seconds = duration.as_secs_f32(),
                "day complete"
            );
            out_events.push(Event::DayComplete { duration });
        } else {
            info!(
                files_refined = self.files_refined,
                files_per_day = self.files_per_day,
                "file refined"
            );
            self.reset_bars(out_events);
            out_events.push(Event::FileSelectionRequested);
        }
    }

    pub(crate) fn start_cooldown(&mut self, bar: BarIndex, out_events: &mut Vec<Event>) {
        if !bar.is_valid() || self.cooldown.is_zero() {
            return;
        }
        let slot = bar.get();
        self.cooling[slot] = true;
        self.cooldown_remaining[slot] = self.cooldown.as_secs_f32();
        out_events.push(Event::BarCooldownStarted {
            bar,
            duration: self.cooldown,
        });
    }

    /// Counts cooldowns down by `dt`, releasing bars whose timer ran out.
    pub(crate) fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let elapsed = dt.as_secs_f32();
        for bar in BarIndex::all() {
            let slot = bar.get();
            if !self.cooling[slot] {
                continue;
            }
            self.cooldown_remaining[slot] -= elapsed;
            if self.cooldown_remaining[slot] <= 0.0 {
                self.cooldown_remaining[slot] = 0.0;
                self.cooling[slot] = false;
                out_events.push(Event::BarCooldownEnded { bar });
            }
        }
    }

    pub(crate) fn bars(&self) -> [f32; BAR_COUNT] {
        self.bars
    }

    pub(crate) fn bar_value(&self, bar: BarIndex) -> f32 {
        self.bars.get(bar.get()).copied().unwrap_or(0.0)
    }

    pub(crate) fn is_bar_full(&self, bar: BarIndex) -> bool {
        self.bars.get(bar.get()).map_or(false, |value| *value >= 1.0)
    }

    pub(crate) fn is_bar_available(&self, bar: BarIndex) -> bool {
        if !bar.is_valid() {
            return false;
        }
        !self.cooling[bar.get()] && self.bars[bar.get()] < 1.0
    }

    pub(crate) fn cooldown_ratio(&self, bar: BarIndex) -> f32 {
        if !bar.is_valid() || self.cooldown.is_zero() {
            return 0.0;
        }
        (self.cooldown_remaining[bar.get()] / self.cooldown.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Mean of the four bars, clamped to `[0, 1]`.
    pub(crate) fn master_progress(&self) -> f32 {
        let total: f32 = self.bars.iter().sum();
        (total / BAR_COUNT as f32).clamp(0.0, 1.0)
    }

    fn all_bars_full(&self) -> bool {
        self.bars.iter().all(|value| *value >= 1.0)
    }

    pub(crate) fn pending_chunk(&self) -> f32 {
        self.pending_chunk
    }

    pub(crate) fn is_day_active(&self) -> bool {
        self.day_active
    }

    pub(crate) fn files_refined(&self) -> u32 {
        self.files_refined
    }

    pub(crate) fn files_per_day(&self) -> u32 {
        self.files_per_day
    }

    pub(crate) fn day_started_at(&self) -> Duration {
        self.day_started_at
    }
}
