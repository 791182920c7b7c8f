#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timer driven system that periodically turns a prime tile scary while a day
//! is in progress.

use std::time::Duration;

use refinement_core::{Command, Event};

/// Default cadence between two highlighted primes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration parameters required to construct the highlighting system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided highlight cadence.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

/// Pure system that emits [`Command::HighlightRandomPrime`] once per interval.
#[derive(Debug)]
pub struct PrimeHighlighting {
    interval: Duration,
    accumulator: Duration,
}

impl PrimeHighlighting {
    /// Creates a new highlighting system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval: config.interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes events to emit highlight commands.
    ///
    /// Time only accumulates while `day_active` holds; a day boundary in the
    /// event batch discards whatever was accumulated before it.
    pub fn handle(&mut self, events: &[Event], day_active: bool, out: &mut Vec<Command>) {
        if !day_active {
            self.accumulator = Duration::ZERO;
            return;
        }

        if self.interval.is_zero() {
            return;
        }

        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    self.accumulator = self.accumulator.saturating_add(*dt);
                }
                Event::DayStarted => self.accumulator = Duration::ZERO,
                _ => {}
            }
        }

        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            out.push(Command::HighlightRandomPrime);
        }
    }
}

impl Default for PrimeHighlighting {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advanced(millis: u64) -> Event {
        Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }
    }

    #[test]
    fn zero_interval_never_highlights() {
        let mut highlighting = PrimeHighlighting::new(Config::new(Duration::ZERO));
        let mut commands = Vec::new();
        highlighting.handle(&[advanced(60_000)], true, &mut commands);
        assert!(commands.is_empty());
    }

    #[test]
    fn day_start_discards_earlier_time_in_the_same_batch() {
        let mut highlighting = PrimeHighlighting::new(Config::new(Duration::from_secs(1)));
        let mut commands = Vec::new();
        highlighting.handle(
            &[advanced(900), Event::DayStarted, advanced(200)],
            true,
            &mut commands,
        );
        assert!(commands.is_empty());
        assert_eq!(highlighting.accumulator, Duration::from_millis(200));
    }
}
