//! Loading of the terminal and autoplay settings from TOML.

use std::{fs, path::Path, time::Duration};

use anyhow::{ensure, Context, Result};
use refinement_core::TerminalConfig;
use serde::Deserialize;

/// Everything the headless terminal can be configured with.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) terminal: TerminalConfig,
    pub(crate) autoplay: AutoplayConfig,
}

/// Behaviour of the scripted player driving the session.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AutoplayConfig {
    /// Simulated time advanced per step.
    pub(crate) tick_millis: u64,
    /// Maximum number of tiles dropped per selection.
    pub(crate) selection_size: usize,
    /// Largest trackball deflection applied per step on each axis.
    pub(crate) drift: f32,
    /// Cadence of random prime highlights.
    pub(crate) highlight_interval_secs: f32,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            tick_millis: 100,
            selection_size: 6,
            drift: 0.6,
            highlight_interval_secs: 5.0,
        }
    }
}

impl AutoplayConfig {
    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub(crate) fn highlight_interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.highlight_interval_secs).unwrap_or(Duration::ZERO)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.tick_millis > 0, "autoplay tick_millis must be positive");
        ensure!(
            self.selection_size > 0,
            "autoplay selection_size must be positive"
        );
        ensure!(
            self.drift.is_finite() && self.drift >= 0.0,
            "autoplay drift must be a finite non-negative number, got {}",
            self.drift
        );
        ensure!(
            self.highlight_interval_secs.is_finite() && self.highlight_interval_secs >= 0.0,
            "autoplay highlight_interval_secs must be a finite non-negative number, got {}",
            self.highlight_interval_secs
        );
        Ok(())
    }
}

/// Reads settings from `path`, falling back to defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read terminal config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid terminal config at {}", path.display()))
}

pub(crate) fn parse(contents: &str) -> Result<Settings> {
    let settings: Settings =
        toml::from_str(contents).context("failed to parse terminal config toml contents")?;
    settings
        .terminal
        .validate()
        .context("terminal section rejected")?;
    settings.autoplay.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_sample_matches_the_defaults() {
        let settings = parse(include_str!("../terminal.toml")).expect("sample parses");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(parse("").expect("empty parses"), Settings::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let settings = parse("[terminal]\nfiles_per_day = 3\n[autoplay]\ndrift = 0.0\n")
            .expect("partial config parses");
        assert_eq!(settings.terminal.files_per_day, 3);
        assert_eq!(settings.terminal.viewport_width, 10);
        assert_eq!(settings.autoplay.drift, 0.0);
        assert_eq!(settings.autoplay.tick(), Duration::from_millis(100));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = parse("[terminal]\nfile_per_day = 3\n").expect_err("typo rejected");
        assert!(format!("{error:#}").contains("file_per_day"));
    }

    #[test]
    fn invalid_terminal_values_are_rejected() {
        let error = parse("[terminal]\nglobal_width = 0\n").expect_err("empty grid rejected");
        assert!(format!("{error:#}").contains("terminal section rejected"));
    }

    #[test]
    fn invalid_autoplay_values_are_rejected() {
        assert!(parse("[autoplay]\nselection_size = 0\n").is_err());
        assert!(parse("[autoplay]\ndrift = -1.0\n").is_err());
        assert!(parse("[autoplay]\ntick_millis = 0\n").is_err());
    }

    #[test]
    fn missing_path_falls_back_to_defaults() {
        assert_eq!(load(None).expect("defaults"), Settings::default());
        assert!(load(Some(Path::new("/nonexistent/terminal.toml"))).is_err());
    }
}
