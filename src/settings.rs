use crate::strokes::capture::DEFAULT_JITTER_THRESHOLD;
use crate::strokes::matcher::{Matcher, DEFAULT_MATCH_TOLERANCE};
use crate::strokes::timer::DEFAULT_QUIET_TIMER_MS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const SETTINGS_FILE: &str = "settings.json";
const APP_DIR_NAME: &str = "widget_sketch";
const STROKES_DIR_NAME: &str = "strokes";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the logger is initialised at debug level and honours
    /// `RUST_LOG`.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving log output in addition to stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Root folder of the template library. Defaults to the platform data
    /// directory.
    #[serde(default)]
    pub strokes_dir: Option<PathBuf>,
    /// Delay after the last pointer release before a gesture is final.
    #[serde(default = "default_quiet_timer_ms")]
    pub quiet_timer_ms: u64,
    /// Quiet timer used while recording a template. Falls back to
    /// `quiet_timer_ms`.
    #[serde(default)]
    pub recording_quiet_timer_ms: Option<u64>,
    /// Moves within this Manhattan distance of the last recorded point are
    /// dropped.
    #[serde(default = "default_jitter_threshold")]
    pub jitter_threshold: f32,
    /// Largest mean Hausdorff distance reported as a confident match.
    #[serde(default = "default_match_tolerance")]
    pub match_tolerance: f32,
    /// Enables the width/height ratio-log pre-filter with this tolerance.
    #[serde(default)]
    pub ratio_log_tolerance: Option<f32>,
    /// Side of the square recording canvas; recorded templates are stored
    /// relative to its centre.
    #[serde(default = "default_recording_canvas_size")]
    pub recording_canvas_size: f32,
    /// Ask the user to confirm the widget even after a confident match.
    #[serde(default)]
    pub prompt_for_widget: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            strokes_dir: None,
            quiet_timer_ms: default_quiet_timer_ms(),
            recording_quiet_timer_ms: None,
            jitter_threshold: default_jitter_threshold(),
            match_tolerance: default_match_tolerance(),
            ratio_log_tolerance: None,
            recording_canvas_size: default_recording_canvas_size(),
            prompt_for_widget: false,
        }
    }
}

fn default_quiet_timer_ms() -> u64 {
    DEFAULT_QUIET_TIMER_MS
}

fn default_jitter_threshold() -> f32 {
    DEFAULT_JITTER_THRESHOLD
}

fn default_match_tolerance() -> f32 {
    DEFAULT_MATCH_TOLERANCE
}

fn default_recording_canvas_size() -> f32 {
    300.0
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Settings = serde_json::from_str(&content)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Replace values the engine cannot work with by their defaults.
    pub fn sanitize(&mut self) {
        if !self.jitter_threshold.is_finite() || self.jitter_threshold < 0.0 {
            tracing::warn!(
                value = self.jitter_threshold,
                "invalid jitter_threshold; using default"
            );
            self.jitter_threshold = default_jitter_threshold();
        }
        if !self.match_tolerance.is_finite() || self.match_tolerance < 0.0 {
            tracing::warn!(
                value = self.match_tolerance,
                "invalid match_tolerance; using default"
            );
            self.match_tolerance = default_match_tolerance();
        }
        if let Some(tolerance) = self.ratio_log_tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                tracing::warn!(value = tolerance, "invalid ratio_log_tolerance; disabling filter");
                self.ratio_log_tolerance = None;
            }
        }
        if !self.recording_canvas_size.is_finite() || self.recording_canvas_size <= 0.0 {
            tracing::warn!(
                value = self.recording_canvas_size,
                "invalid recording_canvas_size; using default"
            );
            self.recording_canvas_size = default_recording_canvas_size();
        }
    }

    pub fn quiet_timer(&self) -> Duration {
        Duration::from_millis(self.quiet_timer_ms)
    }

    pub fn recording_quiet_timer(&self) -> Duration {
        Duration::from_millis(self.recording_quiet_timer_ms.unwrap_or(self.quiet_timer_ms))
    }

    pub fn matcher(&self) -> Matcher {
        Matcher::new(self.match_tolerance).with_ratio_log_filter(self.ratio_log_tolerance)
    }

    /// Template library root: the configured folder, else
    /// `<data dir>/widget_sketch/strokes`, else `./strokes`.
    pub fn resolve_strokes_dir(&self) -> PathBuf {
        if let Some(dir) = &self.strokes_dir {
            return dir.clone();
        }
        match dirs_next::data_dir() {
            Some(data) => data.join(APP_DIR_NAME).join(STROKES_DIR_NAME),
            None => PathBuf::from(STROKES_DIR_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str("{\"quiet_timer_ms\": 700}").unwrap();
        assert_eq!(settings.quiet_timer_ms, 700);
        assert_eq!(settings.jitter_threshold, 3.0);
        assert_eq!(settings.match_tolerance, 60.0);
        assert_eq!(settings.recording_quiet_timer(), Duration::from_millis(700));
    }

    #[test]
    fn sanitize_restores_defaults() {
        let mut settings = Settings {
            jitter_threshold: -1.0,
            match_tolerance: f32::NAN,
            ratio_log_tolerance: Some(-0.5),
            recording_canvas_size: 0.0,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn explicit_strokes_dir_wins() {
        let settings = Settings {
            strokes_dir: Some(PathBuf::from("/tmp/templates")),
            ..Settings::default()
        };
        assert_eq!(settings.resolve_strokes_dir(), PathBuf::from("/tmp/templates"));
    }
}
