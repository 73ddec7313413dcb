//! Animation timing options with TOML preset support.
//!
//! All tunable engine timings are consolidated here. Options serialize
//! to/from TOML so embedders can ship motion presets; partial files
//! work because every field falls back to its default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SwoopError;

/// Engine timing and pacing configuration.
///
/// Defaults: ~66 Hz pacing, quarter-second zooms, and pans whose
/// duration scales with the on-screen displacement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationOptions {
    /// Master switch. When false every duration collapses to a minimal
    /// value, so requests apply as instant jumps instead of tweens.
    pub enabled: bool,
    /// Pacing interval between interpolation frames, in milliseconds.
    /// Also the cancellation poll interval.
    pub frame_interval_ms: u64,
    /// Total duration of an inertial fling.
    pub drag_duration_ms: f32,
    /// Base zoom tween duration per zoom level of distance.
    pub zoom_duration_ms: f32,
    /// Base duration of the zoom-out/zoom-in phases of a flyover pan,
    /// per zoom level of distance.
    pub flyover_zoom_duration_ms: f32,
    /// Pan duration for a displacement that exactly fills the pixel
    /// budget; shorter pans scale down proportionally.
    pub pan_duration_ms: f32,
    /// Lower bound on any planned pan duration.
    pub min_pan_duration_ms: f32,
    /// Lower bound on the duration of a full move request.
    pub nav_duration_ms: f32,
    /// Backend azimuth tween duration.
    pub azimuth_duration_ms: f32,
    /// Duration of the rotation tween inside a manual move.
    pub move_rotation_duration_ms: f32,
    /// Tilt duration per degree of elevation change.
    pub tilt_ms_per_degree: f32,
    /// Minimum eased progress at which a new fly-to may join an
    /// in-flight one instead of restarting it.
    pub join_threshold: f32,
    /// On-screen |Δx|+|Δy| pixel budget a planned pan must fit within.
    pub pixel_displacement_budget: f32,
    /// Zoom level below which flyover planning abandons animation.
    pub floor_zoom: i32,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            frame_interval_ms: 15,
            drag_duration_ms: 1200.0,
            zoom_duration_ms: 250.0,
            flyover_zoom_duration_ms: 350.0,
            pan_duration_ms: 900.0,
            min_pan_duration_ms: 450.0,
            nav_duration_ms: 1000.0,
            azimuth_duration_ms: 250.0,
            move_rotation_duration_ms: 500.0,
            tilt_ms_per_degree: 5.0,
            join_threshold: 0.8,
            pixel_displacement_budget: 2400.0,
            floor_zoom: 4,
        }
    }
}

impl AnimationOptions {
    /// The pacing interval as a [`Duration`].
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// A duration honoring the master switch: unchanged when enabled,
    /// collapsed to 1 ms (instant jump) when disabled.
    #[must_use]
    pub fn scaled_ms(&self, duration_ms: f32) -> f32 {
        if self.enabled {
            duration_ms
        } else {
            1.0
        }
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SwoopError::Io`] if the file cannot be read and
    /// [`SwoopError::OptionsParse`] if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, SwoopError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| SwoopError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`SwoopError::OptionsParse`] if serialization fails and
    /// [`SwoopError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SwoopError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SwoopError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let options = AnimationOptions::default();
        let toml_str = toml::to_string_pretty(&options).unwrap();
        let parsed: AnimationOptions = toml::from_str(&toml_str).unwrap();
        assert_eq!(options, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
drag_duration_ms = 800.0
floor_zoom = 2
";
        let options: AnimationOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(options.drag_duration_ms, 800.0);
        assert_eq!(options.floor_zoom, 2);
        // Everything else should be default
        assert!(options.enabled);
        assert_eq!(options.zoom_duration_ms, 250.0);
        assert_eq!(options.frame_interval_ms, 15);
    }

    #[test]
    fn disabled_collapses_durations() {
        let mut options = AnimationOptions::default();
        assert_eq!(options.scaled_ms(900.0), 900.0);
        options.enabled = false;
        assert_eq!(options.scaled_ms(900.0), 1.0);
    }
}
