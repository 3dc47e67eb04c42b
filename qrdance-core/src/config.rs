/// Compiled-in defaults for the viewer timing and the scene lights
use std::time::Duration;

use nalgebra::Point3;

/// Timing knobs for the animation cycler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    /// Cross-fade length in seconds, used for both fade-in and fade-out
    pub fade_duration: f32,
    /// Playback fraction that must be exceeded before advancing
    pub advance_threshold: f32,
    /// Delay before the deferred first play call
    pub first_play_delay: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fade_duration: 0.3,
            advance_threshold: 0.9,
            first_play_delay: Duration::from_millis(1000),
        }
    }
}

/// Lights and helpers placed in the scene around the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub ambient_intensity: f32,
    pub point_light_position: Point3<f32>,
    pub axes_size: f32,
    pub show_grid: bool,
    pub overlay_background: &'static str,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: 2.0,
            point_light_position: Point3::new(40.0, 40.0, 40.0),
            axes_size: 5.0,
            show_grid: true,
            overlay_background: "rgba(255, 192, 192, 0.7)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_defaults() {
        let config = ViewerConfig::default();
        assert!((config.fade_duration - 0.3).abs() < 1e-6);
        assert!((config.advance_threshold - 0.9).abs() < 1e-6);
        assert_eq!(config.first_play_delay, Duration::from_secs(1));
    }
}
