//! Engine configuration
//!
//! Every tunable of the engine lives here, grouped by the component that reads it.
//! All structs deserialize with `#[serde(default)]`, so a config file only needs the
//! values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::theme::colors;

/// Top-level engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between logic updates (lifecycle ticks). Frames are drawn regardless.
    pub update_interval: f64,
    /// Seconds between eviction sweeps
    pub cleanup_interval: f64,
    /// Elapsed-time bound under which non-progress items survive a sweep while inactive
    pub eviction_grace: f64,
    pub formation: FormationConfig,
    pub circle: CircleConfig,
    pub trail: TrailConfig,
    pub buckets: BucketThresholds,
    pub palette: Palette,
    pub overlay: OverlayConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_interval: 1.0 / 10.0, // 10 updates/sec
            cleanup_interval: 2.0,
            eviction_grace: 1.0,
            formation: FormationConfig::default(),
            circle: CircleConfig::default(),
            trail: TrailConfig::default(),
            buckets: BucketThresholds::default(),
            palette: Palette::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

/// Rectangle formation: slot count, geometry and easing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    pub max_slots: usize,
    /// Active items represented by one slot
    pub items_per_slot: usize,
    /// Fraction of the remaining distance covered per frame, in (0, 1]
    pub convergence_rate: f32,
    pub width: f32,
    pub height: f32,
    /// Horizontal distance between neighbouring slot targets
    pub gap: f32,
    /// y of the slanted top edge
    pub top_y: f32,
    /// Slot rest y, measured down from `top_y`
    pub vertical_offset: f32,
    /// Vertical rise of the slanted edges
    pub slant: f32,
    pub opacity: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            max_slots: 15,
            items_per_slot: 100,
            convergence_rate: 0.005,
            width: 100.0,
            height: 320.0,
            gap: 50.0,
            top_y: 140.0,
            vertical_offset: 100.0,
            slant: 50.0,
            opacity: 0.8,
        }
    }
}

/// Circle sprites: size, lanes and horizontal travel offsets
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleConfig {
    pub radius: f32,
    /// Row y-coordinates; `id mod lanes.len()` picks one
    pub lanes: Vec<f32>,
    /// Row for items whose id is not numeric
    pub default_lane_y: f32,
    /// Entrance start, as a fraction of the canvas width
    pub start_fraction: f32,
    /// Extra x added to the entrance path
    pub padding: f32,
    /// Exit start, measured right of the last slot
    pub end_offset: f32,
    /// Exit end distance from the right edge; also widens the formation gap on the left
    pub margin: f32,
}

impl Default for CircleConfig {
    fn default() -> Self {
        Self {
            radius: 30.0,
            lanes: vec![295.0, 360.0, 425.0],
            default_lane_y: 300.0,
            start_fraction: -0.01,
            padding: 10.0,
            end_offset: 100.0,
            margin: 50.0,
        }
    }
}

/// Trail behind each circle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub segments: usize,
    /// Opacity of segment `i` is `fade_factor * (segments - i)`
    pub fade_factor: f32,
    /// Pixels between consecutive segment centers
    pub spacing: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            segments: 30,
            fade_factor: 0.01,
            spacing: 7.0,
        }
    }
}

/// Upper bounds (inclusive) of the fast and normal latency buckets, in execution-time units
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketThresholds {
    pub fast_max: f64,
    pub normal_max: f64,
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            fast_max: 40.0,
            normal_max: 80.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub fast: [u8; 3],
    pub normal: [u8; 3],
    pub slow: [u8; 3],
    pub background: [u8; 3],
    pub text: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            fast: colors::FAST,
            normal: colors::NORMAL,
            slow: colors::SLOW,
            background: colors::BACKGROUND,
            text: colors::TEXT,
        }
    }
}

/// Numeric counters drawn on top of the scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub font_size: f32,
    /// Horizontal step between the bucket counters (doubled between columns)
    pub spacing: f32,
    pub margin_y: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_size: 15.0,
            spacing: 20.0,
            margin_y: 40.0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        debug!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), EngineError> {
        fn positive(name: &str, value: f64) -> Result<(), EngineError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(EngineError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )))
            }
        }

        positive("update_interval", self.update_interval)?;
        positive("cleanup_interval", self.cleanup_interval)?;
        positive("eviction_grace", self.eviction_grace)?;
        positive("circle.radius", self.circle.radius as f64)?;
        positive("formation.width", self.formation.width as f64)?;
        positive("formation.height", self.formation.height as f64)?;

        let rate = self.formation.convergence_rate;
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "formation.convergence_rate must be in (0, 1], got {rate}"
            )));
        }
        if self.formation.max_slots == 0 || self.formation.items_per_slot == 0 {
            return Err(EngineError::InvalidConfig(
                "formation.max_slots and formation.items_per_slot must be at least 1".into(),
            ));
        }
        if self.circle.lanes.is_empty() {
            return Err(EngineError::InvalidConfig("circle.lanes must not be empty".into()));
        }
        if !(self.buckets.fast_max <= self.buckets.normal_max) {
            return Err(EngineError::InvalidConfig(format!(
                "buckets.fast_max ({}) must not exceed buckets.normal_max ({})",
                self.buckets.fast_max, self.buckets.normal_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "update_interval": 0.05,
            "formation": { "max_slots": 4 },
            "palette": { "fast": [1, 2, 3] }
        }"#;
        let config = EngineConfig::from_json(json).unwrap();

        assert_eq!(config.update_interval, 0.05);
        assert_eq!(config.formation.max_slots, 4);
        assert_eq!(config.formation.items_per_slot, 100);
        assert_eq!(config.palette.fast, [1, 2, 3]);
        assert_eq!(config.palette.slow, colors::SLOW);
        assert_eq!(config.cleanup_interval, 2.0);
    }

    #[test]
    fn test_rejects_zero_divisor() {
        let err = EngineConfig::from_json(r#"{"formation": {"items_per_slot": 0}}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)), "got {err:?}");
    }

    #[test]
    fn test_rejects_bad_convergence_rate() {
        let mut config = EngineConfig::default();
        config.formation.convergence_rate = 0.0;
        assert!(config.validate().is_err());
        config.formation.convergence_rate = 1.5;
        assert!(config.validate().is_err());
        config.formation.convergence_rate = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse(_)));
    }
}
