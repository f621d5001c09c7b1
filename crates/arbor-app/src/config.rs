//! Runtime configuration.
//!
//! Every field has a default and can be overridden from the environment:
//!
//! | variable                    | field                     |
//! |-----------------------------|---------------------------|
//! | `ARBOR_MAX_DEFERRED_ROUNDS` | `scene.max_deferred_rounds` |
//! | `ARBOR_STEP_DELTA_MS`       | `tick.step_delta_ms`      |
//! | `ARBOR_MAX_FRAME_DELTA_MS`  | `max_frame_delta_ms`      |
//! | `ARBOR_ROUND_DRAW`          | `round_draw_translation`  |

use arbor_ecs::SceneConfig;
use arbor_tick::TickConfig;

/// Largest delta handed to update callbacks, in milliseconds.
pub const DEFAULT_MAX_FRAME_DELTA_MS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeConfig {
    pub scene: SceneConfig,
    pub tick: TickConfig,
    /// Update callbacks never see a delta above this (e.g. after the host
    /// stopped delivering frames for a while).
    pub max_frame_delta_ms: f64,
    /// Snap draw translations to whole pixels.
    pub round_draw_translation: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            tick: TickConfig::default(),
            max_frame_delta_ms: DEFAULT_MAX_FRAME_DELTA_MS,
            round_draw_translation: true,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `ARBOR_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let max_frame_delta_ms = std::env::var("ARBOR_MAX_FRAME_DELTA_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v: &f64| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_MAX_FRAME_DELTA_MS);

        let round_draw_translation = std::env::var("ARBOR_ROUND_DRAW")
            .ok()
            .map_or(true, |v| !matches!(v.trim(), "0" | "false" | "off" | "no"));

        Self {
            scene: SceneConfig::from_env(),
            tick: TickConfig::from_env(),
            max_frame_delta_ms,
            round_draw_translation,
        }
    }

    /// Apply the update-side clamping policy to a raw scheduler delta.
    #[must_use]
    pub fn clamp_delta(&self, raw_ms: f64) -> f64 {
        raw_ms.clamp(0.0, self.max_frame_delta_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_delta() {
        let config = RuntimeConfig::default();
        assert_eq!(config.clamp_delta(16.0), 16.0);
        assert_eq!(config.clamp_delta(5000.0), DEFAULT_MAX_FRAME_DELTA_MS);
        assert_eq!(config.clamp_delta(-3.0), 0.0);
    }
}
