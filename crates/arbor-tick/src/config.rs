//! Scheduler configuration.

/// Nominal delta of a single-step tick: one 60 Hz frame.
pub const DEFAULT_STEP_DELTA_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickConfig {
    /// Delta reported by `step()`, in milliseconds.
    pub step_delta_ms: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            step_delta_ms: DEFAULT_STEP_DELTA_MS,
        }
    }
}

impl TickConfig {
    /// Read overrides from `ARBOR_STEP_DELTA_MS`.
    #[must_use]
    pub fn from_env() -> Self {
        let step_delta_ms = std::env::var("ARBOR_STEP_DELTA_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v: &f64| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_STEP_DELTA_MS);

        Self { step_delta_ms }
    }
}
