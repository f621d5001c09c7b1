//! Kernel configuration.

/// Default bound on deferred-queue flush rounds.
pub const DEFAULT_MAX_DEFERRED_ROUNDS: usize = 64;

/// Tunables for a [`World`](crate::World).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneConfig {
    /// How many times `flush_deferred` may drain the queue before giving up.
    ///
    /// A deferred callback may defer again; each drain is one round.
    pub max_deferred_rounds: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_deferred_rounds: DEFAULT_MAX_DEFERRED_ROUNDS,
        }
    }
}

impl SceneConfig {
    /// Read overrides from `ARBOR_MAX_DEFERRED_ROUNDS`.
    #[must_use]
    pub fn from_env() -> Self {
        let max_deferred_rounds = std::env::var("ARBOR_MAX_DEFERRED_ROUNDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_DEFERRED_ROUNDS);

        Self {
            max_deferred_rounds,
        }
    }
}
