//! Behavioral signals consumed by the governance kernel

use serde::{Deserialize, Serialize};

/// One step's input measurements.
///
/// Signals are transient: the kernel consumes them, folds them into its
/// control state, and retains only the reward value (inside a bounded
/// sliding window used for stagnation detection). Out-of-range values are
/// never rejected — the kernel clamps them to their valid domain before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Observed progress toward the agent's goal, conventionally in [0, 1]
    #[serde(default)]
    pub reward: f64,
    /// How unfamiliar the current situation is, in [0, 1]
    #[serde(default)]
    pub novelty: f64,
    /// External time pressure, in [0, 1]
    #[serde(default)]
    pub urgency: f64,
    /// Estimated difficulty of the current task, in [0, 1]
    #[serde(default)]
    pub difficulty: f64,
    /// Confidence in the signal source itself, in [0, 1]
    #[serde(default = "default_trust")]
    pub trust: f64,
}

fn default_trust() -> f64 {
    1.0
}

impl Default for Signal {
    fn default() -> Self {
        Self {
            reward: 0.0,
            novelty: 0.0,
            urgency: 0.0,
            difficulty: 0.0,
            trust: 1.0,
        }
    }
}

impl Signal {
    /// Create a signal from the three most commonly supplied measurements
    pub fn new(reward: f64, novelty: f64, urgency: f64) -> Self {
        Self {
            reward,
            novelty,
            urgency,
            ..Self::default()
        }
    }

    /// Return a copy with every field clamped to [0, 1].
    ///
    /// NaN values collapse to 0.0 (or 1.0 for trust) rather than
    /// propagating through the control state.
    pub fn clamped(&self) -> Self {
        Self {
            reward: clamp_unit(self.reward, 0.0),
            novelty: clamp_unit(self.novelty, 0.0),
            urgency: clamp_unit(self.urgency, 0.0),
            difficulty: clamp_unit(self.difficulty, 0.0),
            trust: clamp_unit(self.trust, 1.0),
        }
    }
}

fn clamp_unit(value: f64, nan_fallback: f64) -> f64 {
    if value.is_nan() {
        nan_fallback
    } else {
        value.clamp(0.0, 1.0)
    }
}
