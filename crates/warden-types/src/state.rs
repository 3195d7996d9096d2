//! Internal control state tracked by the governance kernel

use serde::{Deserialize, Serialize};

/// The kernel's smoothed belief about agent health.
///
/// Owned exclusively by the kernel: recomputed every step from the previous
/// state and the incoming signal, and published read-only inside each
/// [`Decision`](crate::Decision). Nothing outside the kernel mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    /// Smoothed estimate of how far the agent is from losing control,
    /// in [-1, 1]; positive means healthy headroom
    pub control_margin: f64,
    /// Leaky accumulator of time spent with a negative margin, in [0, 1]
    pub control_loss: f64,
    /// Novelty-driven pressure to explore, in [0, 1]; decays every step
    pub exploration_pressure: f64,
    /// Exponentially smoothed tracking of the urgency signal, in [0, 1]
    pub urgency_level: f64,
    /// Derived risk estimate, a monotone function of control_loss and
    /// urgency_level, capped by the profile's max_risk
    pub risk: f64,
}

impl ControlState {
    /// The neutral baseline a fresh kernel starts from: zero loss, zero
    /// pressure, margin at the ceiling.
    pub fn baseline() -> Self {
        Self {
            control_margin: 1.0,
            control_loss: 0.0,
            exploration_pressure: 0.0,
            urgency_level: 0.0,
            risk: 0.0,
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::baseline()
    }
}
