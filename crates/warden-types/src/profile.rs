//! Governance policy profiles

use serde::{Deserialize, Serialize};

use crate::{ProfileError, Result};

/// The governance policy: scaling factors, decay rates, recovery and
/// stagnation parameters, and hard limits.
///
/// A profile is immutable for the lifetime of a kernel instance; swapping
/// policy means constructing a new kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Human-readable policy name
    pub name: String,

    // Scaling
    pub effort_scale: f64,
    pub risk_scale: f64,
    pub exploration_scale: f64,
    pub persistence_scale: f64,

    // Recovery
    /// Per-step rise applied to effort/persistence once recovery begins
    pub recovery_rate: f64,
    /// Ceiling recovery may raise effort/persistence to
    pub recovery_cap: f64,
    /// Steps (fractional, rounded up) to wait in recovery before rising
    pub recovery_delay: f64,

    // Decay
    pub persistence_decay: f64,
    pub exploration_decay: f64,
    pub time_persistence_decay: f64,
    pub time_exploration_decay: f64,

    // Stagnation
    /// Size of the trailing reward window, in steps
    pub stagnation_window: usize,
    /// Effort never drops below this floor while stagnating
    pub stagnation_effort_floor: f64,
    pub stagnation_effort_scale: f64,
    pub stagnation_persistence_scale: f64,
    /// Peak reward in the window must reach this to count as progress
    pub progress_threshold: f64,

    // Limits
    /// Effort at or below this halts the kernel with an exhaustion failure
    pub exhaustion_threshold: f64,
    pub max_risk: f64,
    pub max_exploration: f64,
    /// Hard cap on total steps before a forced halt
    pub max_steps: u64,
}

impl Profile {
    /// The reference policy: moderate decay, ten-step stagnation window.
    pub fn balanced() -> Self {
        Self {
            name: "balanced".to_string(),
            effort_scale: 1.0,
            risk_scale: 1.0,
            exploration_scale: 1.0,
            persistence_scale: 1.0,
            recovery_rate: 0.25,
            recovery_cap: 1.0,
            recovery_delay: 0.5,
            persistence_decay: 0.05,
            exploration_decay: 0.05,
            time_persistence_decay: 0.002,
            time_exploration_decay: 0.002,
            stagnation_window: 10,
            stagnation_effort_floor: 0.1,
            stagnation_effort_scale: 0.7,
            stagnation_persistence_scale: 0.6,
            progress_threshold: 0.05,
            exhaustion_threshold: 0.05,
            max_risk: 0.8,
            max_exploration: 0.9,
            max_steps: 100,
        }
    }

    /// A policy that halts quickly: short window, aggressive stagnation
    /// scaling, and an exhaustion threshold above the stagnation floor so
    /// sustained stagnation drains straight into an exhaustion halt.
    pub fn conservative() -> Self {
        Self {
            name: "conservative".to_string(),
            stagnation_window: 5,
            stagnation_effort_floor: 0.05,
            stagnation_effort_scale: 0.6,
            stagnation_persistence_scale: 0.5,
            progress_threshold: 0.1,
            exhaustion_threshold: 0.08,
            max_risk: 0.5,
            max_exploration: 0.5,
            max_steps: 50,
            ..Self::balanced()
        }
    }

    /// Look up a built-in profile by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "balanced" => Some(Self::balanced()),
            "conservative" => Some(Self::conservative()),
            _ => None,
        }
    }

    /// Reject profiles a kernel could not operate under.
    ///
    /// Runs at kernel construction, before any step is taken.
    pub fn validate(&self) -> Result<()> {
        if self.stagnation_window == 0 {
            return Err(ProfileError::InvalidField {
                field: "stagnation_window",
                reason: "must be at least 1 step".to_string(),
            });
        }
        if self.max_steps == 0 {
            return Err(ProfileError::InvalidField {
                field: "max_steps",
                reason: "must be at least 1".to_string(),
            });
        }
        for (field, value) in [
            ("recovery_rate", self.recovery_rate),
            ("recovery_cap", self.recovery_cap),
            ("persistence_decay", self.persistence_decay),
            ("exploration_decay", self.exploration_decay),
            ("time_persistence_decay", self.time_persistence_decay),
            ("time_exploration_decay", self.time_exploration_decay),
            ("stagnation_effort_floor", self.stagnation_effort_floor),
            ("stagnation_effort_scale", self.stagnation_effort_scale),
            ("stagnation_persistence_scale", self.stagnation_persistence_scale),
            ("progress_threshold", self.progress_threshold),
            ("exhaustion_threshold", self.exhaustion_threshold),
            ("max_risk", self.max_risk),
            ("max_exploration", self.max_exploration),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(ProfileError::InvalidField {
                    field,
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }
        for (field, value) in [
            ("effort_scale", self.effort_scale),
            ("risk_scale", self.risk_scale),
            ("exploration_scale", self.exploration_scale),
            ("persistence_scale", self.persistence_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProfileError::InvalidField {
                    field,
                    reason: format!("{value} is not a non-negative finite scale"),
                });
            }
        }
        if self.recovery_delay < 0.0 || !self.recovery_delay.is_finite() {
            return Err(ProfileError::InvalidField {
                field: "recovery_delay",
                reason: format!("{} is not a non-negative finite step count", self.recovery_delay),
            });
        }
        Ok(())
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::balanced()
    }
}
