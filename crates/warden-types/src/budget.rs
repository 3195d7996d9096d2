//! The bounded behavior budget exposed to callers

use serde::{Deserialize, Serialize};

use crate::Profile;

/// The four bounded resource allowances the kernel permits the agent.
///
/// This is the only channel through which the kernel communicates resource
/// limits outward. Every field lives in [0, 1]. Across any two consecutive
/// steps, `risk` and `exploration` are non-increasing unconditionally;
/// `effort` and `persistence` are non-increasing except while the kernel is
/// in recovery mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorBudget {
    /// How much work the agent may spend per step
    pub effort: f64,
    /// How much risk the agent may take
    pub risk: f64,
    /// How much the agent may deviate from known-good behavior
    pub exploration: f64,
    /// How long the agent may keep pushing on the same approach
    pub persistence: f64,
}

impl BehaviorBudget {
    /// Build a budget with every field clamped into [0, 1]
    pub fn new(effort: f64, risk: f64, exploration: f64, persistence: f64) -> Self {
        Self {
            effort: effort.clamp(0.0, 1.0),
            risk: risk.clamp(0.0, 1.0),
            exploration: exploration.clamp(0.0, 1.0),
            persistence: persistence.clamp(0.0, 1.0),
        }
    }

    /// The full starting budget for a fresh or freshly reset kernel:
    /// effort and persistence at 1.0, risk and exploration at the
    /// profile-defined starting ceilings.
    pub fn initial(profile: &Profile) -> Self {
        Self::new(1.0, profile.max_risk, profile.max_exploration, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_fields() {
        let budget = BehaviorBudget::new(1.5, -0.2, 0.4, 0.9);
        assert_eq!(budget.effort, 1.0);
        assert_eq!(budget.risk, 0.0);
        assert_eq!(budget.exploration, 0.4);
        assert_eq!(budget.persistence, 0.9);
    }

    #[test]
    fn test_initial_uses_profile_ceilings() {
        let profile = Profile::balanced();
        let budget = BehaviorBudget::initial(&profile);
        assert_eq!(budget.effort, 1.0);
        assert_eq!(budget.persistence, 1.0);
        assert_eq!(budget.risk, profile.max_risk);
        assert_eq!(budget.exploration, profile.max_exploration);
    }
}
