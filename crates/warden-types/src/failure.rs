//! Halt causes

use serde::{Deserialize, Serialize};

/// Why the kernel stopped the agent.
///
/// A halt is a normal terminal output of `step`, not an error. The labels
/// from [`Failure::as_str`] are part of the wire contract: they appear in
/// audit entries and gateway deny responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Failure {
    /// Not halted
    None,
    /// No reward above the progress threshold over the trailing window
    Stagnation,
    /// Effort budget fell to or below the exhaustion threshold
    Exhaustion,
    /// The step counter exceeded the profile's hard limit
    MaxSteps,
}

impl Failure {
    /// Stable lowercase label used in audit entries and deny responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Failure::None => "none",
            Failure::Stagnation => "stagnation",
            Failure::Exhaustion => "exhaustion",
            Failure::MaxSteps => "max_steps",
        }
    }

    pub fn is_halt(&self) -> bool {
        !matches!(self, Failure::None)
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_labels() {
        assert_eq!(Failure::MaxSteps.as_str(), "max_steps");
        assert!(Failure::Stagnation.is_halt());
        assert!(!Failure::None.is_halt());
    }
}
