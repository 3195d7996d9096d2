//! The immutable per-step verdict

use serde::{Deserialize, Serialize};

use crate::{BehaviorBudget, ControlState, Failure, Mode};

/// Immutable snapshot returned by every kernel step.
///
/// Created fresh each step and never mutated after return, so it is safe to
/// hand to observers (contracts, audit, metrics) while the caller acts on
/// `halted` concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Step counter value at which this decision was produced
    pub step: u64,
    /// Control state after folding in this step's signal
    pub state: ControlState,
    /// Budget the agent is permitted for its next action
    pub budget: BehaviorBudget,
    /// Mode the kernel reported for this step
    pub mode: Mode,
    /// Whether the agent must stop
    pub halted: bool,
    /// Why the kernel halted, or `Failure::None`
    pub failure: Failure,
    /// Human-readable explanation of a halt, if any
    pub reason: Option<String>,
}

impl Decision {
    /// Wire label of the halt cause, if halted
    pub fn halt_reason(&self) -> Option<&'static str> {
        if self.halted {
            Some(self.failure.as_str())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halt_reason_only_when_halted() {
        let decision = Decision {
            step: 3,
            state: ControlState::baseline(),
            budget: BehaviorBudget::new(0.5, 0.1, 0.2, 0.5),
            mode: Mode::Nominal,
            halted: false,
            failure: Failure::None,
            reason: None,
        };
        assert_eq!(decision.halt_reason(), None);

        let halted = Decision {
            halted: true,
            failure: Failure::Exhaustion,
            mode: Mode::Halted,
            ..decision
        };
        assert_eq!(halted.halt_reason(), Some("exhaustion"));
    }
}
