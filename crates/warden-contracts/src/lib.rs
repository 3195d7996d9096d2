//! Warden Contracts - Safe-kernel invariant enforcement
//!
//! Independently verifies, after each step, that the kernel's observable
//! state transition obeyed its two safety invariants:
//!
//! 1. **Budget Never Increases** — risk and exploration are non-increasing
//!    unconditionally; effort and persistence may rise only while the kernel
//!    reports recovery mode
//! 2. **Halt Is Terminal** — a halted kernel never resumes without an
//!    explicit, recorded reset
//!
//! A violation means a bug in the kernel itself: it must propagate to the
//! operator or test harness, never be caught and retried. Enforcement is a
//! pure observer — when disabled it performs no work and can never block.
//!
//! # Usage
//!
//! ```
//! use warden_contracts::ContractCheckedKernel;
//! use warden_kernel::GovernanceKernel;
//! use warden_types::{Profile, Signal};
//!
//! let kernel = GovernanceKernel::new(Profile::balanced()).unwrap();
//! let mut checked = ContractCheckedKernel::new(kernel);
//! let decision = checked.step(Signal::new(0.5, 0.1, 0.0)).unwrap();
//! assert!(!decision.halted);
//! ```

use thiserror::Error;
use warden_kernel::GovernanceKernel;
use warden_types::{BehaviorBudget, Decision, Mode, Signal};

/// Floating-point tolerance for budget comparisons
pub const TOLERANCE: f64 = 1e-9;

/// Environment variable that enables enforcement when set to `1`
pub const CONTRACTS_ENV: &str = "WARDEN_CONTRACTS_ENABLED";

/// Result type for contract checks
pub type Result<T> = std::result::Result<T, ContractError>;

/// Contract violations.
///
/// These indicate the kernel entered an invalid state and should never
/// occur in correct operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ContractError {
    /// A budget field increased outside of its permitted window
    #[error("{field} budget increased from {previous:.4} to {current:.4}")]
    BudgetIncreased {
        field: &'static str,
        previous: f64,
        current: f64,
    },

    /// A halted kernel returned to a non-halted state without a reset
    #[error("kernel reversed from halted to non-halted state without reset")]
    HaltReversed,
}

/// Runtime contract enforcer.
///
/// Checks critical invariants over before/after budget pairs and halted
/// flags, raising [`ContractError`] on breach. Disabled enforcers skip all
/// work.
#[derive(Debug, Clone)]
pub struct ContractEnforcer {
    enabled: bool,
}

impl ContractEnforcer {
    /// Create an enforcer with explicit enablement
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Create an enforcer toggled by the `WARDEN_CONTRACTS_ENABLED`
    /// environment variable
    pub fn from_env() -> Self {
        let enabled = std::env::var(CONTRACTS_ENV).as_deref() == Ok("1");
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Contract: Budget Never Increases (except during recovery).
    ///
    /// Risk and exploration must never increase, even while recovering.
    /// Effort and persistence are additionally checked when `recovering`
    /// is false.
    pub fn check_budget_monotonicity(
        &self,
        prev: &BehaviorBudget,
        curr: &BehaviorBudget,
        recovering: bool,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if curr.risk > prev.risk + TOLERANCE {
            return Err(ContractError::BudgetIncreased {
                field: "risk",
                previous: prev.risk,
                current: curr.risk,
            });
        }

        if curr.exploration > prev.exploration + TOLERANCE {
            return Err(ContractError::BudgetIncreased {
                field: "exploration",
                previous: prev.exploration,
                current: curr.exploration,
            });
        }

        if !recovering {
            if curr.effort > prev.effort + TOLERANCE {
                return Err(ContractError::BudgetIncreased {
                    field: "effort",
                    previous: prev.effort,
                    current: curr.effort,
                });
            }
            if curr.persistence > prev.persistence + TOLERANCE {
                return Err(ContractError::BudgetIncreased {
                    field: "persistence",
                    previous: prev.persistence,
                    current: curr.persistence,
                });
            }
        }

        Ok(())
    }

    /// Contract: Halt Is Terminal.
    ///
    /// Once halted, the kernel must stay halted unless a reset was recorded
    /// between the two observations.
    pub fn check_halt_irreversibility(
        &self,
        was_halted: bool,
        is_halted: bool,
        reset_called: bool,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if was_halted && !is_halted && !reset_called {
            return Err(ContractError::HaltReversed);
        }

        Ok(())
    }
}

impl Default for ContractEnforcer {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Wrapper that enforces contracts transparently around every kernel step.
///
/// Forwards all other calls to the wrapped kernel unchanged; enabling the
/// wrapper never alters returned decisions, only adds verification.
pub struct ContractCheckedKernel {
    kernel: GovernanceKernel,
    enforcer: ContractEnforcer,
    reset_called: bool,
}

impl ContractCheckedKernel {
    /// Wrap a kernel with an always-on enforcer
    pub fn new(kernel: GovernanceKernel) -> Self {
        Self::with_enforcer(kernel, ContractEnforcer::new(true))
    }

    /// Wrap a kernel with a specific enforcer
    pub fn with_enforcer(kernel: GovernanceKernel, enforcer: ContractEnforcer) -> Self {
        Self {
            kernel,
            enforcer,
            reset_called: false,
        }
    }

    /// Execute a kernel step with contract verification.
    ///
    /// The returned decision is exactly what the bare kernel produced; a
    /// `ContractError` means the kernel itself is broken.
    pub fn step(&mut self, signal: Signal) -> Result<Decision> {
        let prev_budget = self.kernel.budget();
        let was_halted = self.kernel.is_halted();

        let decision = self.kernel.step(signal);

        let recovering = decision.mode == Mode::Recovering;
        self.enforcer
            .check_budget_monotonicity(&prev_budget, &decision.budget, recovering)?;
        self.enforcer
            .check_halt_irreversibility(was_halted, decision.halted, self.reset_called)?;

        self.reset_called = false;
        Ok(decision)
    }

    /// Reset the wrapped kernel, recording that a reset occurred so the
    /// halt-irreversibility check permits the transition
    pub fn reset(&mut self, reason: &str) {
        self.reset_called = true;
        self.kernel.reset(reason);
    }

    pub fn kernel(&self) -> &GovernanceKernel {
        &self.kernel
    }

    /// Unwrap, discarding enforcement
    pub fn into_inner(self) -> GovernanceKernel {
        self.kernel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_types::Profile;

    fn create_test_budget(effort: f64, risk: f64, exploration: f64, persistence: f64) -> BehaviorBudget {
        BehaviorBudget::new(effort, risk, exploration, persistence)
    }

    #[test]
    fn test_risk_increase_raises_naming_risk() {
        let enforcer = ContractEnforcer::new(true);
        let prev = create_test_budget(0.5, 0.1, 0.1, 0.5);
        let curr = create_test_budget(0.5, 0.3, 0.1, 0.5);

        let err = enforcer
            .check_budget_monotonicity(&prev, &curr, false)
            .unwrap_err();
        assert!(matches!(err, ContractError::BudgetIncreased { field: "risk", .. }));
    }

    #[test]
    fn test_risk_increase_raises_even_during_recovery() {
        let enforcer = ContractEnforcer::new(true);
        let prev = create_test_budget(0.5, 0.1, 0.1, 0.5);
        let curr = create_test_budget(0.5, 0.3, 0.1, 0.5);

        // Risk is exempt from the recovery allowance.
        let err = enforcer
            .check_budget_monotonicity(&prev, &curr, true)
            .unwrap_err();
        assert!(matches!(err, ContractError::BudgetIncreased { field: "risk", .. }));
    }

    #[test]
    fn test_exploration_increase_raises() {
        let enforcer = ContractEnforcer::new(true);
        let prev = create_test_budget(0.5, 0.1, 0.1, 0.5);
        let curr = create_test_budget(0.5, 0.1, 0.2, 0.5);

        let err = enforcer
            .check_budget_monotonicity(&prev, &curr, true)
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::BudgetIncreased { field: "exploration", .. }
        ));
    }

    #[test]
    fn test_effort_increase_allowed_only_during_recovery() {
        let enforcer = ContractEnforcer::new(true);
        let prev = create_test_budget(0.3, 0.1, 0.1, 0.3);
        let curr = create_test_budget(0.5, 0.1, 0.1, 0.5);

        assert!(enforcer.check_budget_monotonicity(&prev, &curr, true).is_ok());

        let err = enforcer
            .check_budget_monotonicity(&prev, &curr, false)
            .unwrap_err();
        assert!(matches!(err, ContractError::BudgetIncreased { field: "effort", .. }));
    }

    #[test]
    fn test_decreases_always_allowed() {
        let enforcer = ContractEnforcer::new(true);
        let prev = create_test_budget(0.8, 0.1, 0.1, 0.8);
        let curr = create_test_budget(0.6, 0.05, 0.05, 0.6);

        assert!(enforcer.check_budget_monotonicity(&prev, &curr, false).is_ok());
    }

    #[test]
    fn test_tolerance_absorbs_float_noise() {
        let enforcer = ContractEnforcer::new(true);
        let prev = create_test_budget(0.5, 0.1, 0.1, 0.5);
        let curr = create_test_budget(0.5, 0.1 + 1e-12, 0.1, 0.5);

        assert!(enforcer.check_budget_monotonicity(&prev, &curr, false).is_ok());
    }

    #[test]
    fn test_disabled_enforcer_never_raises() {
        let enforcer = ContractEnforcer::new(false);
        let prev = create_test_budget(0.5, 0.1, 0.1, 0.5);
        let curr = create_test_budget(0.9, 0.5, 0.5, 0.9);

        assert!(enforcer.check_budget_monotonicity(&prev, &curr, false).is_ok());
        assert!(enforcer.check_halt_irreversibility(true, false, false).is_ok());
    }

    #[test]
    fn test_halt_reversal_raises_without_reset() {
        let enforcer = ContractEnforcer::new(true);
        let err = enforcer
            .check_halt_irreversibility(true, false, false)
            .unwrap_err();
        assert_eq!(err, ContractError::HaltReversed);
    }

    #[test]
    fn test_halt_reversal_allowed_with_reset() {
        let enforcer = ContractEnforcer::new(true);
        assert!(enforcer.check_halt_irreversibility(true, false, true).is_ok());
    }

    #[test]
    fn test_checked_kernel_is_transparent() {
        let mut bare = GovernanceKernel::new(Profile::balanced()).unwrap();
        let mut checked =
            ContractCheckedKernel::new(GovernanceKernel::new(Profile::balanced()).unwrap());

        for i in 0..30 {
            let signal = Signal::new(0.1 + 0.02 * (i % 5) as f64, 0.2, 0.3);
            let expected = bare.step(signal);
            let observed = checked.step(signal).expect("kernel must honor its contracts");
            assert_eq!(expected, observed);
        }
    }

    #[test]
    fn test_checked_kernel_full_lifecycle_with_reset() {
        let kernel = GovernanceKernel::new(Profile::conservative()).unwrap();
        let mut checked = ContractCheckedKernel::new(kernel);

        let mut halted = false;
        for _ in 0..100 {
            let decision = checked.step(Signal::default()).unwrap();
            if decision.halted {
                halted = true;
                break;
            }
        }
        assert!(halted);

        // Steps after the halt return the terminal decision and still pass.
        let decision = checked.step(Signal::default()).unwrap();
        assert!(decision.halted);

        // Reset is the sanctioned reversal.
        checked.reset("operator cleared the halt");
        let decision = checked.step(Signal::new(0.5, 0.1, 0.0)).unwrap();
        assert!(!decision.halted);
    }
}
