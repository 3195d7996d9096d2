//! Warden Kernel - The governance decision authority
//!
//! Converts a stream of behavioral [`Signal`](warden_types::Signal)s into a
//! monotonically constrained [`BehaviorBudget`](warden_types::BehaviorBudget)
//! and a halt/continue [`Decision`](warden_types::Decision), while tracking
//! whether recent progress justifies continued operation.
//!
//! # Key Principle
//!
//! **The kernel evaluates, it never executes.** There is no method on
//! [`GovernanceKernel`] that invokes, proxies, or schedules an action; the
//! guarantee is structural, not a runtime check.
//!
//! The kernel is single-threaded per logical agent: `step` mutates owned
//! state and must not be called concurrently on one instance. Independent
//! agents run independent kernels with no shared state.

pub mod kernel;
pub mod sink;
pub mod window;

pub use kernel::GovernanceKernel;
pub use sink::DecisionSink;
pub use window::RewardWindow;
