//! Typed decision observers
//!
//! Sinks replace ad-hoc per-step callbacks with an explicit interface passed
//! to the kernel at construction. The isolation contract: a sink that fails
//! (or is absent entirely) must never change a decision. The kernel catches
//! and discards sink errors at the call site; sinks themselves should not
//! swallow their own failures.

use warden_types::Decision;

/// An observer notified after every freshly produced decision.
///
/// Implementations must be fast and non-blocking; the kernel calls sinks
/// synchronously between producing a decision and returning it.
pub trait DecisionSink: Send {
    /// Record one decision. Errors are discarded by the kernel.
    fn record(&mut self, decision: &Decision) -> anyhow::Result<()>;

    /// Short name used when logging a discarded failure
    fn name(&self) -> &str {
        "sink"
    }
}
