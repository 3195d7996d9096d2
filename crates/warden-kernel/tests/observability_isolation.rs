//! Observability isolation tests
//!
//! Governance correctness must be completely independent of observers: the
//! kernel functions identically when sinks are absent, attached, or failing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use warden_kernel::{DecisionSink, GovernanceKernel};
use warden_types::{Decision, Profile, Signal};

struct FailingSink {
    calls: Arc<AtomicUsize>,
}

impl DecisionSink for FailingSink {
    fn record(&mut self, _decision: &Decision) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("simulated sink failure")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

struct CountingSink {
    calls: Arc<AtomicUsize>,
}

impl DecisionSink for CountingSink {
    fn record(&mut self, _decision: &Decision) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

fn run_sequence(kernel: &mut GovernanceKernel, steps: usize) -> Vec<Decision> {
    let mut decisions = Vec::new();
    for _ in 0..steps {
        let decision = kernel.step(Signal::new(0.3, 0.1, 0.1));
        let halted = decision.halted;
        decisions.push(decision);
        if halted {
            break;
        }
    }
    decisions
}

#[test]
fn governance_halts_with_failing_sink() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut kernel = GovernanceKernel::with_sinks(
        Profile::conservative(),
        vec![Box::new(FailingSink { calls: calls.clone() })],
    )
    .unwrap();

    let mut halted = false;
    for _ in 0..100 {
        let decision = kernel.step(Signal::new(0.0, 0.0, 0.1));
        if decision.halted {
            halted = true;
            assert!(decision.reason.is_some());
            break;
        }
    }

    assert!(halted, "governance must halt despite sink failures");
    assert!(calls.load(Ordering::SeqCst) > 0, "sink was attempted");
}

#[test]
fn failing_sink_does_not_change_decisions() {
    let mut bare = GovernanceKernel::new(Profile::balanced()).unwrap();
    let mut with_failing = GovernanceKernel::with_sinks(
        Profile::balanced(),
        vec![Box::new(FailingSink {
            calls: Arc::new(AtomicUsize::new(0)),
        })],
    )
    .unwrap();

    let expected = run_sequence(&mut bare, 20);
    let observed = run_sequence(&mut with_failing, 20);

    assert_eq!(expected.len(), observed.len());
    for (a, b) in expected.iter().zip(observed.iter()) {
        assert_eq!(a, b, "decisions must be identical with a failing sink");
    }
}

#[test]
fn working_and_absent_sinks_produce_identical_decisions() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut bare = GovernanceKernel::new(Profile::balanced()).unwrap();
    let mut observed_kernel = GovernanceKernel::with_sinks(
        Profile::balanced(),
        vec![Box::new(CountingSink { calls: calls.clone() })],
    )
    .unwrap();

    let expected = run_sequence(&mut bare, 15);
    let observed = run_sequence(&mut observed_kernel, 15);

    assert_eq!(expected, observed);
    assert_eq!(calls.load(Ordering::SeqCst), observed.len());
}

#[test]
fn sinks_are_not_notified_for_cached_terminal_decisions() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut kernel = GovernanceKernel::with_sinks(
        Profile::conservative(),
        vec![Box::new(CountingSink { calls: calls.clone() })],
    )
    .unwrap();

    let mut steps_to_halt = 0;
    for _ in 0..100 {
        steps_to_halt += 1;
        if kernel.step(Signal::default()).halted {
            break;
        }
    }
    let at_halt = calls.load(Ordering::SeqCst);
    assert_eq!(at_halt, steps_to_halt);

    // Idempotent terminal steps produce no fresh decisions to observe.
    kernel.step(Signal::default());
    kernel.step(Signal::default());
    assert_eq!(calls.load(Ordering::SeqCst), at_halt);
}
