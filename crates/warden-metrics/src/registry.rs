//! Prometheus-style governance metrics

use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use warden_types::{Decision, Failure};

/// Registry of governance observability metrics.
///
/// Backed by an explicit [`prometheus::Registry`] rather than the process
/// global, so independent agents (and tests) can hold independent
/// registries without name collisions.
pub struct GovernanceRegistry {
    registry: Registry,
    steps_total: IntCounter,
    halts_by_reason: IntCounterVec,
    audit_entries_written: IntCounter,
    budget_effort: Gauge,
    budget_risk: Gauge,
    budget_exploration: Gauge,
    budget_persistence: Gauge,
    control_loss: Gauge,
    halted: IntGauge,
}

impl GovernanceRegistry {
    pub fn new() -> Self {
        let registry = Registry::new();

        let steps_total =
            IntCounter::new("agent_steps_total", "Total agent steps executed").expect("metric");
        let halts_by_reason = IntCounterVec::new(
            Opts::new("halts_by_reason", "Halts counted by reason"),
            &["reason"],
        )
        .expect("metric");
        let audit_entries_written =
            IntCounter::new("audit_entries_written", "Total audit entries written")
                .expect("metric");
        let budget_effort =
            Gauge::new("governance_budget_effort", "Current effort budget").expect("metric");
        let budget_risk =
            Gauge::new("governance_budget_risk", "Current risk budget").expect("metric");
        let budget_exploration =
            Gauge::new("governance_budget_exploration", "Current exploration budget")
                .expect("metric");
        let budget_persistence =
            Gauge::new("governance_budget_persistence", "Current persistence budget")
                .expect("metric");
        let control_loss =
            Gauge::new("governance_control_loss", "Accumulated control loss").expect("metric");
        let halted =
            IntGauge::new("governance_halted", "1 if the kernel is halted").expect("metric");

        for collector in [
            Box::new(steps_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(halts_by_reason.clone()),
            Box::new(audit_entries_written.clone()),
            Box::new(budget_effort.clone()),
            Box::new(budget_risk.clone()),
            Box::new(budget_exploration.clone()),
            Box::new(budget_persistence.clone()),
            Box::new(control_loss.clone()),
            Box::new(halted.clone()),
        ] {
            registry.register(collector).expect("register metric");
        }

        // Pre-create the reason children so the series exist before the
        // first halt is observed.
        for failure in [Failure::Stagnation, Failure::Exhaustion, Failure::MaxSteps] {
            halts_by_reason.with_label_values(&[failure.as_str()]);
        }

        Self {
            registry,
            steps_total,
            halts_by_reason,
            audit_entries_written,
            budget_effort,
            budget_risk,
            budget_exploration,
            budget_persistence,
            control_loss,
            halted,
        }
    }

    /// Fold one decision into the counters and gauges
    pub fn record_step(&self, decision: &Decision) {
        self.steps_total.inc();
        self.budget_effort.set(decision.budget.effort);
        self.budget_risk.set(decision.budget.risk);
        self.budget_exploration.set(decision.budget.exploration);
        self.budget_persistence.set(decision.budget.persistence);
        self.control_loss.set(decision.state.control_loss);
        self.halted.set(decision.halted as i64);
        if decision.halted {
            self.halts_by_reason
                .with_label_values(&[decision.failure.as_str()])
                .inc();
        }
    }

    /// Count one audit entry written
    pub fn record_audit_write(&self) {
        self.audit_entries_written.inc();
    }

    pub fn steps_total(&self) -> u64 {
        self.steps_total.get()
    }

    pub fn halts_for(&self, failure: Failure) -> u64 {
        self.halts_by_reason
            .with_label_values(&[failure.as_str()])
            .get()
    }

    /// Export every metric in the Prometheus text exposition format
    pub fn to_prometheus_text(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(error) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!(%error, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for GovernanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_types::{BehaviorBudget, ControlState, Mode};

    fn create_test_decision(halted: bool, failure: Failure) -> Decision {
        Decision {
            step: 1,
            state: ControlState::baseline(),
            budget: BehaviorBudget::new(0.8, 0.2, 0.5, 0.7),
            mode: if halted { Mode::Halted } else { Mode::Nominal },
            halted,
            failure,
            reason: None,
        }
    }

    #[test]
    fn test_records_steps_and_budgets() {
        let registry = GovernanceRegistry::new();
        for _ in 0..5 {
            registry.record_step(&create_test_decision(false, Failure::None));
        }
        assert_eq!(registry.steps_total(), 5);

        let text = registry.to_prometheus_text();
        assert!(text.contains("agent_steps_total 5"));
        assert!(text.contains("governance_budget_effort 0.8"));
    }

    #[test]
    fn test_records_halts_by_reason() {
        let registry = GovernanceRegistry::new();
        registry.record_step(&create_test_decision(true, Failure::Exhaustion));
        registry.record_step(&create_test_decision(true, Failure::Exhaustion));
        registry.record_step(&create_test_decision(true, Failure::Stagnation));

        assert_eq!(registry.halts_for(Failure::Exhaustion), 2);
        assert_eq!(registry.halts_for(Failure::Stagnation), 1);
        assert_eq!(registry.halts_for(Failure::MaxSteps), 0);

        let text = registry.to_prometheus_text();
        assert!(text.contains(r#"halts_by_reason{reason="exhaustion"} 2"#));
    }

    #[test]
    fn test_prometheus_format_has_help_and_type_lines() {
        let registry = GovernanceRegistry::new();
        registry.record_step(&create_test_decision(false, Failure::None));

        let text = registry.to_prometheus_text();
        assert!(text.contains("# HELP agent_steps_total"));
        assert!(text.contains("# TYPE agent_steps_total counter"));
        assert!(text.contains("# TYPE governance_budget_risk gauge"));

        // Every sample line is "name[{labels}] value".
        for line in text.lines().filter(|l| !l.is_empty() && !l.starts_with('#')) {
            assert!(
                line.split_whitespace().count() >= 2,
                "invalid metric line: {line}"
            );
        }
    }

    #[test]
    fn test_independent_registries_do_not_collide() {
        let a = GovernanceRegistry::new();
        let b = GovernanceRegistry::new();
        a.record_step(&create_test_decision(false, Failure::None));
        assert_eq!(a.steps_total(), 1);
        assert_eq!(b.steps_total(), 0);
    }
}
