//! Governance kernel core runtime

use warden_types::{
    BehaviorBudget, ControlState, Decision, Failure, Mode, Profile, ProfileError, Signal,
};

use crate::sink::DecisionSink;
use crate::window::RewardWindow;

/// Gain of the exponential move of the margin toward its target.
const MARGIN_GAIN: f64 = 0.3;
/// Accumulation rate of control loss while the margin is negative.
const LOSS_GAIN: f64 = 0.25;
/// Multiplicative decay of control loss while the margin is non-negative.
const LOSS_DECAY: f64 = 0.9;
/// How strongly novelty feeds exploration pressure.
const PRESSURE_GAIN: f64 = 0.5;
/// Gain of the exponential smoothing of the urgency signal.
const URGENCY_GAIN: f64 = 0.3;
/// Weights of control loss vs urgency in the derived risk estimate.
const RISK_LOSS_WEIGHT: f64 = 0.6;
const RISK_URGENCY_WEIGHT: f64 = 0.4;
/// Floating-point tolerance for floor/cap comparisons.
const EPSILON: f64 = 1e-9;

/// The governance decision authority for a single agent timeline.
///
/// Owns the control state, behavior budget, step counter, halted flag, and
/// the bounded reward window. Every [`step`](GovernanceKernel::step) folds
/// one signal into the state and returns an immutable [`Decision`]; once a
/// decision halts, every later step returns that same terminal decision
/// until [`reset`](GovernanceKernel::reset) is called.
pub struct GovernanceKernel {
    profile: Profile,
    state: ControlState,
    budget: BehaviorBudget,
    mode: Mode,
    step_count: u64,
    window: RewardWindow,
    /// Consecutive steps the window peak stayed below the progress threshold
    stagnation_run: u64,
    /// Consecutive non-stagnating steps spent waiting in recovery
    recovery_wait: u64,
    terminal: Option<Decision>,
    last_reset_reason: Option<String>,
    sinks: Vec<Box<dyn DecisionSink>>,
}

impl GovernanceKernel {
    /// Construct a kernel under the given profile.
    ///
    /// Fails fast if the profile is one no kernel could operate under; this
    /// is the only error the kernel ever surfaces.
    pub fn new(profile: Profile) -> Result<Self, ProfileError> {
        Self::with_sinks(profile, Vec::new())
    }

    /// Construct a kernel with decision sinks attached.
    ///
    /// Sinks observe every fresh decision; their failures are discarded at
    /// the call site and can never alter a decision.
    pub fn with_sinks(
        profile: Profile,
        sinks: Vec<Box<dyn DecisionSink>>,
    ) -> Result<Self, ProfileError> {
        profile.validate()?;
        let window = RewardWindow::new(profile.stagnation_window);
        let budget = BehaviorBudget::initial(&profile);
        Ok(Self {
            profile,
            state: ControlState::baseline(),
            budget,
            mode: Mode::Idle,
            step_count: 0,
            window,
            stagnation_run: 0,
            recovery_wait: 0,
            terminal: None,
            last_reset_reason: None,
            sinks,
        })
    }

    /// Consume one step's signal and produce the governance decision.
    ///
    /// Never errors: out-of-range signal values are clamped before use, and
    /// a halt is a normal return value. Calling `step` on a halted kernel is
    /// an idempotent no-op returning the cached terminal decision.
    pub fn step(&mut self, signal: Signal) -> Decision {
        if let Some(terminal) = &self.terminal {
            return terminal.clone();
        }

        self.step_count += 1;
        if self.step_count > self.profile.max_steps {
            let reason = format!(
                "step counter exceeded the {}-step hard limit",
                self.profile.max_steps
            );
            // Budget carried over unchanged: the counter trips before any
            // recomputation, so monotonicity holds trivially.
            return self.halt(Failure::MaxSteps, reason, self.state, self.budget);
        }

        let signal = signal.clamped();
        let state = self.next_state(&signal);

        self.window.push(signal.reward);
        let stagnating = self.window.peak() < self.profile.progress_threshold;
        if stagnating {
            self.stagnation_run += 1;
        } else {
            self.stagnation_run = 0;
        }

        let (budget, mode) = self.next_budget(&state, stagnating);

        if budget.effort <= self.profile.exhaustion_threshold {
            let reason = format!(
                "effort budget {:.4} fell to or below the exhaustion threshold {:.4}",
                budget.effort, self.profile.exhaustion_threshold
            );
            return self.halt(Failure::Exhaustion, reason, state, budget);
        }

        if self.stagnation_run >= self.profile.stagnation_window as u64
            && budget.effort <= self.profile.stagnation_effort_floor + EPSILON
        {
            let reason = format!(
                "no reward above {:.4} for {} consecutive steps at the effort floor",
                self.profile.progress_threshold, self.stagnation_run
            );
            return self.halt(Failure::Stagnation, reason, state, budget);
        }

        self.state = state;
        self.budget = budget;
        self.mode = mode;

        let decision = Decision {
            step: self.step_count,
            state,
            budget,
            mode,
            halted: false,
            failure: Failure::None,
            reason: None,
        };
        self.notify(&decision);
        decision
    }

    /// Leave the halted state and restore the kernel to its initial
    /// configuration. This is the only sanctioned exit from a halt.
    ///
    /// The step counter restarts at zero: a reset begins a new timeline.
    /// The reason is retained for audit and logged.
    pub fn reset(&mut self, reason: &str) {
        tracing::info!(reason, "governance kernel reset");
        self.state = ControlState::baseline();
        self.budget = BehaviorBudget::initial(&self.profile);
        self.mode = Mode::Idle;
        self.step_count = 0;
        self.window.clear();
        self.stagnation_run = 0;
        self.recovery_wait = 0;
        self.terminal = None;
        self.last_reset_reason = Some(reason.to_string());
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn budget(&self) -> BehaviorBudget {
        self.budget
    }

    pub fn control_state(&self) -> ControlState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_halted(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Reason recorded by the most recent reset, if any
    pub fn last_reset_reason(&self) -> Option<&str> {
        self.last_reset_reason.as_deref()
    }

    /// Fold one clamped signal into the control state.
    ///
    /// The margin moves toward `(reward - difficulty) * trust`; control loss
    /// is a leaky integrator over negative margin; exploration pressure rises
    /// with novelty and decays every step; urgency is smoothed; derived risk
    /// is a capped monotone blend of loss and urgency.
    fn next_state(&self, signal: &Signal) -> ControlState {
        let prev = &self.state;

        let margin_target = (signal.reward - signal.difficulty) * signal.trust;
        let control_margin =
            (prev.control_margin + MARGIN_GAIN * (margin_target - prev.control_margin))
                .clamp(-1.0, 1.0);

        let control_loss = if control_margin < 0.0 {
            (prev.control_loss + LOSS_GAIN * -control_margin).clamp(0.0, 1.0)
        } else {
            prev.control_loss * LOSS_DECAY
        };

        let exploration_pressure = ((prev.exploration_pressure + PRESSURE_GAIN * signal.novelty)
            * (1.0 - self.profile.exploration_decay)
            - self.profile.time_exploration_decay)
            .clamp(0.0, 1.0);

        let urgency_level =
            (prev.urgency_level + URGENCY_GAIN * (signal.urgency - prev.urgency_level))
                .clamp(0.0, 1.0);

        let risk = (self.profile.risk_scale
            * (RISK_LOSS_WEIGHT * control_loss + RISK_URGENCY_WEIGHT * urgency_level))
            .min(self.profile.max_risk);

        ControlState {
            control_margin,
            control_loss,
            exploration_pressure,
            urgency_level,
            risk,
        }
    }

    /// Recompute the budget from the previous budget, the new control state,
    /// and the stagnation flag. Risk and exploration ratchet downward by
    /// construction; effort and persistence may rise only in recovery.
    fn next_budget(&mut self, state: &ControlState, stagnating: bool) -> (BehaviorBudget, Mode) {
        let profile = &self.profile;
        let prev = self.budget;
        let mut mode = if self.mode == Mode::Idle {
            Mode::Nominal
        } else {
            self.mode
        };

        // Full recovery is detected at the start of a recovering step, so
        // the decision that reports Nominal never contains a budget rise.
        if mode == Mode::Recovering && prev.effort >= profile.recovery_cap - EPSILON {
            mode = Mode::Nominal;
            self.recovery_wait = 0;
        }

        let risk = prev.risk.min(profile.max_risk).min(state.risk);
        let exploration = prev
            .exploration
            .min(profile.max_exploration)
            .min(state.exploration_pressure * profile.exploration_scale);

        let floor = profile.stagnation_effort_floor;
        let (effort, persistence) = if stagnating && mode != Mode::Recovering {
            mode = Mode::Recovering;
            self.recovery_wait = 0;
            (
                (prev.effort * profile.stagnation_effort_scale).max(floor),
                prev.persistence * profile.stagnation_persistence_scale,
            )
        } else if mode == Mode::Recovering {
            if stagnating {
                // Still no progress: keep pressing toward the floor and
                // hold the recovery wait.
                self.recovery_wait = 0;
                (
                    (prev.effort * profile.stagnation_effort_scale).max(floor),
                    prev.persistence * profile.stagnation_persistence_scale,
                )
            } else {
                self.recovery_wait += 1;
                if self.recovery_wait as f64 >= profile.recovery_delay {
                    (
                        (prev.effort + profile.recovery_rate).min(profile.recovery_cap),
                        (prev.persistence + profile.recovery_rate).min(profile.recovery_cap),
                    )
                } else {
                    (prev.effort, prev.persistence)
                }
            }
        } else {
            let decay = |value: f64| {
                (value * (1.0 - profile.persistence_decay) - profile.time_persistence_decay)
                    .max(0.0)
            };
            (decay(prev.effort), decay(prev.persistence))
        };

        (BehaviorBudget::new(effort, risk, exploration, persistence), mode)
    }

    fn halt(
        &mut self,
        failure: Failure,
        reason: String,
        state: ControlState,
        budget: BehaviorBudget,
    ) -> Decision {
        tracing::warn!(
            step = self.step_count,
            failure = failure.as_str(),
            %reason,
            "governance kernel halted"
        );
        self.state = state;
        self.budget = budget;
        self.mode = Mode::Halted;
        let decision = Decision {
            step: self.step_count,
            state,
            budget,
            mode: Mode::Halted,
            halted: true,
            failure,
            reason: Some(reason),
        };
        self.terminal = Some(decision.clone());
        self.notify(&decision);
        decision
    }

    /// Forward a fresh decision to every sink, discarding failures.
    fn notify(&mut self, decision: &Decision) {
        for sink in &mut self.sinks {
            if let Err(error) = sink.record(decision) {
                tracing::warn!(sink = sink.name(), %error, "decision sink failed; ignoring");
            }
        }
    }
}
