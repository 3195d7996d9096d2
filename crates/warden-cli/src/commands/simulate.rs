//! Kernel simulation against a synthetic signal stream

use clap::Args;
use colored::*;
use serde_json::json;
use warden_audit::HashChainedAuditLogger;
use warden_contracts::{ContractCheckedKernel, ContractEnforcer};
use warden_kernel::GovernanceKernel;
use warden_types::{Profile, ProfileError, Signal};

#[derive(Args)]
pub struct SimulateArgs {
    /// Built-in profile to govern under
    #[arg(long, default_value = "balanced")]
    pub profile: String,

    /// YAML policy file (overrides --profile)
    #[arg(long)]
    pub policy: Option<String>,

    /// Number of steps to simulate
    #[arg(long, default_value = "30")]
    pub steps: u64,

    /// Constant reward signal
    #[arg(long, default_value = "0.0")]
    pub reward: f64,

    /// Constant novelty signal
    #[arg(long, default_value = "0.0")]
    pub novelty: f64,

    /// Constant urgency signal
    #[arg(long, default_value = "0.0")]
    pub urgency: f64,

    /// Write an audit chain to this file
    #[arg(long)]
    pub audit: Option<String>,

    /// Disable contract enforcement around each step
    #[arg(long)]
    pub no_contracts: bool,
}

pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    let profile = match &args.policy {
        Some(path) => warden_policy::load_policy_profile(path)?,
        None => Profile::builtin(&args.profile).ok_or_else(|| ProfileError::UnknownProfile {
            name: args.profile.clone(),
        })?,
    };

    println!(
        "Simulating {} steps under profile {} (reward={}, novelty={}, urgency={})",
        args.steps,
        profile.name.bold(),
        args.reward,
        args.novelty,
        args.urgency
    );
    println!();

    let mut audit = match &args.audit {
        Some(path) => Some(HashChainedAuditLogger::with_file(path)?),
        None => None,
    };

    // A disabled enforcer skips all checks, so the wrapper is free to keep.
    let enforcer = ContractEnforcer::new(!args.no_contracts);
    let mut kernel =
        ContractCheckedKernel::with_enforcer(GovernanceKernel::new(profile)?, enforcer);

    let signal = Signal::new(args.reward, args.novelty, args.urgency);

    for _ in 0..args.steps {
        let decision = kernel.step(signal)?;

        if let Some(audit) = &mut audit {
            audit.log(decision.step, "simulate", json!({}), &signal, &decision)?;
        }

        let marker = if decision.halted {
            "HALT".red().bold()
        } else {
            decision.mode.as_str().normal()
        };
        println!(
            "  step {:>4}  {:<10}  effort={:.3} risk={:.3} exploration={:.3} persistence={:.3}",
            decision.step,
            marker,
            decision.budget.effort,
            decision.budget.risk,
            decision.budget.exploration,
            decision.budget.persistence
        );

        if decision.halted {
            println!();
            println!(
                "{} {} after {} steps: {}",
                "Halted".red().bold(),
                format!("({})", decision.failure).red(),
                decision.step,
                decision.reason.as_deref().unwrap_or("no reason recorded")
            );
            break;
        }
    }

    if let Some(audit) = &audit {
        println!();
        println!(
            "Audit chain written: {} entries, head {}...",
            audit.entries_written(),
            &audit.chain_head()[..16.min(audit.chain_head().len())]
        );
    }

    Ok(())
}
