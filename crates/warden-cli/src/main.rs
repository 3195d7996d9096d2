//! Warden CLI - Offline tooling for the runtime safety governor
//!
//! Works fully offline with no running services required:
//!
//! ```bash
//! # Verify an audit chain for tampering
//! warden audit verify audit_chain.jsonl
//!
//! # Print a human-readable decision timeline
//! warden audit replay audit_chain.jsonl --summary
//!
//! # Run a kernel against a constant signal stream
//! warden simulate --profile conservative --steps 30 --urgency 0.3
//! ```

use clap::{Parser, Subcommand};

mod commands;

use commands::{audit, simulate};

/// Warden - runtime safety governor for autonomous agents
#[derive(Parser)]
#[command(name = "warden")]
#[command(author = "Warden Contributors")]
#[command(version)]
#[command(about = "Bounded behavior budgets, terminal halts, tamper-evident audit", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and verify audit chains
    Audit {
        #[command(subcommand)]
        action: AuditCommands,
    },

    /// Run a governance kernel against a synthetic signal stream
    Simulate(simulate::SimulateArgs),
}

#[derive(Subcommand)]
enum AuditCommands {
    /// Verify the hash chain integrity of an audit log
    Verify {
        /// Path to the JSONL audit chain file
        file: String,
    },

    /// Print a human-readable timeline of governance decisions
    Replay {
        /// Path to the JSONL audit chain file
        file: String,

        /// Print only the summary
        #[arg(long)]
        summary: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Audit { action } => match action {
            AuditCommands::Verify { file } => audit::verify(&file),
            AuditCommands::Replay { file, summary } => audit::replay(&file, summary),
        },
        Commands::Simulate(args) => simulate::run(args),
    }
}
