//! Audit chain verification and replay

use std::path::Path;

use anyhow::Context;
use colored::*;
use warden_audit::{verify_chain, AuditEntry, HashChainedAuditLogger};

/// Verify the hash chain, exiting nonzero on any mismatch
pub fn verify(file: &str) -> anyhow::Result<()> {
    println!("Verifying audit chain: {file}");

    match verify_chain(file) {
        Ok(report) => {
            println!(
                "{} Chain verified: {} entries, head {}",
                "OK".green().bold(),
                report.entries,
                if report.head.is_empty() {
                    "(empty)".to_string()
                } else {
                    format!("{}...", &report.head[..16])
                }
            );
            Ok(())
        }
        Err(error) => {
            eprintln!("{} Chain verification FAILED: {error}", "FAIL".red().bold());
            std::process::exit(1);
        }
    }
}

/// Print a human-readable timeline of governance decisions
pub fn replay(file: &str, summary_only: bool) -> anyhow::Result<()> {
    if !Path::new(file).exists() {
        anyhow::bail!("audit log not found: {file}");
    }

    // Reuse the logger's replay to load entries; verification is separate.
    let logger = HashChainedAuditLogger::with_file(file)
        .with_context(|| format!("failed to load audit log {file}"))?;
    let entries = logger.entries();

    if entries.is_empty() {
        println!("No audit entries found.");
        return Ok(());
    }

    let halts: Vec<&AuditEntry> = entries.iter().filter(|e| e.decision_halted).collect();

    println!();
    println!("{}", "=".repeat(70));
    println!("  GOVERNANCE AUDIT TIMELINE");
    println!("{}", "=".repeat(70));
    println!("  Total entries: {}", entries.len());
    if !halts.is_empty() {
        println!("  Halts: {}", halts.len().to_string().red());
    }
    match verify_chain(file) {
        Ok(_) => println!("  Integrity: {}", "verified".green()),
        Err(error) => println!("  Integrity: {} ({error})", "BROKEN".red().bold()),
    }
    println!("{}", "=".repeat(70));

    if !summary_only {
        println!();
        for entry in entries {
            let marker = if entry.decision_halted {
                "HALT".red().bold()
            } else {
                "ok".green()
            };
            let reason = entry
                .halt_reason
                .as_deref()
                .map(|r| format!(" [{r}]"))
                .unwrap_or_default();
            println!(
                "  step {:>4}  {:>4}  {:<20} effort={:.3} risk={:.3}{}",
                entry.step,
                marker,
                entry.action,
                entry.budget_snapshot.effort,
                entry.budget_snapshot.risk,
                reason
            );
        }
    }

    let last = entries.last().expect("entries is non-empty");
    println!();
    println!(
        "  Final budget: effort={:.3} risk={:.3} exploration={:.3} persistence={:.3}",
        last.budget_snapshot.effort,
        last.budget_snapshot.risk,
        last.budget_snapshot.exploration,
        last.budget_snapshot.persistence
    );

    Ok(())
}
