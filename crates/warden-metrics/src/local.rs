//! Offline-first local metrics sink

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::json;
use warden_kernel::DecisionSink;
use warden_types::Decision;

/// JSONL metrics sink that never propagates a failure.
///
/// Appends one snapshot per decision to a local file. On any failure the
/// snapshot is silently dropped and `record` returns `false` — governance
/// correctness does not depend on this module, and it must never affect
/// execution. Zero network dependencies.
pub struct LocalMetricsSink {
    filepath: PathBuf,
    enabled: bool,
}

impl LocalMetricsSink {
    pub fn new(filepath: impl AsRef<Path>) -> Self {
        Self {
            filepath: filepath.as_ref().to_path_buf(),
            enabled: true,
        }
    }

    /// Stop writing; `record` returns `false` while disabled
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append one decision snapshot. Returns whether the write succeeded;
    /// never panics and never returns an error.
    pub fn record(&self, decision: &Decision) -> bool {
        if !self.enabled {
            return false;
        }

        let mut entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "step": decision.step,
            "effort_remaining": decision.budget.effort,
            "risk_level": decision.budget.risk,
            "halted": decision.halted,
        });
        if decision.halted {
            entry["halt_reason"] = json!(decision.failure.as_str());
        }

        self.append_line(&entry.to_string())
    }

    fn append_line(&self, line: &str) -> bool {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.filepath)
            .and_then(|mut file| writeln!(file, "{line}"));

        match result {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(%error, path = %self.filepath.display(), "metrics write dropped");
                false
            }
        }
    }
}

impl DecisionSink for LocalMetricsSink {
    fn record(&mut self, decision: &Decision) -> anyhow::Result<()> {
        // Drop-on-failure by design; the bool result is not an error.
        LocalMetricsSink::record(self, decision);
        Ok(())
    }

    fn name(&self) -> &str {
        "local_metrics"
    }
}
