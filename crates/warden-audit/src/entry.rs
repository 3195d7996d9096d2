//! Audit entries and canonical hashing

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use warden_types::{BehaviorBudget, Decision, Signal};

/// Immutable record of a single governance event.
///
/// Once written, an entry is never modified. `previous_hash` is empty for
/// the first entry of a log; `entry_hash` is the SHA-256 of the entry's
/// canonical JSON with the `entry_hash` field excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// RFC 3339 UTC timestamp at log time
    pub timestamp: String,
    /// Harness step the decision belongs to
    pub step: u64,
    /// Name of the action being attempted
    pub action: String,
    /// Parameters of the action
    pub params: Value,
    /// The input signals passed to the kernel
    pub signals: Signal,
    /// The budget the kernel returned for this step
    pub budget_snapshot: BehaviorBudget,
    /// Whether the decision halted the agent
    pub decision_halted: bool,
    /// Wire label of the halt cause, if halted
    pub halt_reason: Option<String>,
    /// Hash of the previous entry (empty string for the first)
    #[serde(default)]
    pub previous_hash: String,
    /// SHA-256 over this entry's canonical JSON, excluding this field
    #[serde(default)]
    pub entry_hash: String,
}

impl AuditEntry {
    /// Build an unhashed entry from a decision and its action context
    pub fn from_decision(
        timestamp: String,
        step: u64,
        action: &str,
        params: Value,
        signals: &Signal,
        decision: &Decision,
        previous_hash: String,
    ) -> Self {
        Self {
            timestamp,
            step,
            action: action.to_string(),
            params,
            signals: *signals,
            budget_snapshot: decision.budget,
            decision_halted: decision.halted,
            halt_reason: decision.halt_reason().map(str::to_string),
            previous_hash,
            entry_hash: String::new(),
        }
    }

    /// Compute this entry's hash over its canonical form
    pub fn compute_hash(&self) -> String {
        let value = serde_json::to_value(self).expect("audit entry serializes");
        compute_entry_hash(&value)
    }

    /// Return a copy with `entry_hash` filled in
    pub fn sealed(mut self) -> Self {
        self.entry_hash = self.compute_hash();
        self
    }
}

/// Produce canonical JSON for hashing: recursively sorted object keys, no
/// incidental whitespace.
///
/// Key order is enforced explicitly rather than relying on the map type
/// serde_json was compiled with, so the bytes are stable across feature
/// unification.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key).expect("string serializes"));
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => {
            out.push_str(&serde_json::to_string(other).expect("scalar serializes"));
        }
    }
}

/// Compute the SHA-256 hash of an entry value, excluding its `entry_hash`
/// field, over the canonical JSON bytes.
pub fn compute_entry_hash(entry: &Value) -> String {
    let hashable = match entry {
        Value::Object(map) => {
            let mut copy = map.clone();
            copy.remove("entry_hash");
            Value::Object(copy)
        }
        other => other.clone(),
    };
    let canonical = canonical_json(&hashable);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
