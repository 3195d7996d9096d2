//! Hash-chained logger and offline chain verification

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use warden_types::{Decision, Signal};

use crate::entry::{compute_entry_hash, AuditEntry};
use crate::{AuditError, Result};

/// Audit logger with SHA-256 hash chaining for tamper detection.
///
/// Entries are chained in memory and, when a file path is configured,
/// appended to a JSONL file before the entry is returned to the caller —
/// the design intends a decision to be recorded before anyone acts on it.
/// A single log file must have a single writer: the chain head is a
/// sequential cursor.
pub struct HashChainedAuditLogger {
    entries: Vec<AuditEntry>,
    filepath: Option<PathBuf>,
    last_hash: String,
    entries_written: u64,
}

impl HashChainedAuditLogger {
    /// In-memory chain with no persistence
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            filepath: None,
            last_hash: String::new(),
            entries_written: 0,
        }
    }

    /// Durable chain appended to the given JSONL file.
    ///
    /// If the file already exists it is replayed to recover `previous_hash`
    /// continuity — the last entry's hash becomes this session's chain
    /// head. Replay does not validate the chain; run
    /// [`verify_chain`] explicitly for that.
    pub fn with_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut logger = Self {
            entries: Vec::new(),
            filepath: Some(path.clone()),
            last_hash: String::new(),
            entries_written: 0,
        };

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| AuditError::Io {
                path: path.display().to_string(),
                source,
            })?;
            for (index, line) in content.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let entry: AuditEntry =
                    serde_json::from_str(line).map_err(|e| AuditError::MalformedEntry {
                        line: index + 1,
                        message: e.to_string(),
                    })?;
                logger.last_hash = entry.entry_hash.clone();
                logger.entries.push(entry);
                logger.entries_written += 1;
            }
        }

        Ok(logger)
    }

    /// Record a governance event with hash chaining.
    ///
    /// The entry is appended to durable storage before its hash is returned;
    /// appends are never rewritten in place. Storage failures propagate as
    /// [`AuditError::Io`] and leave the in-memory chain unchanged.
    pub fn log(
        &mut self,
        step: u64,
        action: &str,
        params: Value,
        signals: &Signal,
        decision: &Decision,
    ) -> Result<AuditEntry> {
        let entry = AuditEntry::from_decision(
            Utc::now().to_rfc3339(),
            step,
            action,
            params,
            signals,
            decision,
            self.last_hash.clone(),
        )
        .sealed();

        if let Some(path) = &self.filepath {
            let line =
                serde_json::to_string(&entry).expect("audit entry serializes") + "\n";
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| AuditError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
            file.write_all(line.as_bytes())
                .map_err(|source| AuditError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
        }

        self.last_hash = entry.entry_hash.clone();
        self.entries.push(entry.clone());
        self.entries_written += 1;
        Ok(entry)
    }

    /// All entries seen by this logger (replayed and freshly written)
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Count of entries in the chain
    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    /// Hash of the most recent entry (empty before the first)
    pub fn chain_head(&self) -> &str {
        &self.last_hash
    }
}

impl Default for HashChainedAuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a successful chain verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// Number of entries verified
    pub entries: usize,
    /// Hash of the final entry (empty for an empty log)
    pub head: String,
}

/// Verify the integrity of an audit chain file, fully offline.
///
/// Replays entries in order, checking each `previous_hash` against its
/// predecessor's `entry_hash` and recomputing every hash over the entry's
/// non-hash fields. An empty log verifies as valid; a missing file is a
/// load error, distinct from a verification failure.
pub fn verify_chain(path: impl AsRef<Path>) -> Result<ChainReport> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AuditError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| AuditError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut previous_hash = String::new();
    let mut entries = 0usize;

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line).map_err(|e| AuditError::MalformedEntry {
            line: line_number,
            message: e.to_string(),
        })?;

        let linked = value
            .get("previous_hash")
            .and_then(Value::as_str)
            .unwrap_or("");
        if linked != previous_hash {
            return Err(AuditError::LinkageMismatch {
                line: line_number,
                expected: prefix(&previous_hash),
                actual: prefix(linked),
            });
        }

        let stored = value
            .get("entry_hash")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let computed = compute_entry_hash(&value);
        if stored != computed {
            return Err(AuditError::HashMismatch {
                line: line_number,
                stored: prefix(&stored),
                computed: prefix(&computed),
            });
        }

        previous_hash = stored;
        entries += 1;
    }

    Ok(ChainReport {
        entries,
        head: previous_hash,
    })
}

fn prefix(hash: &str) -> String {
    hash.chars().take(16).collect()
}
