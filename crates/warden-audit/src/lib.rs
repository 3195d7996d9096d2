//! Warden Audit - Immutable, hash-chained decision log
//!
//! Every governance decision is recorded as an append-only entry linked to
//! its predecessor by a SHA-256 hash, making any post-hoc tampering with the
//! log file detectable by fully offline verification.
//!
//! # Hash Chain Structure
//!
//! ```text
//! Entry[0]: previous_hash = "",                entry_hash = SHA256(entry_0)
//! Entry[1]: previous_hash = entry_0.entry_hash, entry_hash = SHA256(entry_1)
//! Entry[N]: previous_hash = entry_N-1.entry_hash, entry_hash = SHA256(entry_N)
//! ```
//!
//! The canonical form hashed for each entry — sorted keys, compact
//! separators, `entry_hash` excluded — and the one-JSON-object-per-line file
//! format are part of the wire contract: a compliant implementation must
//! reproduce them byte-for-byte to interoperate with existing log files.

pub mod chain;
pub mod entry;

pub use chain::{verify_chain, ChainReport, HashChainedAuditLogger};
pub use entry::{canonical_json, compute_entry_hash, AuditEntry};

use thiserror::Error;

/// Result type for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Audit errors.
///
/// Load errors (`FileNotFound`, `Io`) are distinct from verification
/// failures (`MalformedEntry`, `LinkageMismatch`, `HashMismatch`): a log
/// that cannot be read is not the same thing as a log that fails its
/// integrity check.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The audit log file does not exist
    #[error("Audit log not found: {path}")]
    FileNotFound { path: String },

    /// The audit log could not be read or written
    #[error("Audit log I/O failure on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A line in the log is not a valid JSON entry
    #[error("Invalid entry on line {line}: {message}")]
    MalformedEntry { line: usize, message: String },

    /// An entry does not link to its predecessor's hash
    #[error("Line {line}: previous_hash mismatch. Expected '{expected}...', got '{actual}...'")]
    LinkageMismatch {
        line: usize,
        expected: String,
        actual: String,
    },

    /// An entry's recorded hash does not match its recomputed hash
    #[error("Line {line}: entry_hash mismatch. Stored '{stored}...', computed '{computed}...'")]
    HashMismatch {
        line: usize,
        stored: String,
        computed: String,
    },
}

impl AuditError {
    /// True for integrity-check failures, false for load/storage errors
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            AuditError::MalformedEntry { .. }
                | AuditError::LinkageMismatch { .. }
                | AuditError::HashMismatch { .. }
        )
    }
}
