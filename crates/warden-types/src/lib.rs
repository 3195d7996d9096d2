//! Warden Types - Canonical domain types for agent governance
//!
//! This crate contains all foundational types for Warden with zero dependencies
//! on other warden crates. It defines the complete type system for:
//!
//! - Behavioral signals measured per agent step (Signal)
//! - The kernel's smoothed health estimate (ControlState)
//! - The bounded resource allowances exposed to callers (BehaviorBudget)
//! - Kernel modes and halt causes (Mode, Failure)
//! - The immutable per-step verdict (Decision)
//! - Governance policy (Profile) and its validation errors
//!
//! # Architectural Invariants
//!
//! These types support the core Warden safety invariants:
//!
//! 1. Budgets never increase spontaneously — risk and exploration are
//!    non-increasing always; effort and persistence may rise only in
//!    recovery mode
//! 2. Halt is terminal — once halted, only an explicit reset resumes
//! 3. The kernel evaluates but never executes — no type in this crate
//!    carries an execution capability

pub mod budget;
pub mod decision;
pub mod error;
pub mod failure;
pub mod mode;
pub mod profile;
pub mod signal;
pub mod state;

pub use budget::*;
pub use decision::*;
pub use error::*;
pub use failure::*;
pub use mode::*;
pub use profile::*;
pub use signal::*;
pub use state::*;

/// Version of the Warden types schema
pub const TYPES_VERSION: &str = "0.1.0";
