//! Warden Policy - Governance policy configuration
//!
//! Loads governance policies from YAML files and turns them into validated
//! [`Profile`]s for kernel construction. Every field is optional; missing
//! values fall back to the reference policy defaults. Loading fails fast —
//! a malformed or missing policy file is rejected before any kernel exists.
//!
//! # Configuration Format
//!
//! ```yaml
//! limits:
//!   max_steps: 100
//!   max_risk: 0.8
//! stagnation:
//!   window: 10
//!   progress_threshold: 0.05
//! recovery:
//!   rate: 0.25
//! decay:
//!   persistence: 0.05
//! scaling:
//!   risk: 1.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_types::{Profile, ProfileError};

/// Result type for policy loading
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Policy loading errors.
///
/// A missing file, unreadable file, and unparseable file are distinct so
/// operators can tell deployment mistakes from syntax mistakes.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy file does not exist
    #[error("Policy file not found: {path}")]
    FileNotFound { path: String },

    /// The policy file could not be read
    #[error("Failed to read policy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The policy file is not valid YAML for the expected schema
    #[error("Invalid YAML in {path}: {message}")]
    InvalidYaml { path: String, message: String },

    /// The parsed policy produced a profile no kernel could run under
    #[error("Policy produced an invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),
}

/// Hard limits section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    pub max_steps: u64,
    pub max_risk: f64,
    pub max_exploration: f64,
    pub exhaustion_threshold: f64,
}

impl Default for LimitsSection {
    fn default() -> Self {
        let p = Profile::balanced();
        Self {
            max_steps: p.max_steps,
            max_risk: p.max_risk,
            max_exploration: p.max_exploration,
            exhaustion_threshold: p.exhaustion_threshold,
        }
    }
}

/// Stagnation detection section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagnationSection {
    pub window: usize,
    pub effort_floor: f64,
    pub effort_scale: f64,
    pub persistence_scale: f64,
    pub progress_threshold: f64,
}

impl Default for StagnationSection {
    fn default() -> Self {
        let p = Profile::balanced();
        Self {
            window: p.stagnation_window,
            effort_floor: p.stagnation_effort_floor,
            effort_scale: p.stagnation_effort_scale,
            persistence_scale: p.stagnation_persistence_scale,
            progress_threshold: p.progress_threshold,
        }
    }
}

/// Recovery section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoverySection {
    pub rate: f64,
    pub cap: f64,
    pub delay: f64,
}

impl Default for RecoverySection {
    fn default() -> Self {
        let p = Profile::balanced();
        Self {
            rate: p.recovery_rate,
            cap: p.recovery_cap,
            delay: p.recovery_delay,
        }
    }
}

/// Decay section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecaySection {
    pub persistence: f64,
    pub exploration: f64,
    pub time_persistence: f64,
    pub time_exploration: f64,
}

impl Default for DecaySection {
    fn default() -> Self {
        let p = Profile::balanced();
        Self {
            persistence: p.persistence_decay,
            exploration: p.exploration_decay,
            time_persistence: p.time_persistence_decay,
            time_exploration: p.time_exploration_decay,
        }
    }
}

/// Scaling section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingSection {
    pub effort: f64,
    pub risk: f64,
    pub exploration: f64,
    pub persistence: f64,
}

impl Default for ScalingSection {
    fn default() -> Self {
        Self {
            effort: 1.0,
            risk: 1.0,
            exploration: 1.0,
            persistence: 1.0,
        }
    }
}

/// Parsed policy configuration, mapping directly onto [`Profile`] fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub limits: LimitsSection,
    pub stagnation: StagnationSection,
    pub recovery: RecoverySection,
    pub decay: DecaySection,
    pub scaling: ScalingSection,
}

impl PolicyConfig {
    /// Build a validated profile from this configuration
    pub fn into_profile(self, name: impl Into<String>) -> Result<Profile> {
        let profile = Profile {
            name: name.into(),
            effort_scale: self.scaling.effort,
            risk_scale: self.scaling.risk,
            exploration_scale: self.scaling.exploration,
            persistence_scale: self.scaling.persistence,
            recovery_rate: self.recovery.rate,
            recovery_cap: self.recovery.cap,
            recovery_delay: self.recovery.delay,
            persistence_decay: self.decay.persistence,
            exploration_decay: self.decay.exploration,
            time_persistence_decay: self.decay.time_persistence,
            time_exploration_decay: self.decay.time_exploration,
            stagnation_window: self.stagnation.window,
            stagnation_effort_floor: self.stagnation.effort_floor,
            stagnation_effort_scale: self.stagnation.effort_scale,
            stagnation_persistence_scale: self.stagnation.persistence_scale,
            progress_threshold: self.stagnation.progress_threshold,
            exhaustion_threshold: self.limits.exhaustion_threshold,
            max_risk: self.limits.max_risk,
            max_exploration: self.limits.max_exploration,
            max_steps: self.limits.max_steps,
        };
        profile.validate()?;
        Ok(profile)
    }
}

/// Loads governance policies from YAML configuration
pub struct PolicyLoader {
    filepath: PathBuf,
}

impl PolicyLoader {
    pub fn new(filepath: impl AsRef<Path>) -> Self {
        Self {
            filepath: filepath.as_ref().to_path_buf(),
        }
    }

    /// Load and parse the policy configuration
    pub fn load(&self) -> Result<PolicyConfig> {
        if !self.filepath.exists() {
            return Err(PolicyError::FileNotFound {
                path: self.filepath.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(&self.filepath).map_err(|source| PolicyError::Io {
            path: self.filepath.display().to_string(),
            source,
        })?;

        serde_yaml::from_str(&content).map_err(|e| PolicyError::InvalidYaml {
            path: self.filepath.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load the configuration and build a named, validated profile
    pub fn load_profile(&self, name: impl Into<String>) -> Result<Profile> {
        self.load()?.into_profile(name)
    }
}

/// Convenience: load a profile from a policy file in one call
pub fn load_policy_profile(path: impl AsRef<Path>) -> Result<Profile> {
    PolicyLoader::new(path).load_profile("policy_configured")
}
