//! Kernel operating modes

use serde::{Deserialize, Serialize};

/// The kernel's operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Constructed but no step taken yet
    Idle,
    /// Normal decrementing operation
    Nominal,
    /// Effort and persistence may rise back toward a capped ceiling
    Recovering,
    /// Terminal; only an explicit reset exits this mode
    Halted,
}

impl Mode {
    /// Stable lowercase label for logs and wire formats
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Nominal => "nominal",
            Mode::Recovering => "recovering",
            Mode::Halted => "halted",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Mode::Recovering).unwrap(), "\"recovering\"");
    }
}
