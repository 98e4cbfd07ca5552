//! The two application modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModeError;

/// Whether the tab shows real tenant data or the demo sandbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    /// Real data and real side effects.
    #[default]
    Live,
    /// Demo fixtures; actions are simulated.
    Sandbox,
}

impl AppMode {
    /// Wire/storage spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Sandbox => "sandbox",
        }
    }

    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Live => Self::Sandbox,
            Self::Sandbox => Self::Live,
        }
    }

    /// Shorthand for `== Sandbox`.
    pub fn is_sandbox(self) -> bool {
        self == Self::Sandbox
    }

    /// Shorthand for `== Live`.
    pub fn is_live(self) -> bool {
        self == Self::Live
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Self::Live),
            "sandbox" => Ok(Self::Sandbox),
            other => Err(ModeError::InvalidMode(other.to_owned())),
        }
    }
}
