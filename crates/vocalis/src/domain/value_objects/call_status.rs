//! CallStatus - Call lifecycle states

use serde::{Deserialize, Serialize};

/// Lifecycle state of a call.
///
/// `Completed` and `Error` are terminal: once reached, the status never
/// changes again regardless of further events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Active,
    Completed,
    Error,
}

impl CallStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallStatus::Completed | CallStatus::Error)
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallStatus::Active => write!(f, "active"),
            CallStatus::Completed => write!(f, "completed"),
            CallStatus::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(CallStatus::Active),
            "completed" => Ok(CallStatus::Completed),
            "error" => Ok(CallStatus::Error),
            _ => Err(format!("Unknown call status: {}", s)),
        }
    }
}
