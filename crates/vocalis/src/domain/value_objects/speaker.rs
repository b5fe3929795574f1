//! Speaker - Attribution of a transcript fragment

use serde::{Deserialize, Serialize};

/// Who produced an utterance: the human caller or the voice agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

impl Speaker {
    /// Derive the speaker from the engine's `is_user` flag.
    pub fn from_is_user(is_user: bool) -> Self {
        if is_user {
            Speaker::User
        } else {
            Speaker::Agent
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Agent => write!(f, "agent"),
        }
    }
}

impl std::str::FromStr for Speaker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Speaker::User),
            "agent" => Ok(Speaker::Agent),
            _ => Err(format!("Unknown speaker: {}", s)),
        }
    }
}
