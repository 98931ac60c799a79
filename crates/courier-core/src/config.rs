//! Bus configuration.
//!
//! The defaults reproduce the lenient behaviour: a second command handler is
//! ignored and a command nobody handles is dropped. `BusConfig::strict()`
//! turns both into errors.

use serde::{Deserialize, Serialize};

use crate::error::BusError;

/// What `register` does when the command type already has a handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCommandPolicy {
    /// Keep the first handler, log a warning, return `Registration::Occupied`.
    #[default]
    Ignore,
    /// Return `BusError::DuplicateCommandHandler`.
    Reject,
}

/// What `send` does when the command type has no handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnhandledCommandPolicy {
    /// Drop the command and return `Ok(false)`.
    #[default]
    Drop,
    /// Return `BusError::NoCommandHandler`.
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub duplicate_commands: DuplicateCommandPolicy,
    pub unhandled_commands: UnhandledCommandPolicy,
}

impl BusConfig {
    /// Both command policies set to `Reject`.
    pub fn strict() -> Self {
        Self {
            duplicate_commands: DuplicateCommandPolicy::Reject,
            unhandled_commands: UnhandledCommandPolicy::Reject,
        }
    }

    pub fn with_duplicate_commands(mut self, policy: DuplicateCommandPolicy) -> Self {
        self.duplicate_commands = policy;
        self
    }

    pub fn with_unhandled_commands(mut self, policy: UnhandledCommandPolicy) -> Self {
        self.unhandled_commands = policy;
        self
    }

    /// Parse a JSON document. Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, BusError> {
        serde_json::from_str(json).map_err(|e| BusError::Config(e.to_string()))
    }
}
