use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("command {command} is already handled by {existing}; {rejected} was not registered")]
    DuplicateCommandHandler {
        command: &'static str,
        existing: &'static str,
        rejected: &'static str,
    },

    #[error("no handler registered for command {command}")]
    NoCommandHandler { command: &'static str },

    #[error("registry lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("invalid bus config: {0}")]
    Config(String),
}
