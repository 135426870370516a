//! Error types for dispatch failures.
//!
//! A dispatch fails either before the handler runs, when the message text
//! does not parse for the matched command, or inside the handler itself.

use thiserror::Error;

use crate::command::CommandError;

/// Errors surfaced while dispatching a message.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The matched command rejected the message text.
    #[error("invalid arguments: {0}")]
    Parse(#[from] CommandError),

    /// The handler failed.
    #[error(transparent)]
    Handler(anyhow::Error),
}

impl DispatchError {
    /// Wraps a handler failure.
    pub const fn handler(source: anyhow::Error) -> Self {
        Self::Handler(source)
    }

    /// Returns `true` when the failure happened before the handler ran.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}
