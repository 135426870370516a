//! Lifecycle events emitted around command execution.

use std::fmt;

use crate::client::ChatMessage;
use crate::command::Arguments;

use super::errors::DispatchError;

/// Payload of the before and after events.
pub struct CommandEvent<'a> {
    /// The message being handled.
    pub message: &'a dyn ChatMessage,
    /// Its parsed arguments.
    pub args: &'a Arguments,
}

/// Payload of the error event.
pub struct CommandErrorEvent<'a> {
    /// The message being handled.
    pub message: &'a dyn ChatMessage,
    /// Parsed arguments; `None` when parsing itself failed.
    pub args: Option<&'a Arguments>,
    /// What went wrong.
    pub error: &'a DispatchError,
}

impl fmt::Debug for CommandEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEvent")
            .field("content", &self.message.content())
            .field("args", self.args)
            .finish()
    }
}

impl fmt::Debug for CommandErrorEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandErrorEvent")
            .field("content", &self.message.content())
            .field("args", &self.args)
            .field("error", self.error)
            .finish()
    }
}

/// Subscriber to before and after events.
pub type CommandListener = Box<dyn Fn(&CommandEvent<'_>) + Send + Sync>;

/// Subscriber to error events.
pub type ErrorListener = Box<dyn Fn(&CommandErrorEvent<'_>) + Send + Sync>;

/// Subscriber lists per event.
#[derive(Default)]
pub(crate) struct Listeners {
    pub(crate) before: Vec<CommandListener>,
    pub(crate) after: Vec<CommandListener>,
    pub(crate) error: Vec<ErrorListener>,
}

impl Listeners {
    pub(crate) fn emit_before(&self, event: &CommandEvent<'_>) {
        self.before.iter().for_each(|listener| listener(event));
    }

    pub(crate) fn emit_after(&self, event: &CommandEvent<'_>) {
        self.after.iter().for_each(|listener| listener(event));
    }

    /// Delivers the event; returns `false` when nobody is listening.
    pub(crate) fn emit_error(&self, event: &CommandErrorEvent<'_>) -> bool {
        self.error.iter().for_each(|listener| listener(event));
        !self.error.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .field("error", &self.error.len())
            .finish()
    }
}
