//! Message dispatch for registered commands.
//!
//! A [`Dispatcher`] owns the registered commands and the [`Reactor`] that
//! marks progress. For every inbound message it:
//!
//! 1. ignores text that does not start with the configured prefix;
//! 2. picks the first registered command with a matching pattern, ignoring
//!    the message when there is none;
//! 3. parses the arguments and emits the before event;
//! 4. runs the handler inside [`Reactor::loading`];
//! 5. emits the after event, or routes the failure to the error listeners.
//!
//! Ignored messages emit no events. Without error listeners a failure is
//! logged and returned to the caller.
//!
//! [`Reactor`]: crate::reactor::Reactor
//! [`Reactor::loading`]: crate::reactor::Reactor::loading

mod dispatcher;
mod errors;
mod events;

pub use self::dispatcher::{DispatchOutcome, Dispatcher, IgnoreReason};
pub use self::errors::DispatchError;
pub use self::events::{CommandErrorEvent, CommandEvent, CommandListener, ErrorListener};
