//! Text-command routing for chat clients.
//!
//! Parley matches inbound chat messages against registered command
//! templates, extracts typed arguments and runs the matching handler while
//! the message shows its progress through reactions.
//!
//! A template such as `play <uri>` or `say <...text>` compiles into a
//! [`Pattern`]. A [`Command`] owns one or more patterns, optional help
//! metadata declared through [`HelpOptions`], and a handler. The
//! [`Dispatcher`] strips the configured prefix from each message, picks the
//! first command whose patterns match, parses its arguments and runs the
//! handler inside [`Reactor::loading`], which attaches an awaiting marker,
//! then a success or failure marker, and finally removes its own awaiting
//! marker.
//!
//! The router never talks to a network. Chat clients implement
//! [`ChatMessage`] and [`MessageReaction`]; the [`console`] module provides
//! an implementation over text streams that the `parley` binary uses.
//!
//! ```
//! use std::sync::Arc;
//!
//! use parley::console::ConsoleSink;
//! use parley::{Dispatcher, DispatchOutcome, commands};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut dispatcher = Dispatcher::new(".");
//! commands::register_echo(&mut dispatcher)?;
//!
//! let sink = ConsoleSink::new(Vec::new());
//! let outcome = dispatcher.dispatch(Arc::new(sink.message(".echo hi"))).await?;
//! assert_eq!(outcome, DispatchOutcome::Completed);
//! # Ok(())
//! # }
//! ```

mod bootstrap;
pub mod client;
pub mod coerce;
pub mod command;
pub mod commands;
pub mod console;
pub mod dispatch;
mod health;
pub mod pattern;
pub mod reactor;
pub mod telemetry;

pub use bootstrap::{
    BootstrapError, Bot, ConfigLoader, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use client::{
    ChannelInfo, ChannelKind, ChatMessage, ClientError, MessageReaction, Presence, ReactionUser,
    TextChannels,
};
pub use coerce::{ArgValue, ArgumentType, CoerceError, coerce, coerce_named};
pub use command::help::{
    ArgumentOptions, ArgumentSpec, DEFAULT_GROUP, HelpCatalog, HelpGroup, HelpInfo, HelpOptions,
};
pub use command::tokenizer::FlagConfig;
pub use command::{
    Arguments, Command, CommandBuilder, CommandContext, CommandError, CommandHandler,
};
pub use dispatch::{
    CommandErrorEvent, CommandEvent, DispatchError, DispatchOutcome, Dispatcher, IgnoreReason,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use pattern::{Pattern, PatternError, PatternInput, PatternSet, PositionalSlot, patterns};
pub use reactor::{MarkerRole, ReactionMarkers, Reactor, ReactorError};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
