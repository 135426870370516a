//! Command registry and the per-message dispatch sequence.

use std::sync::Arc;

use parley_config::Config;
use tracing::{debug, error, warn};

use crate::client::ChatMessage;
use crate::command::help::{HelpCatalog, HelpInfo};
use crate::command::{Arguments, Command, CommandContext, CommandHandler};
use crate::pattern::{PatternError, PatternSet};
use crate::reactor::Reactor;

use super::errors::DispatchError;
use super::events::{CommandErrorEvent, CommandEvent, Listeners};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Tracing target for command registration.
pub(crate) const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Why a message was not handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The text does not start with the configured prefix.
    MissingPrefix,
    /// No registered command matches the text.
    NoMatchingCommand,
}

/// Result of dispatching one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message was not meant for any command; no events were emitted.
    Ignored(IgnoreReason),
    /// The handler completed.
    Completed,
    /// The command failed and the error listeners were notified.
    Failed,
}

/// Routes inbound messages to registered commands.
///
/// Commands are registered through `&mut self` during setup; dispatching only
/// needs `&self`, so a configured dispatcher can be shared behind an [`Arc`].
///
/// # Example
///
/// ```
/// use parley::{Command, CommandContext, Dispatcher, HelpOptions};
///
/// let mut dispatcher = Dispatcher::new("!");
/// let ping = Command::builder("ping", |context: CommandContext| async move {
///     context.message().reply("pong").await?;
///     anyhow::Ok(())
/// })
/// .help(HelpOptions::new("ping", "Check the bot is alive."))
/// .build()
/// .expect("valid pattern");
/// dispatcher.register(ping);
///
/// let info = dispatcher.help_for("ping").expect("help declared");
/// assert_eq!(info.example(), Some("!ping"));
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    prefix: String,
    commands: Vec<Command>,
    catalog: HelpCatalog,
    reactor: Reactor,
    listeners: Listeners,
}

impl Dispatcher {
    /// Creates an empty dispatcher for messages starting with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            commands: Vec::new(),
            catalog: HelpCatalog::default(),
            reactor: Reactor::new(),
            listeners: Listeners::default(),
        }
    }

    /// Creates an empty dispatcher using the configured prefix.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.prefix())
    }

    /// The configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Adds a command. Earlier registrations take precedence when several
    /// commands match the same text.
    pub fn register(&mut self, command: Command) -> &mut Self {
        if let Some(template) = command.patterns().first().map(|pattern| pattern.original()) {
            if self
                .commands
                .iter()
                .filter_map(|existing| existing.patterns().first())
                .any(|existing| existing.original() == template)
            {
                warn!(
                    target: REGISTRY_TARGET,
                    template, "command shadowed by an earlier registration"
                );
            }
            debug!(target: REGISTRY_TARGET, template, "command registered");
        }

        self.commands.push(command);
        self.catalog = HelpCatalog::new(self.help());
        self
    }

    /// Builds and registers a command without help metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when a template is invalid.
    pub fn command(
        &mut self,
        patterns: impl Into<PatternSet>,
        handler: impl CommandHandler + 'static,
    ) -> Result<&mut Self, PatternError> {
        let command = Command::new(patterns, handler)?;
        Ok(self.register(command))
    }

    /// Registered commands in registration order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The reactor used to mark progress.
    #[must_use]
    pub const fn reactor(&self) -> &Reactor {
        &self.reactor
    }

    /// Mutable access to the reactor, for replacing marker sets.
    pub fn reactor_mut(&mut self) -> &mut Reactor {
        &mut self.reactor
    }

    /// Subscribes to the event emitted before a handler runs.
    pub fn on_before<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&CommandEvent<'_>) + Send + Sync + 'static,
    {
        self.listeners.before.push(Box::new(listener));
        self
    }

    /// Subscribes to the event emitted after a handler completes.
    pub fn on_after<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&CommandEvent<'_>) + Send + Sync + 'static,
    {
        self.listeners.after.push(Box::new(listener));
        self
    }

    /// Subscribes to dispatch failures.
    ///
    /// With at least one error listener, failures are reported here and the
    /// dispatch resolves to [`DispatchOutcome::Failed`]; without one they are
    /// returned as errors.
    pub fn on_error<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&CommandErrorEvent<'_>) + Send + Sync + 'static,
    {
        self.listeners.error.push(Box::new(listener));
        self
    }

    /// Help metadata of every command that declares it, in registration
    /// order.
    #[must_use]
    pub fn help(&self) -> Vec<HelpInfo> {
        self.commands
            .iter()
            .filter_map(|command| command.help(&self.prefix))
            .collect()
    }

    /// Help metadata of the first command declaring `name`.
    #[must_use]
    pub fn help_for(&self, name: &str) -> Option<HelpInfo> {
        self.commands
            .iter()
            .find(|command| command.help_name() == Some(name))
            .and_then(|command| command.help(&self.prefix))
    }

    /// Snapshot of [`Dispatcher::help`] handed to handlers.
    #[must_use]
    pub const fn catalog(&self) -> &HelpCatalog {
        &self.catalog
    }

    /// Handles one inbound message.
    ///
    /// # Errors
    ///
    /// Returns the parse or handler failure when no error listener is
    /// registered.
    pub async fn dispatch(
        &self,
        message: Arc<dyn ChatMessage>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(text) = message.content().strip_prefix(self.prefix.as_str()) else {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::MissingPrefix));
        };

        let Some(command) = self
            .commands
            .iter()
            .find(|command| command.matches(text).is_some())
        else {
            debug!(target: DISPATCH_TARGET, text, "no command matches");
            return Ok(DispatchOutcome::Ignored(IgnoreReason::NoMatchingCommand));
        };

        let args = match command.parse(text) {
            Ok(args) => args,
            Err(error) => return self.fail(message.as_ref(), None, error.into()),
        };
        debug!(target: DISPATCH_TARGET, text, ?args, "dispatching command");

        self.listeners.emit_before(&CommandEvent {
            message: message.as_ref(),
            args: &args,
        });

        let context = CommandContext::new(Arc::clone(&message), args.clone(), self.catalog.clone());
        match self
            .reactor
            .loading(message.as_ref(), command.exec(context))
            .await
        {
            Ok(()) => {
                self.listeners.emit_after(&CommandEvent {
                    message: message.as_ref(),
                    args: &args,
                });
                Ok(DispatchOutcome::Completed)
            }
            Err(source) => self.fail(message.as_ref(), Some(&args), DispatchError::handler(source)),
        }
    }

    fn fail(
        &self,
        message: &dyn ChatMessage,
        args: Option<&Arguments>,
        error: DispatchError,
    ) -> Result<DispatchOutcome, DispatchError> {
        let delivered = self.listeners.emit_error(&CommandErrorEvent {
            message,
            args,
            error: &error,
        });
        if delivered {
            debug!(target: DISPATCH_TARGET, %error, "command failure reported to listeners");
            Ok(DispatchOutcome::Failed)
        } else {
            error!(target: DISPATCH_TARGET, %error, "command failed");
            Err(error)
        }
    }
}
