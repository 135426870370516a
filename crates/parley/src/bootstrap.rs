//! Bot bootstrap and the console message loop.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};

use parley_config::Config;

use crate::client::{ClientError, Presence};
use crate::console::ConsoleSink;
use crate::dispatch::Dispatcher;
use crate::health::HealthReporter;
use crate::pattern::PatternError;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the bot configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a fixed configuration.
#[derive(Debug, Default, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// A command failed to register.
    #[error("failed to register commands: {source}")]
    Registration {
        /// Template compilation error.
        #[source]
        source: PatternError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Bot {
    config: Config,
    dispatcher: Dispatcher,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Bot {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The configured dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Dispatches every non-blank line of `input` as a message whose replies
    /// and reactions go to `sink`, until `input` ends. The bot then goes
    /// offline and `sink` is closed.
    ///
    /// Dispatch failures are reported and do not stop the loop.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] when reading `input` or closing `sink`
    /// fails, and [`ClientError::Closed`] when `sink` was already closed.
    pub async fn run<R, W>(&self, input: R, sink: &ConsoleSink<W>) -> Result<(), ClientError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match self.dispatcher.dispatch(Arc::new(sink.message(line))).await {
                Ok(outcome) => self.reporter.message_dispatched(outcome),
                Err(error) => self.reporter.dispatch_failed(&error),
            }
        }
        sink.go_offline().await?;
        sink.close().await
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Bootstraps the bot using the supplied collaborators.
///
/// `setup` registers commands on a dispatcher created from the loaded
/// configuration.
///
/// # Errors
///
/// Returns a [`BootstrapError`] when configuration, telemetry or command
/// registration fails; the reporter is told before the error is returned.
pub fn bootstrap_with<S>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    setup: S,
) -> Result<Bot, BootstrapError>
where
    S: FnOnce(&mut Dispatcher) -> Result<(), PatternError>,
{
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let mut dispatcher = Dispatcher::from_config(&config);
    if let Err(source) = setup(&mut dispatcher) {
        let error = BootstrapError::Registration { source };
        reporter.bootstrap_failed(&error);
        return Err(error);
    }

    reporter.bootstrap_succeeded(&config);
    Ok(Bot {
        config,
        dispatcher,
        telemetry,
        reporter,
    })
}
