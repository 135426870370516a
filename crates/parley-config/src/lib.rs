//! Shared configuration for the Parley command router.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then an
//! optional configuration file, then `PARLEY_*` environment variables, then
//! command-line flags. The resulting [`Config`] carries the command prefix,
//! the opaque client token, and the telemetry settings consumed by the
//! binary.

use std::fmt;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_PREFIX, default_log_filter, default_log_filter_string,
    default_log_format, default_prefix, default_prefix_string,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration shared by the router and its binaries.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "PARLEY")]
pub struct Config {
    /// Literal text a message must start with to be treated as a command.
    #[ortho_config(default = defaults::default_prefix_string())]
    pub prefix: String,
    /// Credential handed to the chat client. Opaque to the router.
    #[serde(default)]
    pub token: Option<String>,
    /// `tracing` filter expression applied to the subscriber.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format used by the telemetry subscriber.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Config {
    /// Returns the configured command prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    /// Returns the client token, if one was configured.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: default_prefix_string(),
            token: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("prefix", &self.prefix)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("log_filter", &self.log_filter)
            .field("log_format", &self.log_format)
            .finish()
    }
}
