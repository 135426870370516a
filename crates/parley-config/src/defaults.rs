use crate::logging::LogFormat;

/// Command prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = ".";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default command prefix.
#[must_use]
pub const fn default_prefix() -> &'static str {
    DEFAULT_PREFIX
}

/// Owned command prefix used where allocation is required (e.g. serde).
#[must_use]
pub fn default_prefix_string() -> String {
    DEFAULT_PREFIX.to_owned()
}

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
///
/// The console bot shares its terminal with the conversation, so the
/// single-line compact format is preferred over JSON.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
