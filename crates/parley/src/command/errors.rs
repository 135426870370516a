//! Errors raised while matching and parsing command text.

use thiserror::Error;

use crate::coerce::CoerceError;

/// Failures of [`Command::parse`](super::Command::parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// None of the command's patterns matches the text.
    #[error("message isn't intended for this command ({text})")]
    NoMatchingPattern {
        /// Prefix-stripped message text.
        text: String,
    },

    /// The text contains flags the command does not declare.
    #[error("unknown arguments ('{}')", .tokens.join("','"))]
    UnknownArguments {
        /// Offending tokens as typed.
        tokens: Vec<String>,
    },

    /// A number or string flag ended the text without a value.
    #[error("flag '--{flag}' expects a value")]
    MissingFlagValue {
        /// Flag name without dashes.
        flag: String,
    },

    /// An argument value could not be converted to its declared type.
    #[error(transparent)]
    Coerce(#[from] CoerceError),
}

impl CommandError {
    /// Creates a no-match error.
    #[must_use]
    pub fn no_matching_pattern(text: impl Into<String>) -> Self {
        Self::NoMatchingPattern { text: text.into() }
    }

    /// Creates a missing flag value error.
    #[must_use]
    pub fn missing_flag_value(flag: impl Into<String>) -> Self {
        Self::MissingFlagValue { flag: flag.into() }
    }
}
