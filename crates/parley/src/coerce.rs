//! Conversion of raw argument text into typed values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while converting argument text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// The requested type name is not one of `boolean`, `number`, `string`.
    #[error("unable to coerce the given type ({name})")]
    UnsupportedType {
        /// Type name as requested.
        name: String,
    },

    /// Text declared as a number did not parse as a finite one.
    #[error("'{value}' is not a number")]
    InvalidNumber {
        /// Offending text.
        value: String,
    },
}

/// Declared type of a command argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    /// `true`/`false` flags.
    Boolean,
    /// Floating-point numbers.
    Number,
    /// Free text.
    #[default]
    String,
}

impl ArgumentType {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArgumentType {
    type Err = CoerceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "boolean" => Ok(Self::Boolean),
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            _ => Err(CoerceError::UnsupportedType {
                name: value.to_owned(),
            }),
        }
    }
}

/// A typed argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// No value was supplied and no default was declared.
    Null,
    /// A boolean value.
    Boolean(bool),
    /// A numeric value.
    Number(f64),
    /// A text value.
    String(String),
}

impl ArgValue {
    /// Returns `true` for [`ArgValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value of a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value of a number.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

/// Converts raw argument text into a value of the declared type.
///
/// Absent input yields [`ArgValue::Null`] and empty input is returned as an
/// empty string without conversion, so an unset argument never turns into
/// `false` or `0`.
///
/// # Errors
///
/// Returns [`CoerceError::InvalidNumber`] when a number does not parse or
/// is not finite (`NaN`, `inf`).
///
/// # Example
///
/// ```
/// use parley::{ArgValue, ArgumentType, coerce};
///
/// assert_eq!(coerce(ArgumentType::Number, Some("42")), Ok(ArgValue::Number(42.0)));
/// assert_eq!(coerce(ArgumentType::Boolean, Some("")), Ok(ArgValue::String(String::new())));
/// assert_eq!(coerce(ArgumentType::String, None), Ok(ArgValue::Null));
/// ```
pub fn coerce(kind: ArgumentType, raw: Option<&str>) -> Result<ArgValue, CoerceError> {
    let Some(text) = raw else {
        return Ok(ArgValue::Null);
    };
    if text.is_empty() {
        return Ok(ArgValue::String(String::new()));
    }

    match kind {
        ArgumentType::Boolean => Ok(ArgValue::Boolean(parse_bool(text))),
        ArgumentType::Number => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(ArgValue::Number)
            .ok_or_else(|| CoerceError::InvalidNumber {
                value: text.to_owned(),
            }),
        ArgumentType::String => Ok(ArgValue::String(text.to_owned())),
    }
}

/// Resolves the type by name and then coerces.
///
/// # Errors
///
/// Returns [`CoerceError::UnsupportedType`] for unknown type names, otherwise
/// as [`coerce`].
pub fn coerce_named(type_name: &str, raw: Option<&str>) -> Result<ArgValue, CoerceError> {
    coerce(type_name.parse()?, raw)
}

fn parse_bool(text: &str) -> bool {
    !matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}
