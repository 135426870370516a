//! Shell-like splitting of command text into flags and positional tokens.
//!
//! The tokenizer is configured with the command's declared flags, bucketed by
//! type. Boolean flags take no value (`--loud`, `--no-loud`), number and
//! string flags take the next token or an inline `--name=value`. Flag-like
//! tokens that were not declared are collected separately so the caller can
//! reject them. A bare `--` ends flag parsing.

use std::collections::BTreeMap;

use crate::coerce::ArgumentType;

use super::errors::CommandError;
use super::help::HelpInfo;

/// Flags a command accepts, bucketed by type, with their raw defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagConfig {
    boolean: Vec<String>,
    number: Vec<String>,
    string: Vec<String>,
    defaults: BTreeMap<String, String>,
}

impl FlagConfig {
    /// Builds the configuration from every non-positional argument.
    #[must_use]
    pub fn from_help(help: &HelpInfo) -> Self {
        let mut config = Self::default();
        for spec in help.args().iter().filter(|spec| !spec.is_positional()) {
            let name = spec.name().to_owned();
            if let Some(default) = spec.default_value() {
                config.defaults.insert(name.clone(), default.to_owned());
            }
            match spec.kind() {
                ArgumentType::Boolean => config.boolean.push(name),
                ArgumentType::Number => config.number.push(name),
                ArgumentType::String => config.string.push(name),
            }
        }
        config
    }

    /// Declared boolean flags.
    #[must_use]
    pub fn boolean(&self) -> &[String] {
        &self.boolean
    }

    /// Declared number flags.
    #[must_use]
    pub fn number(&self) -> &[String] {
        &self.number
    }

    /// Declared string flags.
    #[must_use]
    pub fn string(&self) -> &[String] {
        &self.string
    }

    /// Raw defaults of declared flags.
    #[must_use]
    pub const fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    fn kind_of(&self, name: &str) -> Option<ArgumentType> {
        let declared = |bucket: &[String]| bucket.iter().any(|flag| flag == name);
        if declared(&self.boolean) {
            Some(ArgumentType::Boolean)
        } else if declared(&self.number) {
            Some(ArgumentType::Number)
        } else if declared(&self.string) {
            Some(ArgumentType::String)
        } else {
            None
        }
    }
}

/// Result of tokenizing command text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    /// Non-flag tokens in order, including the command's literal words.
    pub positionals: Vec<String>,
    /// Values of declared flags, defaults applied.
    pub named: BTreeMap<String, String>,
    /// Flag-like tokens that were not declared.
    pub unknown: Vec<String>,
}

/// Splits `text` using the given flag configuration.
///
/// # Errors
///
/// Returns [`CommandError::MissingFlagValue`] when a number or string flag is
/// the last token and has no inline value.
pub fn tokenize(text: &str, config: &FlagConfig) -> Result<Tokens, CommandError> {
    let mut tokens = Tokens::default();
    let mut words = split_words(text).into_iter();
    let mut terminated = false;

    while let Some(word) = words.next() {
        if terminated || !is_flag_like(&word) {
            tokens.positionals.push(word);
            continue;
        }
        if word == "--" {
            terminated = true;
            continue;
        }

        let body = word.trim_start_matches('-');
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        match config.kind_of(name) {
            Some(ArgumentType::Boolean) => {
                let value = inline.map_or(true, |raw| !is_false(raw));
                tokens.named.insert(name.to_owned(), value.to_string());
            }
            Some(ArgumentType::Number | ArgumentType::String) => {
                let value = match inline {
                    Some(value) => value.to_owned(),
                    None => words
                        .next()
                        .ok_or_else(|| CommandError::missing_flag_value(name))?,
                };
                tokens.named.insert(name.to_owned(), value);
            }
            None => match name
                .strip_prefix("no-")
                .filter(|negated| config.kind_of(negated) == Some(ArgumentType::Boolean))
            {
                Some(negated) => {
                    tokens.named.insert(negated.to_owned(), false.to_string());
                }
                None => tokens.unknown.push(word),
            },
        }
    }

    for (name, default) in &config.defaults {
        tokens
            .named
            .entry(name.clone())
            .or_insert_with(|| default.clone());
    }
    Ok(tokens)
}

/// Splits with POSIX shell quoting rules, so an unquoted word starting with
/// `#` opens a comment. Text with unbalanced quotes or a dangling escape
/// falls back to plain whitespace splitting.
fn split_words(text: &str) -> Vec<String> {
    shlex::split(text)
        .unwrap_or_else(|| text.split_whitespace().map(str::to_owned).collect())
}

fn is_flag_like(word: &str) -> bool {
    word.len() > 1 && word.starts_with('-') && word.parse::<f64>().is_err()
}

fn is_false(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off")
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::coerce::ArgumentType;
    use crate::command::help::{ArgumentOptions, HelpInfo, HelpOptions};

    #[fixture]
    fn config() -> FlagConfig {
        let options = HelpOptions::new("play", "Play audio.")
            .arg("loud", ArgumentOptions::new().kind(ArgumentType::Boolean))
            .arg(
                "volume",
                ArgumentOptions::new()
                    .kind(ArgumentType::Number)
                    .default_value("50"),
            )
            .arg("source", "Where to play from.");
        FlagConfig::from_help(&HelpInfo::derive(&options, &[]))
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_owned()).collect()
    }

    #[rstest]
    fn buckets_flags_by_type(config: FlagConfig) {
        assert_eq!(config.boolean(), words(&["loud"]).as_slice());
        assert_eq!(config.number(), words(&["volume"]).as_slice());
        assert_eq!(config.string(), words(&["source"]).as_slice());
        assert_eq!(config.defaults().get("volume").map(String::as_str), Some("50"));
    }

    #[rstest]
    fn separates_flags_from_positionals(config: FlagConfig) {
        let tokens =
            tokenize("play --loud song.ogg --volume 80 --source=web", &config).expect("tokenize");
        assert_eq!(tokens.positionals, words(&["play", "song.ogg"]));
        assert_eq!(tokens.named.get("loud").map(String::as_str), Some("true"));
        assert_eq!(tokens.named.get("volume").map(String::as_str), Some("80"));
        assert_eq!(tokens.named.get("source").map(String::as_str), Some("web"));
        assert!(tokens.unknown.is_empty());
    }

    #[rstest]
    fn applies_defaults_for_absent_flags(config: FlagConfig) {
        let tokens = tokenize("play", &config).expect("tokenize");
        assert_eq!(tokens.named.get("volume").map(String::as_str), Some("50"));
        assert!(!tokens.named.contains_key("loud"));
    }

    #[rstest]
    fn negated_boolean_flag_is_false(config: FlagConfig) {
        let tokens = tokenize("play --no-loud", &config).expect("tokenize");
        assert_eq!(tokens.named.get("loud").map(String::as_str), Some("false"));
    }

    #[rstest]
    fn collects_undeclared_flags(config: FlagConfig) {
        let tokens = tokenize("play --bogus -x track", &config).expect("tokenize");
        assert_eq!(tokens.unknown, words(&["--bogus", "-x"]));
        assert_eq!(tokens.positionals, words(&["play", "track"]));
    }

    #[rstest]
    fn negative_numbers_are_positional(config: FlagConfig) {
        let tokens = tokenize("seek -10", &config).expect("tokenize");
        assert_eq!(tokens.positionals, words(&["seek", "-10"]));
        assert!(tokens.unknown.is_empty());
    }

    #[rstest]
    fn terminator_stops_flag_parsing(config: FlagConfig) {
        let tokens = tokenize("say -- --loud", &config).expect("tokenize");
        assert_eq!(tokens.positionals, words(&["say", "--loud"]));
        assert!(!tokens.named.contains_key("loud"));
    }

    #[rstest]
    fn value_flag_without_value_is_an_error(config: FlagConfig) {
        let error = tokenize("play --volume", &config).expect_err("missing value");
        assert!(matches!(error, CommandError::MissingFlagValue { ref flag } if flag == "volume"));
    }

    #[rstest]
    #[case(r#"say "hello world" now"#, &["say", "hello world", "now"])]
    #[case("say 'a b'", &["say", "a b"])]
    #[case("say don't stop", &["say", "don't", "stop"])]
    #[case("  spaced   out  ", &["spaced", "out"])]
    #[case(r#"say "a \"b\" c" d"#, &["say", r#"a "b" c"#, "d"])]
    #[case(r"say a\ b", &["say", "a b"])]
    #[case("say '#general' now", &["say", "#general", "now"])]
    #[case("say hi #aside", &["say", "hi"])]
    fn splits_quoted_words(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(split_words(input), words(expected));
    }

    #[rstest]
    fn quoted_flag_values_keep_their_spaces(config: FlagConfig) {
        let tokens = tokenize(r#"play --source "my \"mix\" tape" now"#, &config).expect("tokenize");
        assert_eq!(
            tokens.named.get("source").map(String::as_str),
            Some(r#"my "mix" tape"#)
        );
        assert_eq!(tokens.positionals, words(&["play", "now"]));
    }
}
