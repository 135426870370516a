//! Command template normalisation.
//!
//! A template such as `play <uri>` or `say <...text>` is compiled into a
//! [`Pattern`]: a case-insensitive regular expression anchored at the start
//! of the prefix-stripped message, plus the ordered list of named slots the
//! placeholders declared. `<name>` captures a single whitespace-free token and
//! `<...name>` captures everything that remains.
//!
//! Argument values are later read back by word position, so every
//! placeholder must occupy a whole whitespace-delimited word and a rest
//! placeholder must end the template.

use std::fmt;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Regex fragment substituted for a single-token placeholder.
const TOKEN_CAPTURE: &str = r"(\S+)";
/// Regex fragment substituted for a rest placeholder.
const REST_CAPTURE: &str = "(.+)";
/// Marker distinguishing a rest placeholder from a single-token one.
const REST_MARKER: &str = "...";

/// Errors raised while compiling a command template.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A command was registered without any pattern.
    #[error("a command needs at least one pattern")]
    Empty,

    /// A placeholder did not name its slot (for example `<...>`).
    #[error("placeholder without a name in template '{template}'")]
    EmptySlotName {
        /// Template containing the placeholder.
        template: String,
    },

    /// The same slot name was declared twice in one template.
    #[error("slot '{name}' is declared more than once in template '{template}'")]
    DuplicateSlot {
        /// Template containing the duplicate.
        template: String,
        /// Repeated slot name.
        name: String,
    },

    /// A slot name contained whitespace.
    #[error("slot name '{name}' in template '{template}' contains whitespace")]
    InvalidSlotName {
        /// Template containing the placeholder.
        template: String,
        /// Offending slot name.
        name: String,
    },

    /// A rest slot was followed by another slot or by literal text.
    #[error("rest slot '{name}' must end template '{template}'")]
    MisplacedRest {
        /// Template containing the rest slot.
        template: String,
        /// Name of the offending rest slot.
        name: String,
    },

    /// A placeholder shared its word with literal text or another placeholder.
    #[error("placeholder in '{word}' must span a whole word in template '{template}'")]
    EmbeddedSlot {
        /// Template containing the placeholder.
        template: String,
        /// Whitespace-delimited word holding the placeholder.
        word: String,
    },

    /// The generated expression failed to compile.
    #[error("template '{template}' produced an invalid expression: {source}")]
    InvalidRegex {
        /// Template that produced the expression.
        template: String,
        /// Underlying compilation error.
        #[source]
        source: regex::Error,
    },
}

impl PatternError {
    fn empty_slot_name(template: &str) -> Self {
        Self::EmptySlotName {
            template: template.to_owned(),
        }
    }

    fn duplicate_slot(template: &str, name: &str) -> Self {
        Self::DuplicateSlot {
            template: template.to_owned(),
            name: name.to_owned(),
        }
    }

    fn misplaced_rest(template: &str, name: &str) -> Self {
        Self::MisplacedRest {
            template: template.to_owned(),
            name: name.to_owned(),
        }
    }
}

/// A named placeholder captured by a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalSlot {
    name: String,
    rest: bool,
}

impl PositionalSlot {
    /// Creates a slot.
    #[must_use]
    pub fn new(name: impl Into<String>, rest: bool) -> Self {
        Self {
            name: name.into(),
            rest,
        }
    }

    /// Returns the slot name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` when the slot absorbs every remaining token.
    #[must_use]
    pub const fn is_rest(&self) -> bool {
        self.rest
    }
}

/// A compiled command template.
///
/// # Example
///
/// ```
/// use parley::Pattern;
///
/// let pattern = Pattern::parse("say <...text>").expect("valid template");
/// assert!(pattern.is_match("SAY hello world"));
/// assert_eq!(pattern.names()[0].name(), "text");
/// assert!(pattern.names()[0].is_rest());
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    names: Vec<PositionalSlot>,
    /// Whitespace-delimited word index of each slot, parallel to `names`.
    positions: Vec<usize>,
    regex: Regex,
    original: String,
}

impl Pattern {
    /// Compiles a template into a pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when a placeholder is unnamed, a slot name is
    /// repeated, a rest slot does not end the template, a placeholder shares
    /// its word with other text, or the expression fails to compile.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        let mut source = String::from("^");
        let mut names: Vec<PositionalSlot> = Vec::new();

        for segment in segments(template) {
            match segment {
                Segment::Literal(text) => {
                    if let Some(rest) = names.iter().find(|existing| existing.rest) {
                        return Err(PatternError::misplaced_rest(template, &rest.name));
                    }
                    source.push_str(&regex::escape(text));
                }
                Segment::Slot(raw) => {
                    let slot = slot_from_placeholder(template, raw)?;
                    if names.iter().any(|existing| existing.name == slot.name) {
                        return Err(PatternError::duplicate_slot(template, &slot.name));
                    }
                    if let Some(previous) = names.iter().find(|existing| existing.rest) {
                        return Err(PatternError::misplaced_rest(template, &previous.name));
                    }
                    source.push_str(if slot.rest { REST_CAPTURE } else { TOKEN_CAPTURE });
                    names.push(slot);
                }
            }
        }

        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|source| PatternError::InvalidRegex {
                template: template.to_owned(),
                source,
            })?;

        Ok(Self {
            positions: slot_positions(template)?,
            names,
            regex,
            original: template.to_owned(),
        })
    }

    /// Returns the slots in declaration order.
    #[must_use]
    pub fn names(&self) -> &[PositionalSlot] {
        &self.names
    }

    /// Returns the compiled expression.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the template the pattern was compiled from.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Returns `true` when the pattern matches the start of `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Looks up a slot by name.
    ///
    /// Returns the slot together with the index of the whitespace-delimited
    /// word it occupies in the template, which is also the index of its value
    /// among the positional tokens of a matching message.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<(&PositionalSlot, usize)> {
        self.names
            .iter()
            .zip(self.positions.iter().copied())
            .find(|(slot, _)| slot.name == name)
    }

    /// Returns `true` when any slot carries the given name.
    #[must_use]
    pub fn has_slot(&self, name: &str) -> bool {
        self.names.iter().any(|slot| slot.name == name)
    }

    /// Length of the expression source, used to prefer the most specific
    /// pattern when several match.
    pub(crate) fn specificity(&self) -> usize {
        self.regex.as_str().len()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// A pattern as supplied at registration time.
#[derive(Debug, Clone)]
pub enum PatternInput {
    /// A template that still needs compiling.
    Template(String),
    /// A pattern compiled earlier, used unchanged.
    Compiled(Pattern),
}

impl PatternInput {
    /// Compiles the input, passing already compiled patterns through.
    ///
    /// # Errors
    ///
    /// Propagates [`Pattern::parse`] failures for templates.
    pub fn normalize(self) -> Result<Pattern, PatternError> {
        match self {
            Self::Template(template) => Pattern::parse(&template),
            Self::Compiled(pattern) => Ok(pattern),
        }
    }
}

impl From<&str> for PatternInput {
    fn from(template: &str) -> Self {
        Self::Template(template.to_owned())
    }
}

impl From<String> for PatternInput {
    fn from(template: String) -> Self {
        Self::Template(template)
    }
}

impl From<Pattern> for PatternInput {
    fn from(pattern: Pattern) -> Self {
        Self::Compiled(pattern)
    }
}

/// One or more pattern inputs, in declaration order.
///
/// Accepts a single template, a single compiled [`Pattern`], or an array or
/// vector of either.
#[derive(Debug, Clone, Default)]
pub struct PatternSet(Vec<PatternInput>);

impl PatternSet {
    /// Compiles every input, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Empty`] for an empty set, or the first
    /// compilation failure.
    pub fn normalize(self) -> Result<Vec<Pattern>, PatternError> {
        if self.0.is_empty() {
            return Err(PatternError::Empty);
        }
        self.0.into_iter().map(PatternInput::normalize).collect()
    }
}

impl From<&str> for PatternSet {
    fn from(template: &str) -> Self {
        Self(vec![template.into()])
    }
}

impl From<String> for PatternSet {
    fn from(template: String) -> Self {
        Self(vec![template.into()])
    }
}

impl From<Pattern> for PatternSet {
    fn from(pattern: Pattern) -> Self {
        Self(vec![pattern.into()])
    }
}

impl<T, const N: usize> From<[T; N]> for PatternSet
where
    T: Into<PatternInput>,
{
    fn from(inputs: [T; N]) -> Self {
        Self(inputs.into_iter().map(Into::into).collect())
    }
}

impl<T> From<Vec<T>> for PatternSet
where
    T: Into<PatternInput>,
{
    fn from(inputs: Vec<T>) -> Self {
        Self(inputs.into_iter().map(Into::into).collect())
    }
}

/// Compiles one or more templates into patterns.
///
/// # Errors
///
/// See [`PatternSet::normalize`].
pub fn patterns(inputs: impl Into<PatternSet>) -> Result<Vec<Pattern>, PatternError> {
    inputs.into().normalize()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Slot(&'a str),
}

/// Splits a template into literal text and `<...>` placeholders.
///
/// A `<` without a closing `>`, or whose body is empty or contains another
/// `<`, is literal text.
fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut output = Vec::new();
    let mut remaining = template;

    while let Some((before, tail)) = remaining.split_once('<') {
        match tail.split_once('>') {
            Some((body, after)) if !body.is_empty() && !body.contains('<') => {
                if !before.is_empty() {
                    output.push(Segment::Literal(before));
                }
                output.push(Segment::Slot(body));
                remaining = after;
            }
            _ => {
                output.push(Segment::Literal(before));
                output.push(Segment::Literal("<"));
                remaining = tail;
            }
        }
    }

    if !remaining.is_empty() {
        output.push(Segment::Literal(remaining));
    }
    output
}

fn slot_from_placeholder(template: &str, body: &str) -> Result<PositionalSlot, PatternError> {
    let (name, rest) = match body.strip_prefix(REST_MARKER) {
        Some(name) => (name, true),
        None => (body, false),
    };
    if name.trim().is_empty() {
        return Err(PatternError::empty_slot_name(template));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(PatternError::InvalidSlotName {
            template: template.to_owned(),
            name: name.to_owned(),
        });
    }
    Ok(PositionalSlot::new(name, rest))
}

/// Word index of every placeholder, in declaration order.
fn slot_positions(template: &str) -> Result<Vec<usize>, PatternError> {
    let mut positions = Vec::new();
    for (index, word) in template.split_whitespace().enumerate() {
        match segments(word).as_slice() {
            [Segment::Slot(_)] => positions.push(index),
            parts if parts.iter().any(|part| matches!(part, Segment::Slot(_))) => {
                return Err(PatternError::EmbeddedSlot {
                    template: template.to_owned(),
                    word: word.to_owned(),
                });
            }
            _ => {}
        }
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn single_slot_template_requires_a_token() {
        let pattern = Pattern::parse("cmd <a>").expect("valid template");
        assert_eq!(pattern.names(), &[PositionalSlot::new("a", false)]);
        assert!(pattern.is_match("cmd foo"));
        assert!(!pattern.is_match("cmd"));
    }

    #[test]
    fn rest_slot_captures_embedded_spaces() {
        let pattern = Pattern::parse("say <...text>").expect("valid template");
        let captures = pattern
            .regex()
            .captures("say hello world")
            .expect("template matches");
        assert_eq!(captures.get(1).map(|m| m.as_str()), Some("hello world"));
        assert!(pattern.names().first().is_some_and(PositionalSlot::is_rest));
    }

    #[rstest]
    #[case("HELP", true)]
    #[case("Help me", true)]
    #[case(" help", false)]
    #[case("hel", false)]
    fn matching_is_anchored_and_case_insensitive(#[case] input: &str, #[case] expected: bool) {
        let pattern = Pattern::parse("help").expect("valid template");
        assert_eq!(pattern.is_match(input), expected);
    }

    #[test]
    fn literal_text_is_escaped() {
        let pattern = Pattern::parse("c++ <file>").expect("valid template");
        assert!(pattern.is_match("c++ main.cpp"));
        assert!(!pattern.is_match("ccc main.cpp"));
    }

    #[test]
    fn unmatched_angle_bracket_is_literal() {
        let pattern = Pattern::parse("cmp a<b <x>").expect("valid template");
        assert_eq!(pattern.names(), &[PositionalSlot::new("x", false)]);
        assert!(pattern.is_match("cmp a<b 3"));
    }

    #[test]
    fn slot_positions_follow_template_words() {
        let pattern = Pattern::parse("give <item> to <user>").expect("valid template");
        assert_eq!(pattern.slot("item").map(|(_, index)| index), Some(1));
        assert_eq!(pattern.slot("user").map(|(_, index)| index), Some(3));
        assert!(pattern.slot("missing").is_none());
    }

    #[rstest]
    #[case("say <...text> <tail>")]
    #[case("say <...a> <...b>")]
    #[case("say <...text> now")]
    #[case("say <...text>!")]
    fn rest_slot_must_be_last(#[case] template: &str) {
        let error = Pattern::parse(template).expect_err("rest slot is misplaced");
        assert!(matches!(error, PatternError::MisplacedRest { .. }));
    }

    #[rstest]
    #[case("roll <n>d<sides>", "<n>d<sides>")]
    #[case("roll d<sides>", "d<sides>")]
    #[case("tag <a><b>", "<a><b>")]
    #[case("ping <host>:<port>", "<host>:<port>")]
    fn placeholders_must_span_whole_words(#[case] template: &str, #[case] expected: &str) {
        let error = Pattern::parse(template).expect_err("placeholder shares its word");
        assert!(
            matches!(error, PatternError::EmbeddedSlot { ref word, .. } if word == expected),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn duplicate_slot_names_are_rejected() {
        let error = Pattern::parse("swap <a> <a>").expect_err("duplicate slot");
        assert!(matches!(error, PatternError::DuplicateSlot { ref name, .. } if name == "a"));
    }

    #[test]
    fn unnamed_rest_placeholder_is_rejected() {
        let error = Pattern::parse("say <...>").expect_err("unnamed slot");
        assert!(matches!(error, PatternError::EmptySlotName { .. }));
    }

    #[test]
    fn slot_names_cannot_contain_whitespace() {
        let error = Pattern::parse("find <first name>").expect_err("spaced slot");
        assert!(matches!(error, PatternError::InvalidSlotName { .. }));
    }

    #[test]
    fn compiled_patterns_pass_through_unchanged() {
        let compiled = Pattern::parse("ping").expect("valid template");
        let normalized = patterns(vec![
            PatternInput::from(compiled),
            PatternInput::from("ping <host>"),
        ])
        .expect("valid set");
        let originals: Vec<&str> = normalized.iter().map(Pattern::original).collect();
        assert_eq!(originals, vec!["ping", "ping <host>"]);
    }

    #[test]
    fn empty_pattern_set_is_rejected() {
        let error = patterns(Vec::<String>::new()).expect_err("empty set");
        assert!(matches!(error, PatternError::Empty));
    }
}
