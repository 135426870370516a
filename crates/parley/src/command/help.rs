//! Help metadata declared for commands.
//!
//! Commands describe themselves with [`HelpOptions`]. Building a command turns
//! those options into a frozen [`HelpInfo`]: each argument gets a type
//! (defaulting to `string`) and is classified as positional when one of the
//! command's patterns has a slot with the same name. Everything else is a
//! named `--flag`.

use std::sync::Arc;

use serde::Serialize;

use crate::coerce::ArgumentType;
use crate::pattern::Pattern;

/// Group assigned to commands that do not declare one.
pub const DEFAULT_GROUP: &str = "General";

/// Declaration of a single argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentOptions {
    kind: Option<ArgumentType>,
    default: Option<String>,
    description: Option<String>,
}

impl ArgumentOptions {
    /// Starts an empty declaration (a `string` without description).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the argument type.
    #[must_use]
    pub fn kind(mut self, kind: ArgumentType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the raw default, coerced like user input.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the description shown in help output.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<&str> for ArgumentOptions {
    fn from(description: &str) -> Self {
        Self::new().description(description)
    }
}

impl From<String> for ArgumentOptions {
    fn from(description: String) -> Self {
        Self::new().description(description)
    }
}

/// Help declaration supplied when building a command.
///
/// # Example
///
/// ```
/// use parley::{ArgumentOptions, ArgumentType, HelpOptions};
///
/// let options = HelpOptions::new("roll", "Roll some dice.")
///     .group("Games")
///     .arg("sides", ArgumentOptions::new().kind(ArgumentType::Number).default_value("6"))
///     .arg("verbose", "Show every die.");
/// assert_eq!(options.name(), "roll");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpOptions {
    name: String,
    description: String,
    group: Option<String>,
    args: Vec<(String, ArgumentOptions)>,
}

impl HelpOptions {
    /// Starts a declaration with the command's name and description.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            group: None,
            args: Vec::new(),
        }
    }

    /// Sets the group the command is listed under.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Declares an argument. Redeclaring a name replaces the earlier entry.
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, options: impl Into<ArgumentOptions>) -> Self {
        let name = name.into();
        let options = options.into();
        match self.args.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = options,
            None => self.args.push((name, options)),
        }
        self
    }

    /// Returns the declared command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Frozen description of one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentSpec {
    name: String,
    #[serde(rename = "type")]
    kind: ArgumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    positional: bool,
}

impl ArgumentSpec {
    /// Argument name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[must_use]
    pub const fn kind(&self) -> ArgumentType {
        self.kind
    }

    /// Raw default value.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Description shown in help output.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the value comes from a pattern slot rather than a flag.
    #[must_use]
    pub const fn is_positional(&self) -> bool {
        self.positional
    }

    /// Name as typed by users: bare for positionals, `--name` for flags.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.positional {
            self.name.clone()
        } else {
            format!("--{}", self.name)
        }
    }
}

/// Frozen help metadata for a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpInfo {
    name: String,
    description: String,
    group: String,
    args: Vec<ArgumentSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<String>,
}

impl HelpInfo {
    /// Derives help metadata from the declaration and the command's patterns.
    #[must_use]
    pub fn derive(options: &HelpOptions, patterns: &[Pattern]) -> Self {
        let args = options
            .args
            .iter()
            .map(|(name, declared)| ArgumentSpec {
                name: name.clone(),
                kind: declared.kind.unwrap_or_default(),
                default: declared.default.clone(),
                description: declared.description.clone(),
                positional: patterns.iter().any(|pattern| pattern.has_slot(name)),
            })
            .collect();

        Self {
            name: options.name.clone(),
            description: options.description.clone(),
            group: options
                .group
                .clone()
                .unwrap_or_else(|| DEFAULT_GROUP.to_owned()),
            args,
            example: None,
        }
    }

    /// Returns a copy whose example is `prefix` followed by `template`.
    #[must_use]
    pub fn with_example(&self, prefix: &str, template: &str) -> Self {
        Self {
            example: Some(format!("{prefix}{template}")),
            ..self.clone()
        }
    }

    /// Command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Group the command is listed under.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Declared arguments in declaration order.
    #[must_use]
    pub fn args(&self) -> &[ArgumentSpec] {
        &self.args
    }

    /// Looks up an argument by name.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&ArgumentSpec> {
        self.args.iter().find(|spec| spec.name == name)
    }

    /// Usage example, available once a prefix has been applied.
    #[must_use]
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }
}

/// Commands sharing a help group, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpGroup<'a> {
    /// Group name.
    pub name: &'a str,
    /// Commands in the group, in registration order.
    pub commands: Vec<&'a HelpInfo>,
}

/// Snapshot of the help metadata of every registered command.
///
/// Cloning is cheap; handlers receive the snapshot taken when the dispatcher
/// was last modified.
#[derive(Debug, Clone, Default)]
pub struct HelpCatalog {
    entries: Arc<[HelpInfo]>,
}

impl HelpCatalog {
    /// Wraps the given entries.
    #[must_use]
    pub fn new(entries: Vec<HelpInfo>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// All entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[HelpInfo] {
        &self.entries
    }

    /// Finds the first entry with the given command name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&HelpInfo> {
        self.entries.iter().find(|info| info.name == name)
    }

    /// Groups entries by group name, groups ordered by first appearance.
    #[must_use]
    pub fn groups(&self) -> Vec<HelpGroup<'_>> {
        let mut groups: Vec<HelpGroup<'_>> = Vec::new();
        for info in self.entries.iter() {
            match groups.iter_mut().find(|group| group.name == info.group) {
                Some(group) => group.commands.push(info),
                None => groups.push(HelpGroup {
                    name: &info.group,
                    commands: vec![info],
                }),
            }
        }
        groups
    }
}
