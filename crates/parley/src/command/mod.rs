//! Commands: patterns, argument parsing, help metadata and handlers.
//!
//! A [`Command`] is built once through [`CommandBuilder`] and is immutable
//! afterwards. Matching selects the most specific of the command's patterns;
//! parsing tokenizes the text, binds positional slots by their word position
//! in the matched template and coerces every declared argument.

mod errors;
pub mod help;
pub mod tokenizer;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

pub use self::errors::CommandError;
use self::help::{ArgumentSpec, HelpCatalog, HelpInfo, HelpOptions};
use self::tokenizer::{FlagConfig, Tokens, tokenize};
use crate::client::ChatMessage;
use crate::coerce::{ArgValue, coerce};
use crate::pattern::{Pattern, PatternError, PatternSet};

/// Parsed arguments keyed by declared name.
pub type Arguments = BTreeMap<String, ArgValue>;

/// Everything a handler receives for one invocation.
#[derive(Clone)]
pub struct CommandContext {
    message: Arc<dyn ChatMessage>,
    args: Arguments,
    catalog: HelpCatalog,
}

impl CommandContext {
    /// Bundles the inbound message, its parsed arguments and the help
    /// snapshot of the dispatcher.
    #[must_use]
    pub fn new(message: Arc<dyn ChatMessage>, args: Arguments, catalog: HelpCatalog) -> Self {
        Self {
            message,
            args,
            catalog,
        }
    }

    /// The message that triggered the command.
    #[must_use]
    pub fn message(&self) -> &dyn ChatMessage {
        self.message.as_ref()
    }

    /// Parsed arguments.
    #[must_use]
    pub const fn args(&self) -> &Arguments {
        &self.args
    }

    /// Looks up one argument; undeclared names yield `None`.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&ArgValue> {
        self.args.get(name)
    }

    /// Help metadata of every registered command.
    #[must_use]
    pub const fn catalog(&self) -> &HelpCatalog {
        &self.catalog
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("content", &self.message.content())
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Code run when a command matches.
///
/// Any `Fn(CommandContext) -> impl Future<Output = anyhow::Result<()>>`
/// closure is a handler.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Runs the command.
    async fn handle(&self, context: CommandContext) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> CommandHandler for F
where
    F: Fn(CommandContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, context: CommandContext) -> anyhow::Result<()> {
        (self)(context).await
    }
}

/// A registered text command.
pub struct Command {
    patterns: Vec<Pattern>,
    handler: Arc<dyn CommandHandler>,
    help: Option<HelpInfo>,
    flags: FlagConfig,
}

impl Command {
    /// Starts building a command from its patterns and handler.
    #[must_use]
    pub fn builder(
        patterns: impl Into<PatternSet>,
        handler: impl CommandHandler + 'static,
    ) -> CommandBuilder {
        CommandBuilder {
            patterns: patterns.into(),
            handler: Arc::new(handler),
            help: None,
        }
    }

    /// Builds a command without help metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when a template is invalid.
    pub fn new(
        patterns: impl Into<PatternSet>,
        handler: impl CommandHandler + 'static,
    ) -> Result<Self, PatternError> {
        Self::builder(patterns, handler).build()
    }

    /// Patterns in declaration order.
    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Returns the most specific pattern matching `text`.
    ///
    /// Specificity is the length of the compiled expression; the earliest
    /// declared pattern wins a tie.
    #[must_use]
    pub fn matches(&self, text: &str) -> Option<&Pattern> {
        self.patterns
            .iter()
            .filter(|pattern| pattern.is_match(text))
            .fold(None, |best: Option<&Pattern>, candidate| match best {
                Some(current) if current.specificity() >= candidate.specificity() => Some(current),
                _ => Some(candidate),
            })
    }

    /// Extracts and coerces the declared arguments from `text`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NoMatchingPattern`] when no pattern matches,
    /// [`CommandError::UnknownArguments`] for undeclared flags, and the
    /// tokenizer and coercion failures otherwise.
    pub fn parse(&self, text: &str) -> Result<Arguments, CommandError> {
        let pattern = self
            .matches(text)
            .ok_or_else(|| CommandError::no_matching_pattern(text))?;

        let tokens = tokenize(text, &self.flags)?;
        if !tokens.unknown.is_empty() {
            return Err(CommandError::UnknownArguments {
                tokens: tokens.unknown,
            });
        }

        let Some(help) = &self.help else {
            return Ok(Arguments::new());
        };

        help.args()
            .iter()
            .map(|spec| {
                let raw = raw_value(spec, pattern, &tokens)
                    .filter(|value| !value.is_empty())
                    .or_else(|| spec.default_value().map(str::to_owned));
                let value = coerce(spec.kind(), raw.as_deref())?;
                Ok((spec.name().to_owned(), value))
            })
            .collect()
    }

    /// Runs the handler, propagating its failure unchanged.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler returns.
    pub async fn exec(&self, context: CommandContext) -> anyhow::Result<()> {
        self.handler.handle(context).await
    }

    /// Help metadata with the usage example built from `prefix` and the
    /// first pattern, or `None` when no help was declared.
    #[must_use]
    pub fn help(&self, prefix: &str) -> Option<HelpInfo> {
        let info = self.help.as_ref()?;
        Some(self.patterns.first().map_or_else(
            || info.clone(),
            |first| info.with_example(prefix, first.original()),
        ))
    }

    /// Declared help name, if any.
    #[must_use]
    pub fn help_name(&self) -> Option<&str> {
        self.help.as_ref().map(HelpInfo::name)
    }

    /// Flags derived from the help metadata.
    #[must_use]
    pub const fn flags(&self) -> &FlagConfig {
        &self.flags
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("patterns", &self.patterns)
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

fn raw_value(spec: &ArgumentSpec, pattern: &Pattern, tokens: &Tokens) -> Option<String> {
    if !spec.is_positional() {
        return tokens.named.get(spec.name()).cloned();
    }
    let (slot, index) = pattern.slot(spec.name())?;
    if slot.is_rest() {
        tokens
            .positionals
            .get(index..)
            .map(|rest| rest.join(" "))
    } else {
        tokens.positionals.get(index).cloned()
    }
}

/// Two-phase construction of a [`Command`].
pub struct CommandBuilder {
    patterns: PatternSet,
    handler: Arc<dyn CommandHandler>,
    help: Option<HelpOptions>,
}

impl CommandBuilder {
    /// Declares help metadata. Calling this again replaces the declaration.
    #[must_use]
    pub fn help(mut self, options: HelpOptions) -> Self {
        self.help = Some(options);
        self
    }

    /// Compiles the patterns and freezes the command.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when a template is invalid or no pattern
    /// was given.
    pub fn build(self) -> Result<Command, PatternError> {
        let patterns = self.patterns.normalize()?;
        let help = self
            .help
            .map(|options| HelpInfo::derive(&options, &patterns));
        let flags = help.as_ref().map(FlagConfig::from_help).unwrap_or_default();
        Ok(Command {
            patterns,
            handler: self.handler,
            help,
            flags,
        })
    }
}

impl fmt::Debug for CommandBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuilder")
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}
