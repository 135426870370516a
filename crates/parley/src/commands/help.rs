//! The `help` command.
//!
//! `help` lists every documented command grouped by help group; `help <name>`
//! shows usage, description and options of one command.

use crate::coerce::ArgValue;
use crate::command::help::{ArgumentSpec, HelpCatalog, HelpInfo, HelpOptions};
use crate::command::{Command, CommandContext};
use crate::dispatch::Dispatcher;
use crate::pattern::PatternError;

/// Registers `help` and `help <command>`.
///
/// # Errors
///
/// Returns a [`PatternError`] if the built-in templates fail to compile.
pub fn register_help(dispatcher: &mut Dispatcher) -> Result<&mut Dispatcher, PatternError> {
    let command = Command::builder(["help", "help <command>"], reply_with_help)
        .help(
            HelpOptions::new("help", "Display a list of the available commands.").arg(
                "command",
                "The name of the command to display help information for.",
            ),
        )
        .build()?;
    Ok(dispatcher.register(command))
}

async fn reply_with_help(context: CommandContext) -> anyhow::Result<()> {
    let requested = context
        .arg("command")
        .and_then(ArgValue::as_str)
        .filter(|name| !name.is_empty());
    let reply = match requested {
        Some(name) => context
            .catalog()
            .find(name)
            .map_or_else(|| render_unknown(name), render_command),
        None => render_catalog(context.catalog()),
    };
    context.message().reply(&reply).await?;
    Ok(())
}

/// Renders every entry, grouped by help group in first-seen order.
#[must_use]
pub fn render_catalog(catalog: &HelpCatalog) -> String {
    let groups: Vec<String> = catalog
        .groups()
        .iter()
        .map(|group| {
            let lines: Vec<String> = group
                .commands
                .iter()
                .map(|info| {
                    format!(
                        "  `{}` - {}",
                        info.example().unwrap_or_else(|| info.name()),
                        info.description()
                    )
                })
                .collect();
            format!("**{}**\n\n{}", group.name, lines.join("\n"))
        })
        .collect();
    format!(
        "Here's a list of the available commands!\n\n{}",
        groups.join("\n\n")
    )
}

/// Renders usage, description and the options table of one command.
#[must_use]
pub fn render_command(info: &HelpInfo) -> String {
    let mut output = format!(
        "Here's some information about that command!\n\n**Usage:**  `{}`\n\n> {}",
        info.example().unwrap_or_else(|| info.name()),
        info.description()
    );

    let names: Vec<String> = info.args().iter().map(ArgumentSpec::display_name).collect();
    let width = names.iter().map(|name| name.chars().count()).max();
    if let Some(width) = width {
        output.push_str("\n\n**Options**\n\n```");
        for (name, spec) in names.iter().zip(info.args()) {
            output.push_str(&format!(
                "\n{name:>width$} - {}",
                spec.description().unwrap_or_default()
            ));
        }
        output.push_str("\n```");
    }
    output
}

/// Reply for a name no command declares.
#[must_use]
pub fn render_unknown(name: &str) -> String {
    format!("Unable to find a command with the given name. ({name})")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::coerce::ArgumentType;
    use crate::command::help::ArgumentOptions;
    use crate::tests::support::StubMessage;

    async fn noop(_context: CommandContext) -> anyhow::Result<()> {
        Ok(())
    }

    #[fixture]
    fn dispatcher() -> Dispatcher {
        let mut dispatcher = Dispatcher::new(".");
        register_help(&mut dispatcher).expect("help registers");
        dispatcher.register(
            Command::builder(["play <uri>"], noop)
                .help(
                    HelpOptions::new("play", "Play a track.")
                        .group("Music")
                        .arg("uri", "Track to play.")
                        .arg(
                            "volume",
                            ArgumentOptions::new()
                                .kind(ArgumentType::Number)
                                .description("Playback volume."),
                        ),
                )
                .build()
                .expect("valid command"),
        );
        dispatcher
    }

    #[rstest]
    fn catalog_lists_groups_in_first_seen_order(dispatcher: Dispatcher) {
        assert_eq!(
            render_catalog(dispatcher.catalog()),
            concat!(
                "Here's a list of the available commands!\n\n",
                "**General**\n\n",
                "  `.help` - Display a list of the available commands.\n\n",
                "**Music**\n\n",
                "  `.play <uri>` - Play a track."
            )
        );
    }

    #[rstest]
    fn command_details_pad_option_names(dispatcher: Dispatcher) {
        let info = dispatcher.help_for("play").expect("play help");
        assert_eq!(
            render_command(&info),
            concat!(
                "Here's some information about that command!\n\n",
                "**Usage:**  `.play <uri>`\n\n",
                "> Play a track.\n\n",
                "**Options**\n\n",
                "```\n",
                "     uri - Track to play.\n",
                "--volume - Playback volume.\n",
                "```"
            )
        );
    }

    #[rstest]
    #[tokio::test]
    async fn help_without_argument_replies_with_catalog(dispatcher: Dispatcher) {
        let message = StubMessage::new(".help");
        let log = message.log();

        dispatcher.dispatch(Arc::new(message)).await.expect("dispatch");

        assert_eq!(log.replies(), vec![render_catalog(dispatcher.catalog())]);
    }

    #[rstest]
    #[tokio::test]
    async fn help_for_named_command_replies_with_details(dispatcher: Dispatcher) {
        let message = StubMessage::new(".help play");
        let log = message.log();

        dispatcher.dispatch(Arc::new(message)).await.expect("dispatch");

        let info = dispatcher.help_for("play").expect("play help");
        assert_eq!(log.replies(), vec![render_command(&info)]);
    }

    #[rstest]
    #[tokio::test]
    async fn help_for_unknown_command_says_so(dispatcher: Dispatcher) {
        let message = StubMessage::new(".help dance");
        let log = message.log();

        dispatcher.dispatch(Arc::new(message)).await.expect("dispatch");

        assert_eq!(
            log.replies(),
            vec!["Unable to find a command with the given name. (dance)"]
        );
    }
}
