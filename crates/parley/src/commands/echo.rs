//! The `echo` command, a minimal demonstration handler.

use crate::coerce::{ArgValue, ArgumentType};
use crate::command::help::{ArgumentOptions, HelpOptions};
use crate::command::{Command, CommandContext};
use crate::dispatch::Dispatcher;
use crate::pattern::PatternError;

/// Registers `echo <...text>`, which replies with the text it was given.
///
/// # Errors
///
/// Returns a [`PatternError`] if the template fails to compile.
pub fn register_echo(dispatcher: &mut Dispatcher) -> Result<&mut Dispatcher, PatternError> {
    let command = Command::builder("echo <...text>", echo)
        .help(
            HelpOptions::new("echo", "Repeat a message back to you.")
                .group("Utility")
                .arg("text", "The text to repeat.")
                .arg(
                    "loud",
                    ArgumentOptions::new()
                        .kind(ArgumentType::Boolean)
                        .description("Shout the text."),
                ),
        )
        .build()?;
    Ok(dispatcher.register(command))
}

async fn echo(context: CommandContext) -> anyhow::Result<()> {
    let text = context
        .arg("text")
        .and_then(ArgValue::as_str)
        .unwrap_or_default();
    let loud = context
        .arg("loud")
        .and_then(ArgValue::as_bool)
        .unwrap_or(false);
    let reply = if loud {
        text.to_uppercase()
    } else {
        text.to_owned()
    };
    context.message().reply(&reply).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;
    use crate::tests::support::StubMessage;

    #[rstest]
    #[case(".echo hello world", "hello world")]
    #[case(".echo --loud hello world", "HELLO WORLD")]
    #[case(".echo hello --no-loud", "hello")]
    #[tokio::test]
    async fn echo_replies_with_text(#[case] input: &str, #[case] expected: &str) {
        let mut dispatcher = Dispatcher::new(".");
        register_echo(&mut dispatcher).expect("echo registers");
        let message = StubMessage::new(input);
        let log = message.log();

        dispatcher.dispatch(Arc::new(message)).await.expect("dispatch");

        assert_eq!(log.replies(), vec![expected]);
    }
}
