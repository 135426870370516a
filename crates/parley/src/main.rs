//! Console entrypoint for the Parley command router.
//!
//! Each line read from stdin is dispatched as a chat message; replies and
//! reaction changes are written to stdout while logs go to stderr.

use std::sync::Arc;

use tokio::io::{self, BufReader};

use parley::commands::{register_echo, register_help};
use parley::console::ConsoleSink;
use parley::{StructuredHealthReporter, SystemConfigLoader, bootstrap_with};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let bot = bootstrap_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        |dispatcher| {
            register_help(dispatcher)?;
            register_echo(dispatcher)?;
            Ok(())
        },
    )?;

    let sink = ConsoleSink::new(io::stdout());
    bot.run(BufReader::new(io::stdin()), &sink).await?;
    Ok(())
}
