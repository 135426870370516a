//! A chat client backed by plain text streams.
//!
//! Every input line becomes a [`ConsoleMessage`]. Replies are written as
//! `<bot> text` and reaction changes as `+marker` and `-marker`, so a terminal
//! session shows the same progress a chat user would see. Posts to other
//! channels are written as `#name text` and presence changes as `* status`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::client::{
    ChannelInfo, ChannelKind, ChatMessage, ClientError, MessageReaction, Presence, ReactionUser,
    TextChannels,
};

/// User id the console reports for its own reactions.
pub const CONSOLE_BOT_ID: &str = "console";

/// Id of the text channel every console sink starts with.
pub const CONSOLE_CHANNEL_ID: &str = "console";

#[derive(Debug)]
struct Output<W> {
    writer: W,
    closed: bool,
}

/// Shared output stream for console messages.
#[derive(Debug)]
pub struct ConsoleSink<W> {
    output: Arc<Mutex<Output<W>>>,
    channels: Arc<BTreeMap<String, ChannelInfo>>,
}

impl<W> Clone for ConsoleSink<W> {
    fn clone(&self) -> Self {
        Self {
            output: Arc::clone(&self.output),
            channels: Arc::clone(&self.channels),
        }
    }
}

impl<W: AsyncWrite + Unpin + Send> ConsoleSink<W> {
    /// Wraps `writer`, with one text channel named after
    /// [`CONSOLE_CHANNEL_ID`].
    #[must_use]
    pub fn new(writer: W) -> Self {
        let console = ChannelInfo::new(CONSOLE_CHANNEL_ID, CONSOLE_CHANNEL_ID, ChannelKind::Text);
        Self {
            output: Arc::new(Mutex::new(Output {
                writer,
                closed: false,
            })),
            channels: Arc::new(BTreeMap::from([(console.id.clone(), console)])),
        }
    }

    /// Adds a channel that [`TextChannels`] can resolve.
    #[must_use]
    pub fn with_channel(mut self, channel: ChannelInfo) -> Self {
        Arc::make_mut(&mut self.channels).insert(channel.id.clone(), channel);
        self
    }

    /// Runs `inspect` against the underlying writer.
    pub async fn with_writer<T>(&self, inspect: impl FnOnce(&W) -> T) -> T {
        inspect(&self.output.lock().await.writer)
    }

    /// Flushes and shuts down the writer. Later writes fail with
    /// [`ClientError::Closed`]; closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] when the shutdown fails.
    pub async fn close(&self) -> Result<(), ClientError> {
        let mut output = self.output.lock().await;
        if output.closed {
            return Ok(());
        }
        output.closed = true;
        output.writer.shutdown().await?;
        Ok(())
    }

    /// Creates a message carrying `content` that reports to this sink.
    #[must_use]
    pub fn message(&self, content: impl Into<String>) -> ConsoleMessage<W> {
        ConsoleMessage {
            content: content.into(),
            sink: self.clone(),
        }
    }

    async fn write_line(&self, line: &str) -> Result<(), ClientError> {
        let mut output = self.output.lock().await;
        if output.closed {
            return Err(ClientError::Closed);
        }
        output.writer.write_all(line.as_bytes()).await?;
        output.writer.write_all(b"\n").await?;
        output.writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W> TextChannels for ConsoleSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn resolve(&self, channel_id: &str) -> Result<ChannelInfo, ClientError> {
        self.channels
            .get(channel_id)
            .cloned()
            .ok_or_else(|| ClientError::UnknownChannel {
                id: channel_id.to_owned(),
            })
    }

    async fn post(&self, channel: &ChannelInfo, text: &str) -> Result<(), ClientError> {
        self.write_line(&format!("#{} {text}", channel.name)).await
    }
}

#[async_trait]
impl<W> Presence for ConsoleSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn set_status(&self, message: &str) -> Result<(), ClientError> {
        self.write_line(&format!("* playing {message}")).await
    }

    async fn go_offline(&self) -> Result<(), ClientError> {
        self.write_line("* offline").await
    }
}

/// One line of console input.
#[derive(Debug)]
pub struct ConsoleMessage<W> {
    content: String,
    sink: ConsoleSink<W>,
}

#[async_trait]
impl<W> ChatMessage for ConsoleMessage<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn content(&self) -> &str {
        &self.content
    }

    async fn react(&self, marker: &str) -> Result<Box<dyn MessageReaction>, ClientError> {
        self.sink.write_line(&format!("+{marker}")).await?;
        Ok(Box::new(ConsoleReaction {
            marker: marker.to_owned(),
            sink: self.sink.clone(),
            removed: AtomicBool::new(false),
        }))
    }

    async fn reply(&self, text: &str) -> Result<(), ClientError> {
        self.sink.write_line(&format!("<bot> {text}")).await
    }
}

struct ConsoleReaction<W> {
    marker: String,
    sink: ConsoleSink<W>,
    removed: AtomicBool,
}

#[async_trait]
impl<W> MessageReaction for ConsoleReaction<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn users(&self) -> Result<Vec<ReactionUser>, ClientError> {
        if self.removed.load(Ordering::Acquire) {
            Ok(Vec::new())
        } else {
            Ok(vec![ReactionUser::bot(CONSOLE_BOT_ID)])
        }
    }

    async fn remove_user(&self, user_id: &str) -> Result<(), ClientError> {
        if user_id != CONSOLE_BOT_ID || self.removed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.sink.write_line(&format!("-{}", self.marker)).await
    }
}
