//! Contract expected from the chat client the router is embedded in.
//!
//! The router never talks to a network itself. It receives inbound messages
//! as [`ChatMessage`] trait objects and attaches reactions through them; the
//! handle returned for a reaction lets the reactor remove its own markers
//! once a command settles. Handlers that post outside the triggering message
//! go through [`TextChannels`], and [`Presence`] controls the status the bot
//! shows to other users.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Kinds of channel a client can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// A channel carrying text messages.
    Text,
    /// A channel carrying audio.
    Voice,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Voice => f.write_str("voice"),
        }
    }
}

/// Errors reported by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client rejected or failed a request.
    #[error("client request failed: {message}")]
    Request {
        /// Description supplied by the client.
        message: String,
    },

    /// The requested channel exists but is of the wrong kind.
    #[error("expected '{channel}' to be a {expected} channel")]
    ChannelTypeMismatch {
        /// Name of the channel that was resolved.
        channel: String,
        /// Kind the caller asked for.
        expected: ChannelKind,
    },

    /// No channel carries the requested id.
    #[error("unknown channel '{id}'")]
    UnknownChannel {
        /// Identifier that was looked up.
        id: String,
    },

    /// The connection to the chat service is gone.
    #[error("client connection closed")]
    Closed,

    /// Reading from or writing to the underlying stream failed.
    #[error("client I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Creates a request failure.
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Creates a channel kind mismatch.
    #[must_use]
    pub fn channel_type_mismatch(channel: impl Into<String>, expected: ChannelKind) -> Self {
        Self::ChannelTypeMismatch {
            channel: channel.into(),
            expected,
        }
    }
}

/// A channel resolved by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Client-specific channel identifier.
    pub id: String,
    /// Human-readable channel name.
    pub name: String,
    /// What the channel carries.
    pub kind: ChannelKind,
}

impl ChannelInfo {
    /// Describes a channel.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

/// A user that has applied a given reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionUser {
    /// Client-specific user identifier.
    pub id: String,
    /// Whether the user is a bot account.
    pub bot: bool,
}

impl ReactionUser {
    /// Describes a human user.
    #[must_use]
    pub fn human(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bot: false,
        }
    }

    /// Describes a bot user.
    #[must_use]
    pub fn bot(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bot: true,
        }
    }
}

/// Handle to one reaction marker on one message.
#[async_trait]
pub trait MessageReaction: Send + Sync {
    /// Lists the users that currently apply this marker.
    async fn users(&self) -> Result<Vec<ReactionUser>, ClientError>;

    /// Removes the marker applied by the given user.
    async fn remove_user(&self, user_id: &str) -> Result<(), ClientError>;
}

/// An inbound chat message.
#[async_trait]
pub trait ChatMessage: Send + Sync {
    /// Raw text of the message.
    fn content(&self) -> &str;

    /// Attaches a reaction marker as the bot user.
    async fn react(&self, marker: &str) -> Result<Box<dyn MessageReaction>, ClientError>;

    /// Replies to the message.
    async fn reply(&self, text: &str) -> Result<(), ClientError>;
}

/// Access to channels by identifier.
#[async_trait]
pub trait TextChannels: Send + Sync {
    /// Resolves the channel with the given id, whatever its kind.
    async fn resolve(&self, channel_id: &str) -> Result<ChannelInfo, ClientError>;

    /// Posts `text` to a channel already known to carry text.
    async fn post(&self, channel: &ChannelInfo, text: &str) -> Result<(), ClientError>;

    /// Resolves the channel with the given id as a text channel.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ChannelTypeMismatch`] when the channel carries
    /// something other than text, and resolution failures unchanged.
    async fn channel(&self, channel_id: &str) -> Result<ChannelInfo, ClientError> {
        let channel = self.resolve(channel_id).await?;
        if channel.kind == ChannelKind::Text {
            Ok(channel)
        } else {
            Err(ClientError::channel_type_mismatch(
                channel.name,
                ChannelKind::Text,
            ))
        }
    }

    /// Sends `text` to the text channel with the given id.
    ///
    /// # Errors
    ///
    /// See [`TextChannels::channel`]; posting failures are returned unchanged.
    async fn send(&self, channel_id: &str, text: &str) -> Result<(), ClientError> {
        let channel = self.channel(channel_id).await?;
        self.post(&channel, text).await
    }
}

/// The bot's own presence.
#[async_trait]
pub trait Presence: Send + Sync {
    /// Shows `message` as the bot's current activity.
    async fn set_status(&self, message: &str) -> Result<(), ClientError>;

    /// Hides the bot from other users.
    async fn go_offline(&self) -> Result<(), ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_mismatch_names_expected_kind() {
        let error = ClientError::channel_type_mismatch("general", ChannelKind::Voice);
        assert_eq!(
            error.to_string(),
            "expected 'general' to be a voice channel"
        );
    }

    struct FixedChannels {
        posted: std::sync::Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl TextChannels for FixedChannels {
        async fn resolve(&self, channel_id: &str) -> Result<ChannelInfo, ClientError> {
            match channel_id {
                "1" => Ok(ChannelInfo::new("1", "general", ChannelKind::Text)),
                "2" => Ok(ChannelInfo::new("2", "lounge", ChannelKind::Voice)),
                other => Err(ClientError::UnknownChannel {
                    id: other.to_owned(),
                }),
            }
        }

        async fn post(&self, channel: &ChannelInfo, text: &str) -> Result<(), ClientError> {
            self.posted
                .lock()
                .expect("posted mutex poisoned")
                .push((channel.name.clone(), text.to_owned()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn send_posts_to_text_channels_only() {
        let channels = FixedChannels {
            posted: std::sync::Mutex::default(),
        };

        channels.send("1", "hello").await.expect("text channel");
        let mismatch = channels.send("2", "hello").await.expect_err("voice channel");
        let unknown = channels.send("3", "hello").await.expect_err("missing channel");

        assert!(matches!(
            mismatch,
            ClientError::ChannelTypeMismatch { ref channel, expected: ChannelKind::Text }
                if channel == "lounge"
        ));
        assert!(matches!(unknown, ClientError::UnknownChannel { ref id } if id == "3"));
        assert_eq!(
            *channels.posted.lock().expect("posted mutex poisoned"),
            vec![(String::from("general"), String::from("hello"))]
        );
    }

    #[test]
    fn reaction_users_record_bot_flag() {
        assert!(ReactionUser::bot("1").bot);
        assert!(!ReactionUser::human("2").bot);
    }
}
