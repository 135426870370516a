//! Transient reactions that show a command's progress on its message.
//!
//! [`Reactor::loading`] marks the message as awaiting, runs the operation,
//! marks the outcome and then removes the bot's own awaiting marker. Reaction
//! calls are best effort: a failing client call is logged and never changes
//! the operation's result.

use std::fmt;
use std::future::Future;

use futures::future::join_all;
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::{ChatMessage, MessageReaction};

/// Tracing target for reaction handling.
pub(crate) const REACTOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::reactor");

/// Marker shown when a command succeeds.
pub const DEFAULT_SUCCESS_MARKER: &str = "👍";
/// Marker shown when a command fails.
pub const DEFAULT_FAILURE_MARKER: &str = "⛔";
/// Marker shown while a command runs.
pub const DEFAULT_AWAITING_MARKER: &str = "a:loading:718307876724015105";

/// What a marker communicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRole {
    /// The command completed.
    Success,
    /// The command failed.
    Failure,
    /// The command is still running.
    Awaiting,
}

impl fmt::Display for MarkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Awaiting => "awaiting",
        })
    }
}

/// Errors raised when configuring a [`Reactor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactorError {
    /// A marker set was replaced with nothing.
    #[error("the {role} marker set cannot be empty")]
    EmptyMarkerSet {
        /// Role whose set was rejected.
        role: MarkerRole,
    },
}

/// Marker sets per role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionMarkers {
    success: Vec<String>,
    failure: Vec<String>,
    awaiting: Vec<String>,
}

impl Default for ReactionMarkers {
    fn default() -> Self {
        Self {
            success: vec![DEFAULT_SUCCESS_MARKER.to_owned()],
            failure: vec![DEFAULT_FAILURE_MARKER.to_owned()],
            awaiting: vec![DEFAULT_AWAITING_MARKER.to_owned()],
        }
    }
}

impl ReactionMarkers {
    /// Markers configured for `role`.
    #[must_use]
    pub fn get(&self, role: MarkerRole) -> &[String] {
        match role {
            MarkerRole::Success => &self.success,
            MarkerRole::Failure => &self.failure,
            MarkerRole::Awaiting => &self.awaiting,
        }
    }

    fn replace<I, S>(&mut self, role: MarkerRole, markers: I) -> Result<(), ReactorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers: Vec<String> = markers.into_iter().map(Into::into).collect();
        if markers.is_empty() {
            return Err(ReactorError::EmptyMarkerSet { role });
        }
        let slot = match role {
            MarkerRole::Success => &mut self.success,
            MarkerRole::Failure => &mut self.failure,
            MarkerRole::Awaiting => &mut self.awaiting,
        };
        *slot = markers;
        Ok(())
    }
}

/// Applies progress markers to messages.
#[derive(Debug, Clone, Default)]
pub struct Reactor {
    markers: ReactionMarkers,
}

impl Reactor {
    /// Creates a reactor with the default markers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current marker sets.
    #[must_use]
    pub const fn markers(&self) -> &ReactionMarkers {
        &self.markers
    }

    /// Replaces the success markers.
    ///
    /// # Errors
    ///
    /// Returns [`ReactorError::EmptyMarkerSet`] when `markers` is empty; the
    /// previous set is kept.
    pub fn set_success<I, S>(&mut self, markers: I) -> Result<(), ReactorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers.replace(MarkerRole::Success, markers)
    }

    /// Replaces the failure markers.
    ///
    /// # Errors
    ///
    /// Returns [`ReactorError::EmptyMarkerSet`] when `markers` is empty.
    pub fn set_failure<I, S>(&mut self, markers: I) -> Result<(), ReactorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers.replace(MarkerRole::Failure, markers)
    }

    /// Replaces the awaiting markers.
    ///
    /// # Errors
    ///
    /// Returns [`ReactorError::EmptyMarkerSet`] when `markers` is empty.
    pub fn set_awaiting<I, S>(&mut self, markers: I) -> Result<(), ReactorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers.replace(MarkerRole::Awaiting, markers)
    }

    /// Marks the message as successful.
    pub async fn success(&self, message: &dyn ChatMessage) -> Option<Box<dyn MessageReaction>> {
        self.react(message, MarkerRole::Success).await
    }

    /// Marks the message as failed.
    pub async fn failure(&self, message: &dyn ChatMessage) -> Option<Box<dyn MessageReaction>> {
        self.react(message, MarkerRole::Failure).await
    }

    /// Marks the message as in progress.
    pub async fn awaiting(&self, message: &dyn ChatMessage) -> Option<Box<dyn MessageReaction>> {
        self.react(message, MarkerRole::Awaiting).await
    }

    /// Runs `operation` while the message shows an awaiting marker.
    ///
    /// The outcome is marked with a success or failure marker, and every
    /// bot-authored instance of the awaiting marker is removed before the
    /// operation's own result is returned.
    ///
    /// # Errors
    ///
    /// Returns the operation's error unchanged.
    pub async fn loading<F, T, E>(&self, message: &dyn ChatMessage, operation: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let awaiting = self.awaiting(message).await;

        let result = operation.await;
        match &result {
            Ok(_) => {
                self.success(message).await;
            }
            Err(_) => {
                self.failure(message).await;
            }
        }

        if let Some(reaction) = awaiting {
            clear_bot_reactions(reaction.as_ref()).await;
        }
        result
    }

    fn pick(&self, role: MarkerRole) -> Option<&str> {
        self.markers
            .get(role)
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }

    async fn react(
        &self,
        message: &dyn ChatMessage,
        role: MarkerRole,
    ) -> Option<Box<dyn MessageReaction>> {
        let marker = self.pick(role)?;
        match message.react(marker).await {
            Ok(reaction) => {
                debug!(target: REACTOR_TARGET, %role, marker, "reaction added");
                Some(reaction)
            }
            Err(error) => {
                warn!(target: REACTOR_TARGET, %role, marker, %error, "failed to add reaction");
                None
            }
        }
    }
}

async fn clear_bot_reactions(reaction: &dyn MessageReaction) {
    let users = match reaction.users().await {
        Ok(users) => users,
        Err(error) => {
            warn!(target: REACTOR_TARGET, %error, "failed to list reaction users");
            return;
        }
    };

    let removals = users
        .iter()
        .filter(|user| user.bot)
        .map(|user| reaction.remove_user(&user.id));
    for result in join_all(removals).await {
        if let Err(error) = result {
            warn!(target: REACTOR_TARGET, %error, "failed to remove reaction");
        }
    }
}
