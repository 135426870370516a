//! Test doubles for chat messages, reactions and bot lifecycle hooks.

use std::ffi::OsString;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ortho_config::{OrthoConfig, OrthoError};
use parley_config::Config;

use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::client::{ChatMessage, ClientError, MessageReaction, ReactionUser};
use crate::dispatch::{DispatchError, DispatchOutcome};
use crate::health::HealthReporter;

/// Identifier the stub client reports for its own bot account.
pub const BOT_ID: &str = "parley-bot";

/// Something the router did to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEvent {
    /// A marker was attached.
    Reacted(String),
    /// A user's marker was removed.
    Unreacted {
        /// Marker that was removed.
        marker: String,
        /// User whose marker was removed.
        user: String,
    },
    /// A reply was sent.
    Replied(String),
}

/// Shared record of message events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<MessageEvent>>>,
}

impl EventLog {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<MessageEvent> {
        self.events.lock().expect("event log mutex poisoned").clone()
    }

    /// Markers attached, in order.
    pub fn reactions(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                MessageEvent::Reacted(marker) => Some(marker),
                _ => None,
            })
            .collect()
    }

    /// Markers removed, in order.
    pub fn removals(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                MessageEvent::Unreacted { marker, .. } => Some(marker),
                _ => None,
            })
            .collect()
    }

    /// Replies sent, in order.
    pub fn replies(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                MessageEvent::Replied(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: MessageEvent) {
        self.events
            .lock()
            .expect("event log mutex poisoned")
            .push(event);
    }
}

/// In-memory message whose reactions are authored by [`BOT_ID`] and by one
/// human user.
pub struct StubMessage {
    content: String,
    log: EventLog,
    reactions_fail: bool,
}

impl StubMessage {
    /// Creates a message with the given text.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            log: EventLog::default(),
            reactions_fail: false,
        }
    }

    /// Makes every `react` call fail.
    #[must_use]
    pub fn with_failing_reactions(mut self) -> Self {
        self.reactions_fail = true;
        self
    }

    /// Handle to the event log.
    pub fn log(&self) -> EventLog {
        self.log.clone()
    }
}

#[async_trait]
impl ChatMessage for StubMessage {
    fn content(&self) -> &str {
        &self.content
    }

    async fn react(&self, marker: &str) -> Result<Box<dyn MessageReaction>, ClientError> {
        if self.reactions_fail {
            return Err(ClientError::request("reactions are disabled"));
        }
        self.log.record(MessageEvent::Reacted(marker.to_owned()));
        Ok(Box::new(StubReaction {
            marker: marker.to_owned(),
            log: self.log.clone(),
        }))
    }

    async fn reply(&self, text: &str) -> Result<(), ClientError> {
        self.log.record(MessageEvent::Replied(text.to_owned()));
        Ok(())
    }
}

struct StubReaction {
    marker: String,
    log: EventLog,
}

#[async_trait]
impl MessageReaction for StubReaction {
    async fn users(&self) -> Result<Vec<ReactionUser>, ClientError> {
        Ok(vec![ReactionUser::bot(BOT_ID), ReactionUser::human("someone")])
    }

    async fn remove_user(&self, user_id: &str) -> Result<(), ClientError> {
        self.log.record(MessageEvent::Unreacted {
            marker: self.marker.clone(),
            user: user_id.to_owned(),
        });
        Ok(())
    }
}

/// Structured health events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// A message was dispatched.
    MessageDispatched(DispatchOutcome),
    /// A dispatch failure reached the bot loop.
    DispatchFailed(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn message_dispatched(&self, outcome: DispatchOutcome) {
        self.record(HealthEvent::MessageDispatched(outcome));
    }

    fn dispatch_failed(&self, error: &DispatchError) {
        self.record(HealthEvent::DispatchFailed(error.to_string()));
    }
}

/// Loader that fails by passing an unknown log format on the command line.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("parley"),
            OsString::from("--log-format"),
            OsString::from("verbose"),
        ];
        Config::load_from_iter(args)
    }
}
