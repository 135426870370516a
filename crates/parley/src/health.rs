//! Structured health reporting for bot lifecycle events.

use std::sync::Arc;

use parley_config::Config;

use crate::bootstrap::BootstrapError;
use crate::dispatch::{DispatchError, DispatchOutcome};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked after a message has been dispatched.
    fn message_dispatched(&self, outcome: DispatchOutcome);

    /// Invoked when a dispatch failure reached the bot loop.
    fn dispatch_failed(&self, error: &DispatchError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn message_dispatched(&self, outcome: DispatchOutcome) {
        (**self).message_dispatched(outcome);
    }

    fn dispatch_failed(&self, error: &DispatchError) {
        (**self).dispatch_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting bot bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            prefix = %config.prefix(),
            token_configured = config.token().is_some(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "bot bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "bot bootstrap failed"
        );
    }

    fn message_dispatched(&self, outcome: DispatchOutcome) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "message_dispatched",
            outcome = ?outcome,
            "message dispatched"
        );
    }

    fn dispatch_failed(&self, error: &DispatchError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "dispatch_failed",
            error = %error,
            "message dispatch failed"
        );
    }
}
