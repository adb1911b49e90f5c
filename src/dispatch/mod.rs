//! Delivery of validated contact submissions to an external channel.
//!
//! Every strategy implements [`Dispatcher`] and resolves to either a
//! [`Delivery`] or a [`DispatchError`]. Strategies are wrapped in a
//! [`TimeoutDispatcher`] so no strategy can keep a submission in flight forever.

mod hidden_frame;
mod relay;
mod templated;
mod timeout;

pub use hidden_frame::{HiddenFramePost, DEFAULT_CLEANUP_DELAY};
pub use relay::{RelayConfig, RelayPost, RELAY_ENDPOINT};
pub use templated::{InitError, TemplatedApiConfig, TemplatedMessageApi, TEMPLATED_API_ENDPOINT};
pub use timeout::{TimeoutDispatcher, DEFAULT_DISPATCH_TIMEOUT};

use crate::contact::ContactSubmission;
use std::future::Future;
use std::time::Duration;

/// How a submission was handed over to the delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// The provider acknowledged the message.
    Confirmed,
    /// The request was sent but the provider's answer is never read.
    Optimistic,
}

/// Machine-readable failure reason, stable across strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    Transport,
    ProviderRejection,
    ActivationRequired,
    Timeout,
    NotConfigured,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Transport => "transport",
            ReasonCode::ProviderRejection => "provider_rejection",
            ReasonCode::ActivationRequired => "activation_required",
            ReasonCode::Timeout => "timeout",
            ReasonCode::NotConfigured => "not_configured",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to reach the delivery service: {0}")]
    Transport(String),
    #[error("The delivery service rejected the message: {message}")]
    ProviderRejection {
        message: String,
        activation_required: bool,
    },
    #[error("The delivery service did not answer within {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("Message delivery is not configured")]
    NotConfigured,
}

impl DispatchError {
    /// Build a rejection from the provider's own message, recognizing the
    /// relay's "form not activated yet" answer.
    pub fn rejection(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowercase_message = message.to_lowercase();
        let activation_required =
            lowercase_message.contains("activation") || lowercase_message.contains("actived");
        DispatchError::ProviderRejection {
            message,
            activation_required,
        }
    }

    pub fn reason(&self) -> ReasonCode {
        match self {
            DispatchError::Transport(_) => ReasonCode::Transport,
            DispatchError::ProviderRejection {
                activation_required: true,
                ..
            } => ReasonCode::ActivationRequired,
            DispatchError::ProviderRejection { .. } => ReasonCode::ProviderRejection,
            DispatchError::Timeout(_) => ReasonCode::Timeout,
            DispatchError::NotConfigured => ReasonCode::NotConfigured,
        }
    }

    /// Text shown to the person who filled the form.
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::Transport(_) => {
                "Failed to send message. Please try again or contact us directly.".to_owned()
            }
            DispatchError::ProviderRejection {
                activation_required: true,
                ..
            } => "Form activation required. Please check the destination inbox for the \
                  activation link from the form relay and click it to activate the form."
                .to_owned(),
            DispatchError::ProviderRejection { message, .. } if message.trim().is_empty() => {
                "The delivery service declined the message. Please try again or contact us \
                 directly."
                    .to_owned()
            }
            DispatchError::ProviderRejection { message, .. } => format!(
                "Failed to send message: {}. Please try again or contact us directly.",
                message.trim_end_matches('.')
            ),
            DispatchError::Timeout(_) => {
                "Request timed out. Please check your connection and try again.".to_owned()
            }
            DispatchError::NotConfigured => {
                "Message delivery is currently unavailable. Please contact us directly.".to_owned()
            }
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(error: reqwest::Error) -> Self {
        DispatchError::Transport(error.to_string())
    }
}

pub trait Dispatcher: Send + Sync {
    /// Short name used in logs.
    fn strategy(&self) -> &'static str;

    /// Hand one submission to the delivery channel. Exactly one network
    /// interaction is started per call and nothing is retried.
    fn dispatch(
        &self,
        submission: &ContactSubmission,
    ) -> impl Future<Output = Result<Delivery, DispatchError>> + Send;

    /// Wait for background work started by earlier dispatches. Strategies
    /// that finish everything inside `dispatch` have nothing to wait for.
    fn shutdown(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// The strategy chosen by configuration.
#[derive(Debug)]
pub enum ConfiguredDispatcher {
    RelayPost(RelayPost),
    HiddenFrame(HiddenFramePost),
    TemplatedApi(TemplatedMessageApi),
}

impl Dispatcher for ConfiguredDispatcher {
    fn strategy(&self) -> &'static str {
        match self {
            ConfiguredDispatcher::RelayPost(dispatcher) => dispatcher.strategy(),
            ConfiguredDispatcher::HiddenFrame(dispatcher) => dispatcher.strategy(),
            ConfiguredDispatcher::TemplatedApi(dispatcher) => dispatcher.strategy(),
        }
    }

    async fn dispatch(&self, submission: &ContactSubmission) -> Result<Delivery, DispatchError> {
        match self {
            ConfiguredDispatcher::RelayPost(dispatcher) => dispatcher.dispatch(submission).await,
            ConfiguredDispatcher::HiddenFrame(dispatcher) => dispatcher.dispatch(submission).await,
            ConfiguredDispatcher::TemplatedApi(dispatcher) => {
                dispatcher.dispatch(submission).await
            }
        }
    }

    async fn shutdown(&self) {
        if let ConfiguredDispatcher::HiddenFrame(dispatcher) = self {
            dispatcher.shutdown().await;
        }
    }
}
