use crate::contact::ContactSubmission;
use crate::dispatch::relay::{RelayConfig, RelayPayload};
use crate::dispatch::{Delivery, DispatchError, Dispatcher};
use crate::http::HttpClient;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::Instrument;

pub const DEFAULT_CLEANUP_DELAY: Duration = Duration::from_millis(1000);

/// Fire-and-forget POST to the relay's plain form target.
///
/// The request is started in the background and success is reported right
/// away without waiting for, or reading, the relay's answer. Whatever is
/// still in flight once `cleanup_delay` has passed is abandoned. Background
/// requests are tracked so [`Dispatcher::shutdown`] can let them finish
/// before the runtime goes away.
#[derive(Debug, Clone)]
pub struct HiddenFramePost {
    client: HttpClient,
    config: Arc<RelayConfig>,
    cleanup_delay: Duration,
    in_flight: Arc<Mutex<JoinSet<()>>>,
}

impl HiddenFramePost {
    pub fn new(client: HttpClient, config: Arc<RelayConfig>, cleanup_delay: Duration) -> Self {
        Self {
            client,
            config,
            cleanup_delay,
            in_flight: Arc::default(),
        }
    }
}

impl Dispatcher for HiddenFramePost {
    fn strategy(&self) -> &'static str {
        "hidden_frame"
    }

    async fn dispatch(&self, submission: &ContactSubmission) -> Result<Delivery, DispatchError> {
        let url = self.config.form_endpoint()?;
        let span = tracing::info_span!("hidden_frame", attempt = %submission.id, host = url.host_str());
        let request = self
            .client
            .post(url)
            .form(&RelayPayload::new(submission, &self.config));
        let cleanup_delay = self.cleanup_delay;
        let frame = async move {
            match tokio::time::timeout(cleanup_delay, request.send()).await {
                Ok(Ok(response)) => {
                    tracing::debug!(status = %response.status(), "Relay received the frame submission.")
                }
                Ok(Err(error)) => {
                    tracing::warn!(%error, "Frame submission failed after success was reported.")
                }
                Err(_elapsed) => {
                    tracing::debug!("Frame submission abandoned at cleanup.")
                }
            }
        }
        .instrument(span);
        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            // Reap finished submissions.
            while in_flight.try_join_next().is_some() {}
            in_flight.spawn(frame);
        }
        Ok(Delivery::Optimistic)
    }

    /// Every background request gives up after `cleanup_delay`, so this
    /// returns within that window.
    async fn shutdown(&self) {
        let mut pending = std::mem::take(
            &mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner),
        );
        if !pending.is_empty() {
            tracing::debug!(pending = pending.len(), "Waiting for frame submissions.");
        }
        while pending.join_next().await.is_some() {}
    }
}
