use crate::contact::ContactSubmission;
use crate::dispatch::{Delivery, DispatchError, Dispatcher};
use std::time::Duration;

pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Races any strategy against a fixed delay. Whichever settles first wins;
/// losing to the delay yields [`DispatchError::Timeout`].
#[derive(Debug)]
pub struct TimeoutDispatcher<D> {
    inner: D,
    timeout: Duration,
}

impl<D> TimeoutDispatcher<D> {
    pub fn new(inner: D, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: Dispatcher> Dispatcher for TimeoutDispatcher<D> {
    fn strategy(&self) -> &'static str {
        self.inner.strategy()
    }

    async fn dispatch(&self, submission: &ContactSubmission) -> Result<Delivery, DispatchError> {
        match tokio::time::timeout(self.timeout, self.inner.dispatch(submission)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                tracing::warn!(
                    strategy = self.inner.strategy(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Delivery did not settle before the timeout."
                );
                Err(DispatchError::Timeout(self.timeout))
            }
        }
    }
    async fn shutdown(&self) {
        self.inner.shutdown().await
    }
}
