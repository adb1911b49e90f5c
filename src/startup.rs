use crate::configuration::{DeliveryStrategy, Settings};
use crate::dispatch::{
    ConfiguredDispatcher, Dispatcher, HiddenFramePost, InitError, RelayPost, TemplatedMessageApi,
    TimeoutDispatcher,
};
use crate::http::HttpClient;
use crate::workflow::ContactWorkflow;
use anyhow::Result;
use std::sync::Arc;

pub type Workflow = ContactWorkflow<TimeoutDispatcher<ConfiguredDispatcher>>;

/// Build the strategy selected by `settings`, wrapped in the uniform timeout.
///
/// This is the one place the templated API's public key is initialized. A
/// missing key only disables that integration.
pub fn build_dispatcher(
    settings: &Settings,
    client: HttpClient,
) -> TimeoutDispatcher<ConfiguredDispatcher> {
    let dispatcher = match settings.delivery.strategy {
        DeliveryStrategy::RelayPost => ConfiguredDispatcher::RelayPost(RelayPost::new(
            client,
            Arc::new(settings.relay.relay_config()),
        )),
        DeliveryStrategy::HiddenFrame => ConfiguredDispatcher::HiddenFrame(HiddenFramePost::new(
            client,
            Arc::new(settings.relay.relay_config()),
            settings.relay.cleanup_delay(),
        )),
        DeliveryStrategy::TemplatedApi => {
            let api = TemplatedMessageApi::new(client, Arc::new(settings.templated.api_config()));
            match api.init(settings.templated.public_key.clone()) {
                Ok(()) => {}
                Err(InitError::MissingPublicKey) => tracing::warn!(
                    "No templated API public key configured, messages will not be delivered."
                ),
                Err(error) => tracing::warn!(%error, "Templated API initialization skipped."),
            }
            ConfiguredDispatcher::TemplatedApi(api)
        }
    };
    if matches!(
        settings.delivery.strategy,
        DeliveryStrategy::RelayPost | DeliveryStrategy::HiddenFrame
    ) && !settings.relay.has_mailbox()
    {
        tracing::warn!("No relay mailbox configured, messages will not be delivered.");
    }
    tracing::info!(
        strategy = dispatcher.strategy(),
        timeout_ms = settings.delivery.timeout_ms,
        "Contact delivery configured."
    );
    TimeoutDispatcher::new(dispatcher, settings.delivery.timeout())
}

pub fn build_workflow(settings: &Settings) -> Result<Workflow> {
    let client = HttpClient::new()?;
    Ok(ContactWorkflow::new(
        build_dispatcher(settings, client),
        settings.workflow.options(),
    ))
}

#[cfg(test)]
mod tests {
    use super::build_workflow;
    use crate::configuration::{DeliveryStrategy, Settings};
    use crate::contact::Field;
    use crate::dispatch::{ConfiguredDispatcher, DispatchError, Dispatcher};
    use crate::workflow::SubmitOutcome;
    use claims::assert_matches;

    #[tokio::test]
    async fn templated_strategy_without_key_fails_softly() {
        let mut settings = Settings::default();
        settings.delivery.strategy = DeliveryStrategy::TemplatedApi;
        let mut workflow = build_workflow(&settings).unwrap();
        assert_matches!(
            workflow.dispatcher().inner(),
            ConfiguredDispatcher::TemplatedApi(api) if !api.is_ready()
        );

        workflow.set_field(Field::Name, "Jane Doe");
        workflow.set_field(Field::Email, "jane@example.com");
        workflow.set_field(Field::Subject, "Project Inquiry");
        workflow.set_field(Field::Message, "I would like a quote.");

        assert_eq!(
            workflow.submit().await,
            SubmitOutcome::Failed(DispatchError::NotConfigured)
        );
    }

    #[tokio::test]
    async fn relay_strategy_is_the_default() {
        let workflow = build_workflow(&Settings::default()).unwrap();
        assert_eq!(workflow.dispatcher().strategy(), "relay_post");
    }
}
