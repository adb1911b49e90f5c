use crate::censoredstring::CensoredString;
use crate::contact::ContactSubmission;
use crate::dispatch::{Delivery, DispatchError, Dispatcher};
use crate::http::HttpClient;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use time::format_description::well_known::Rfc3339;
use tracing::Instrument;
use url::Url;

pub const TEMPLATED_API_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Debug, Clone)]
pub struct TemplatedApiConfig {
    pub endpoint: Url,
    pub service_id: String,
    pub template_id: String,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    #[error("No public key configured, templated delivery is disabled")]
    MissingPublicKey,
    #[error("Templated delivery was already initialized")]
    AlreadyInitialized,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Serialize)]
struct TemplateParams<'a> {
    from_name: &'a str,
    from_email: &'a str,
    reply_to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    sent_at: String,
}

/// Sends through a transactional-message API by filling a registered template.
///
/// The API refuses calls that don't carry the site's public key, so
/// [`TemplatedMessageApi::init`] must run once before the first dispatch.
#[derive(Debug)]
pub struct TemplatedMessageApi {
    client: HttpClient,
    config: Arc<TemplatedApiConfig>,
    public_key: OnceLock<CensoredString>,
}

impl TemplatedMessageApi {
    pub fn new(client: HttpClient, config: Arc<TemplatedApiConfig>) -> Self {
        Self {
            client,
            config,
            public_key: OnceLock::new(),
        }
    }

    /// Store the public key. Only the first successful call has an effect.
    pub fn init(&self, public_key: Option<CensoredString>) -> Result<(), InitError> {
        let public_key = public_key
            .filter(|key| !key.is_blank())
            .ok_or(InitError::MissingPublicKey)?;
        self.public_key
            .set(public_key)
            .map_err(|_| InitError::AlreadyInitialized)?;
        tracing::info!(
            service_id = %self.config.service_id,
            template_id = %self.config.template_id,
            "Templated delivery initialized."
        );
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.public_key.get().is_some()
    }
}

impl Dispatcher for TemplatedMessageApi {
    fn strategy(&self) -> &'static str {
        "templated_api"
    }

    async fn dispatch(&self, submission: &ContactSubmission) -> Result<Delivery, DispatchError> {
        let Some(public_key) = self.public_key.get() else {
            tracing::warn!("Templated delivery used before initialization.");
            return Err(DispatchError::NotConfigured);
        };
        let span = tracing::info_span!(
            "templated_api",
            attempt = %submission.id,
            template_id = %self.config.template_id
        );
        async move {
            let request = SendRequest {
                service_id: &self.config.service_id,
                template_id: &self.config.template_id,
                user_id: public_key.expose(),
                template_params: TemplateParams {
                    from_name: submission.name.as_ref(),
                    from_email: submission.email.as_ref(),
                    reply_to: submission.email.as_ref(),
                    phone: submission.phone.as_ref().map(AsRef::as_ref),
                    subject: submission.subject.as_ref().map(AsRef::as_ref),
                    message: submission.message.as_ref().map(AsRef::as_ref),
                    sent_at: submission
                        .captured_at
                        .format(&Rfc3339)
                        .unwrap_or_default(),
                },
            };
            let response = self
                .client
                .post(self.config.endpoint.clone())
                .json(&request)
                .send()
                .await?;
            let status = response.status();
            if status.is_success() {
                tracing::info!("Templated message accepted.");
                return Ok(Delivery::Confirmed);
            }
            let text = response.text().await.unwrap_or_default();
            let text = text.trim();
            // Gateways and outages answer without provider text.
            if status.is_server_error() || text.is_empty() {
                tracing::warn!(%status, %text, "Templated API unavailable.");
                return Err(DispatchError::Transport(format!(
                    "templated API answered {}",
                    status
                )));
            }
            tracing::warn!(%status, %text, "Templated message refused.");
            Err(DispatchError::rejection(format!(
                "{} (status {})",
                text,
                status.as_u16()
            )))
        }
        .instrument(span)
        .await
    }
}
