use crate::contact::ContactSubmission;
use crate::dispatch::{Delivery, DispatchError, Dispatcher};
use crate::http::HttpClient;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_bool_from_anything;
use std::sync::Arc;
use tracing::Instrument;
use url::Url;

pub const RELAY_ENDPOINT: &str = "https://formsubmit.co";

/// Where and how the form relay forwards submissions.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub endpoint: Url,
    /// Destination inbox registered with the relay.
    pub mailbox: Option<String>,
    pub subject_line: String,
    pub template: String,
    pub captcha: bool,
    pub next_url: Option<Url>,
}

impl RelayConfig {
    /// `<endpoint>/ajax/<mailbox>`, answering with a JSON acknowledgement.
    pub fn ajax_endpoint(&self) -> Result<Url, DispatchError> {
        self.endpoint_with(Some("ajax"))
    }

    /// `<endpoint>/<mailbox>`, the plain form target.
    pub fn form_endpoint(&self) -> Result<Url, DispatchError> {
        self.endpoint_with(None)
    }

    fn endpoint_with(&self, prefix: Option<&str>) -> Result<Url, DispatchError> {
        let mailbox = match self.mailbox.as_deref().map(str::trim) {
            Some(mailbox) if !mailbox.is_empty() => mailbox,
            _ => return Err(DispatchError::NotConfigured),
        };
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| DispatchError::NotConfigured)?
            .pop_if_empty()
            .extend(prefix)
            .push(mailbox);
        Ok(url)
    }
}

/// Form-encoded body understood by the relay: the user's fields plus the
/// relay's underscore-prefixed control fields.
#[derive(Debug, Serialize)]
pub(crate) struct RelayPayload<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(rename = "_captcha")]
    captcha: &'static str,
    #[serde(rename = "_template")]
    template: &'a str,
    #[serde(rename = "_subject")]
    subject_line: &'a str,
    #[serde(rename = "_next", skip_serializing_if = "Option::is_none")]
    next: Option<&'a str>,
}

impl<'a> RelayPayload<'a> {
    pub(crate) fn new(submission: &'a ContactSubmission, config: &'a RelayConfig) -> Self {
        Self {
            name: submission.name.as_ref(),
            email: submission.email.as_ref(),
            phone: submission.phone.as_ref().map(AsRef::as_ref),
            subject: submission.subject.as_ref().map(AsRef::as_ref),
            message: submission.message.as_ref().map(AsRef::as_ref),
            captcha: if config.captcha { "true" } else { "false" },
            template: &config.template,
            subject_line: &config.subject_line,
            next: config.next_url.as_ref().map(Url::as_str),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelayAcknowledgement {
    // the relay answers with "true"/"false" strings
    #[serde(default, deserialize_with = "deserialize_bool_from_anything")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Direct form-encoded POST to the relay, reading its JSON acknowledgement.
#[derive(Debug, Clone)]
pub struct RelayPost {
    client: HttpClient,
    config: Arc<RelayConfig>,
}

impl RelayPost {
    pub fn new(client: HttpClient, config: Arc<RelayConfig>) -> Self {
        Self { client, config }
    }
}

impl Dispatcher for RelayPost {
    fn strategy(&self) -> &'static str {
        "relay_post"
    }

    async fn dispatch(&self, submission: &ContactSubmission) -> Result<Delivery, DispatchError> {
        let url = self.config.ajax_endpoint()?;
        let span = tracing::info_span!("relay_post", attempt = %submission.id, host = url.host_str());
        async move {
            let response = self
                .client
                .post(url)
                .header(ACCEPT, "application/json")
                .form(&RelayPayload::new(submission, &self.config))
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            match serde_json::from_str::<RelayAcknowledgement>(&body) {
                Ok(acknowledgement) if status.is_success() && acknowledgement.success => {
                    tracing::info!("Relay acknowledged the submission.");
                    Ok(Delivery::Confirmed)
                }
                Ok(acknowledgement) => {
                    let message = acknowledgement
                        .message
                        .unwrap_or_default();
                    tracing::warn!(%status, %message, "Relay rejected the submission.");
                    Err(DispatchError::rejection(message))
                }
                Err(error) => {
                    tracing::error!(%status, %error, "Relay answer could not be read.");
                    Err(DispatchError::Transport(format!(
                        "relay answered {} without a readable acknowledgement",
                        status
                    )))
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::{RelayConfig, RelayPayload};
    use crate::contact::{validate_form, ContactForm, FormKind};
    use crate::dispatch::DispatchError;

    fn config(mailbox: Option<&str>) -> RelayConfig {
        RelayConfig {
            endpoint: "https://formsubmit.co".parse().unwrap(),
            mailbox: mailbox.map(str::to_owned),
            subject_line: "New Contact Form Submission".to_owned(),
            template: "table".to_owned(),
            captcha: false,
            next_url: None,
        }
    }

    #[test]
    fn endpoints_are_built_under_the_relay_base() {
        let config = config(Some("inbox@example.com"));
        assert_eq!(
            config.ajax_endpoint().unwrap().as_str(),
            "https://formsubmit.co/ajax/inbox@example.com"
        );
        assert_eq!(
            config.form_endpoint().unwrap().as_str(),
            "https://formsubmit.co/inbox@example.com"
        );
    }

    #[test]
    fn missing_mailbox_disables_the_relay() {
        assert_eq!(config(None).ajax_endpoint(), Err(DispatchError::NotConfigured));
        assert_eq!(config(Some("  ")).form_endpoint(), Err(DispatchError::NotConfigured));
    }

    #[test]
    fn payload_carries_control_fields_and_skips_absent_ones() {
        let form = ContactForm {
            name: "Jane Doe".to_owned(),
            email: "jane@example.com".to_owned(),
            ..ContactForm::default()
        };
        let submission = validate_form(&form, FormKind::Quick, &Default::default()).unwrap();
        let config = config(Some("inbox@example.com"));
        let encoded = serde_urlencoded::to_string(RelayPayload::new(&submission, &config)).unwrap();
        assert_eq!(
            encoded,
            "name=Jane+Doe&email=jane%40example.com&_captcha=false&_template=table\
             &_subject=New+Contact+Form+Submission"
        );
    }
}
