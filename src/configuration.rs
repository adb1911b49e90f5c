use crate::censoredstring::CensoredString;
use crate::contact::{FormKind, ValidationPolicy};
use crate::dispatch::{
    RelayConfig, TemplatedApiConfig, DEFAULT_CLEANUP_DELAY, DEFAULT_DISPATCH_TIMEOUT,
    RELAY_ENDPOINT, TEMPLATED_API_ENDPOINT,
};
use crate::workflow::{WorkflowOptions, DEFAULT_DISPLAY_WINDOW};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time::Duration;
use url::Url;

pub const ENVIRONMENT_PREFIX: &str = "CONTACT_RELAY";

#[derive(serde::Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Settings {
    pub delivery: DeliverySettings,
    pub relay: RelaySettings,
    pub templated: TemplatedSettings,
    pub workflow: WorkflowSettings,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStrategy {
    #[default]
    RelayPost,
    HiddenFrame,
    TemplatedApi,
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct DeliverySettings {
    pub strategy: DeliveryStrategy,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_ms: u64,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            strategy: DeliveryStrategy::default(),
            timeout_ms: DEFAULT_DISPATCH_TIMEOUT.as_millis() as u64,
        }
    }
}

impl DeliverySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct RelaySettings {
    pub endpoint: Url,
    pub mailbox: Option<String>,
    pub subject_line: String,
    pub template: String,
    pub captcha: bool,
    pub next_url: Option<Url>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub cleanup_delay_ms: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(RELAY_ENDPOINT).unwrap(),
            mailbox: None,
            subject_line: "New Contact Form Submission".to_owned(),
            template: "table".to_owned(),
            captcha: false,
            next_url: None,
            cleanup_delay_ms: DEFAULT_CLEANUP_DELAY.as_millis() as u64,
        }
    }
}

impl RelaySettings {
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            endpoint: self.endpoint.clone(),
            mailbox: self.mailbox.clone(),
            subject_line: self.subject_line.clone(),
            template: self.template.clone(),
            captcha: self.captcha,
            next_url: self.next_url.clone(),
        }
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.cleanup_delay_ms)
    }

    /// A blank mailbox counts as missing.
    pub fn has_mailbox(&self) -> bool {
        !self
            .mailbox
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .is_empty()
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct TemplatedSettings {
    pub endpoint: Url,
    pub service_id: String,
    pub template_id: String,
    /// Absent key disables templated delivery instead of failing startup.
    pub public_key: Option<CensoredString>,
}

impl Default for TemplatedSettings {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(TEMPLATED_API_ENDPOINT).unwrap(),
            service_id: String::new(),
            template_id: String::new(),
            public_key: None,
        }
    }
}

impl TemplatedSettings {
    pub fn api_config(&self) -> TemplatedApiConfig {
        TemplatedApiConfig {
            endpoint: self.endpoint.clone(),
            service_id: self.service_id.clone(),
            template_id: self.template_id.clone(),
        }
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct WorkflowSettings {
    pub form: FormKind,
    pub require_phone: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub display_window_ms: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            form: FormKind::default(),
            require_phone: false,
            display_window_ms: DEFAULT_DISPLAY_WINDOW.as_millis() as u64,
        }
    }
}

impl WorkflowSettings {
    pub fn options(&self) -> WorkflowOptions {
        WorkflowOptions {
            kind: self.form,
            policy: ValidationPolicy {
                require_phone: self.require_phone,
            },
            display_window: Duration::from_millis(self.display_window_ms),
        }
    }
}

// Read top-level configuration file with compatible extension YAML, then let
// CONTACT_RELAY__SECTION__KEY environment variables override it.
pub fn get_configuration(filename: &str) -> Result<Settings, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name(filename).required(false))
        .add_source(
            config::Environment::with_prefix(ENVIRONMENT_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_when_no_file_exists() {
        let settings = get_configuration("this-configuration-does-not-exist").unwrap();
        assert_eq!(settings.delivery.strategy, DeliveryStrategy::RelayPost);
        assert_eq!(settings.delivery.timeout(), Duration::from_secs(15));
        assert_eq!(settings.relay.endpoint.as_str(), "https://formsubmit.co/");
        assert!(settings.templated.public_key.is_none());
        assert_eq!(
            settings.workflow.options().display_window,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn blank_mailbox_is_not_a_mailbox() {
        let mut relay = RelaySettings::default();
        assert!(!relay.has_mailbox());
        relay.mailbox = Some("   ".to_owned());
        assert!(!relay.has_mailbox());
        relay.mailbox = Some("inbox@example.com".to_owned());
        assert!(relay.has_mailbox());
    }

    #[test]
    fn yaml_file_is_read() {
        let path = std::env::temp_dir().join(format!("contact-relay-{}.yaml", uuid::Uuid::now_v7()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "delivery:\n  strategy: templated_api\n  timeout_ms: \"2500\"\n\
             templated:\n  service_id: service_1\n  template_id: template_1\n  public_key: pk_1\n\
             workflow:\n  form: quick\n  require_phone: true"
        )
        .unwrap();

        let settings = get_configuration(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.delivery.strategy, DeliveryStrategy::TemplatedApi);
        assert_eq!(settings.delivery.timeout(), Duration::from_millis(2500));
        assert_eq!(settings.templated.service_id, "service_1");
        assert_eq!(
            settings.templated.public_key.as_ref().map(CensoredString::expose),
            Some("pk_1")
        );
        let options = settings.workflow.options();
        assert_eq!(options.kind, FormKind::Quick);
        assert!(options.policy.require_phone);
    }
}
