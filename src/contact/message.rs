use std::convert::AsRef;
use std::fmt;
use std::str::FromStr;

const MIN_LENGTH: usize = 10;

/// Free-form message body. Interior formatting (newlines) is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage(String);

impl ContactMessage {
    pub fn new(message: &str) -> Result<Self, String> {
        Self::parse(message)
    }
    pub fn parse(message: &str) -> Result<Self, String> {
        let trimmed_message = message.trim();
        if trimmed_message.is_empty() {
            return Err("Message is required".to_owned());
        }
        if trimmed_message.chars().count() < MIN_LENGTH {
            return Err(format!(
                "Message must be at least {} characters",
                MIN_LENGTH
            ));
        }
        Ok(Self(trimmed_message.to_owned()))
    }
}

impl AsRef<str> for ContactMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactMessage {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ContactMessage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
