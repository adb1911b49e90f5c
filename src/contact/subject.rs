use std::convert::AsRef;
use std::fmt;
use std::str::FromStr;

const MIN_LENGTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubject(String);

impl ContactSubject {
    pub fn new(subject: &str) -> Result<Self, String> {
        Self::parse(subject)
    }
    pub fn parse(subject: &str) -> Result<Self, String> {
        let trimmed_subject = subject.trim();
        if trimmed_subject.is_empty() {
            return Err("Subject is required".to_owned());
        }
        if trimmed_subject.chars().count() < MIN_LENGTH {
            return Err(format!(
                "Subject must be at least {} characters",
                MIN_LENGTH
            ));
        }
        Ok(Self(trimmed_subject.to_owned()))
    }
}

impl AsRef<str> for ContactSubject {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactSubject {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ContactSubject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
