use regex::Regex;
use std::convert::AsRef;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// local-part@domain.tld, TLD of at least two letters
static EMAIL_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn new(email: &str) -> Result<Self, String> {
        Self::parse(email)
    }
    pub fn parse(email: &str) -> Result<Self, String> {
        let lowercase_email = email.trim().to_lowercase();
        if lowercase_email.is_empty() {
            return Err("Email is required".to_owned());
        }
        if EMAIL_FORMAT.is_match(&lowercase_email) {
            Ok(Self(lowercase_email))
        } else {
            Err("Invalid email address".to_owned())
        }
    }
}

impl AsRef<str> for ContactEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactEmail {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ContactEmail {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
