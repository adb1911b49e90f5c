use serde::{de, Deserialize};
use std::fmt;
use std::str::FromStr;

pub static CENSOR_STRING: &str = "***REMOVED***";

/// Credential or personal value that must never reach the logs.
///
/// `Debug` and `Display` print the representation, the real value is only
/// reachable through [`CensoredString::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct CensoredString {
    data: String,
    pub representation: String,
}

impl CensoredString {
    /// Take ownership of a secret value
    pub fn new<T: AsRef<str> + ToString>(secret: &T, representation: Option<&T>) -> Self {
        Self {
            data: secret.to_string(),
            representation: representation
                .map(|value| value.to_string())
                .unwrap_or_else(|| CENSOR_STRING.to_owned()),
        }
    }

    pub fn expose(&self) -> &str {
        &self.data
    }

    pub fn is_blank(&self) -> bool {
        self.data.trim().is_empty()
    }
}

impl FromStr for CensoredString {
    type Err = core::convert::Infallible;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(src.to_owned()))
    }
}

impl From<String> for CensoredString {
    fn from(src: String) -> Self {
        Self {
            data: src,
            representation: CENSOR_STRING.to_owned(),
        }
    }
}

impl<'de> Deserialize<'de> for CensoredString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(CensoredString::from)
    }
}

impl fmt::Debug for CensoredString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.representation, f)
    }
}

impl fmt::Display for CensoredString {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.representation, f)
    }
}

#[cfg(test)]
mod tests {
    use super::{CensoredString, CENSOR_STRING};

    #[test]
    fn formatting_never_leaks_the_secret() {
        let key: CensoredString = "pk_live_123".parse().unwrap();
        assert_eq!(format!("{}", key), CENSOR_STRING);
        assert_eq!(format!("{:?}", key), format!("{:?}", CENSOR_STRING));
        assert_eq!(key.expose(), "pk_live_123");
    }

    #[test]
    fn custom_representation_is_used() {
        let key = CensoredString::new(&"pk_live_123", Some(&"pk_***"));
        assert_eq!(key.to_string(), "pk_***");
    }

    #[test]
    fn whitespace_only_secret_is_blank() {
        assert!(CensoredString::from(" \n".to_owned()).is_blank());
    }
}
