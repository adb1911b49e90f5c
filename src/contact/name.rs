use regex::Regex;
use std::convert::AsRef;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

const MIN_LENGTH: usize = 2;
const MAX_LENGTH: usize = 254;

static LETTERS_AND_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\s]+$").unwrap());
static INTERMEDIATE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Sender name: letters and whitespace only, runs of whitespace collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactName(String);

impl ContactName {
    pub fn new(name: &str) -> Result<Self, String> {
        Self::parse(name)
    }
    pub fn parse(name: &str) -> Result<Self, String> {
        let trimmed_name = name.trim();
        if trimmed_name.is_empty() {
            return Err("Name is required".to_owned());
        }
        let name_middle_trim = INTERMEDIATE_WHITESPACE
            .replace_all(trimmed_name, " ")
            .into_owned();
        let length = name_middle_trim.chars().count();
        if length < MIN_LENGTH {
            return Err(format!("Name must be at least {} characters", MIN_LENGTH));
        }
        if !LETTERS_AND_WHITESPACE.is_match(&name_middle_trim) {
            return Err("Name must contain only letters and spaces".to_owned());
        }
        if length > MAX_LENGTH {
            return Err(format!("Name must be at most {} characters", MAX_LENGTH));
        }
        Ok(Self(name_middle_trim))
    }
}

impl AsRef<str> for ContactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContactName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ContactName {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::ContactName;
    use claims::{assert_err, assert_ok};
    use std::str::FromStr;

    #[test]
    fn name_rejects_blank_input() {
        assert_eq!(ContactName::parse("   \t"), Err("Name is required".to_owned()));
    }

    #[test]
    fn name_rejects_single_letter() {
        assert_err!(ContactName::parse("J"));
    }

    #[test]
    fn name_rejects_digits_and_punctuation() {
        for name in ["R2D2", "Jane <script>", "O'Brien", "Jane_Doe"] {
            assert_eq!(
                ContactName::parse(name),
                Err("Name must contain only letters and spaces".to_owned()),
                "{} should have been rejected",
                name
            );
        }
    }

    #[test]
    fn name_accepts_non_ascii_letters() {
        assert_ok!(ContactName::parse("Zoë Łukasiewicz"));
        assert_ok!(ContactName::parse("山田 太郎"));
    }

    #[test]
    fn name_collapses_intermediate_whitespace() {
        let name = ContactName::from_str("  Jane \t  Doe ").unwrap();
        assert_eq!(name.as_ref(), "Jane Doe");
    }

    #[test]
    fn name_rejects_255_characters_input() {
        let name = "n".repeat(255);
        assert_err!(ContactName::new(&name));
    }

    #[test]
    fn name_accepts_254_characters_input() {
        let name = "y".repeat(254);
        assert_ok!(ContactName::from_str(&name));
    }
}
