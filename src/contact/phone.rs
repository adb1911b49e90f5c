use regex::Regex;
use std::convert::AsRef;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// Optional leading '+', groups of up to four digits (optionally parenthesized),
// each group separated by at most one space, dot or hyphen.
static PHONE_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?(?:\([0-9]{1,4}\)|[0-9]{1,4})(?:[\s.-]?(?:\([0-9]{1,4}\)|[0-9]{1,4}))*$")
        .unwrap()
});

const MIN_DIGITS: usize = 7;
// E.164 upper bound
const MAX_DIGITS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPhone(String);

impl ContactPhone {
    pub fn new(phone: &str) -> Result<Self, String> {
        Self::parse(phone)
    }
    pub fn parse(phone: &str) -> Result<Self, String> {
        let trimmed_phone = phone.trim();
        if trimmed_phone.is_empty() {
            return Err("Phone number is required".to_owned());
        }
        let digits = trimmed_phone.chars().filter(char::is_ascii_digit).count();
        if !PHONE_FORMAT.is_match(trimmed_phone) || !(MIN_DIGITS..=MAX_DIGITS).contains(&digits)
        {
            return Err("Invalid phone number".to_owned());
        }
        Ok(Self(trimmed_phone.to_owned()))
    }

    /// Blank input is accepted as "not provided" unless the number is required.
    pub fn parse_optional(phone: &str, required: bool) -> Result<Option<Self>, String> {
        if !required && phone.trim().is_empty() {
            return Ok(None);
        }
        Self::parse(phone).map(Some)
    }
}

impl AsRef<str> for ContactPhone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactPhone {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ContactPhone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::ContactPhone;
    use claims::{assert_err, assert_none, assert_ok, assert_some};

    #[test]
    fn phone_accepts_common_international_shapes() {
        for phone in [
            "+1 (555) 123-4567",
            "+44 20 7946 0958",
            "555.123.4567",
            "+919876543210",
            "(040) 2345-6789",
        ] {
            assert_ok!(ContactPhone::parse(phone), "{} should be valid", phone);
        }
    }

    #[test]
    fn phone_rejects_letters_and_stray_symbols() {
        for phone in ["555-CALL-NOW", "+1 555 123 4567 ext 2", "++15551234567", "555--1234567"] {
            assert_err!(ContactPhone::parse(phone), "{} should be invalid", phone);
        }
    }

    #[test]
    fn phone_rejects_too_few_or_too_many_digits() {
        assert_err!(ContactPhone::parse("12345"));
        assert_err!(ContactPhone::parse("+1 2345 6789 0123 4567"));
    }

    #[test]
    fn blank_optional_phone_is_absent() {
        assert_none!(ContactPhone::parse_optional("  ", false).unwrap());
    }

    #[test]
    fn blank_required_phone_is_rejected() {
        assert_eq!(
            ContactPhone::parse_optional("", true),
            Err("Phone number is required".to_owned())
        );
    }

    #[test]
    fn provided_optional_phone_is_still_checked() {
        assert_err!(ContactPhone::parse_optional("not a phone", false));
        assert_some!(ContactPhone::parse_optional("+1 555 123 4567", false).unwrap());
    }
}
