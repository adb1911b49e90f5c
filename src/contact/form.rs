use crate::contact::{ContactEmail, ContactMessage, ContactName, ContactPhone, ContactSubject};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// Identifier of a contact form field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::Subject,
        Field::Message,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("Unknown contact form field '{}'.", s))
    }
}

/// Which variant of the contact form is being filled.
///
/// `Full` is the contact page form; `Quick` is the short "work together" form
/// that only collects a name and an email address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    #[default]
    Full,
    Quick,
}

impl FormKind {
    pub fn fields(&self) -> &'static [Field] {
        match self {
            FormKind::Full => &Field::ALL,
            FormKind::Quick => &[Field::Name, Field::Email],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
pub struct ValidationPolicy {
    #[serde(default)]
    pub require_phone: bool,
}

/// Raw field values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Subject => &mut self.subject,
            Field::Message => &mut self.message,
        };
        *slot = value.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|field| self.get(*field).is_empty())
    }
}

/// Per-field error messages collected by whole-form validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("Please correct the errors in the form.")]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, error)| (*field, error.as_str()))
    }

    pub(crate) fn insert(&mut self, field: Field, error: String) {
        self.0.insert(field, error);
    }

    pub(crate) fn remove(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

/// A validated snapshot of the form, captured when the user submits.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub kind: FormKind,
    pub name: ContactName,
    pub email: ContactEmail,
    pub phone: Option<ContactPhone>,
    pub subject: Option<ContactSubject>,
    pub message: Option<ContactMessage>,
    pub captured_at: OffsetDateTime,
}

/// Validate a single field value. `None` means the value is valid.
pub fn validate_field(field: Field, value: &str, policy: &ValidationPolicy) -> Option<String> {
    match field {
        Field::Name => ContactName::parse(value).err(),
        Field::Email => ContactEmail::parse(value).err(),
        Field::Phone => ContactPhone::parse_optional(value, policy.require_phone).err(),
        Field::Subject => ContactSubject::parse(value).err(),
        Field::Message => ContactMessage::parse(value).err(),
    }
}

/// Validate every field the form kind collects, aggregating all errors.
pub fn validate_form(
    form: &ContactForm,
    kind: FormKind,
    policy: &ValidationPolicy,
) -> Result<ContactSubmission, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let collects = |field: Field| kind.fields().contains(&field);

    let name = ContactName::parse(&form.name)
        .map_err(|error| errors.insert(Field::Name, error))
        .ok();
    let email = ContactEmail::parse(&form.email)
        .map_err(|error| errors.insert(Field::Email, error))
        .ok();
    let phone = if collects(Field::Phone) {
        ContactPhone::parse_optional(&form.phone, policy.require_phone)
            .map_err(|error| errors.insert(Field::Phone, error))
            .ok()
            .flatten()
    } else {
        None
    };
    let subject = if collects(Field::Subject) {
        ContactSubject::parse(&form.subject)
            .map_err(|error| errors.insert(Field::Subject, error))
            .ok()
    } else {
        None
    };
    let message = if collects(Field::Message) {
        ContactMessage::parse(&form.message)
            .map_err(|error| errors.insert(Field::Message, error))
            .ok()
    } else {
        None
    };

    match (name, email) {
        (Some(name), Some(email)) if errors.is_empty() => Ok(ContactSubmission {
            id: Uuid::now_v7(),
            kind,
            name,
            email,
            phone,
            subject,
            message,
            captured_at: OffsetDateTime::now_utc(),
        }),
        _ => Err(errors),
    }
}
