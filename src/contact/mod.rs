mod email;
mod form;
mod message;
mod name;
mod phone;
mod subject;

pub use email::ContactEmail;
pub use form::{
    validate_field, validate_form, ContactForm, ContactSubmission, Field, FormKind,
    ValidationErrors, ValidationPolicy,
};
pub use message::ContactMessage;
pub use name::ContactName;
pub use phone::ContactPhone;
pub use subject::ContactSubject;
