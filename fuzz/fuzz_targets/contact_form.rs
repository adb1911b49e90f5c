#![no_main]

use contact_relay::contact::{validate_field, validate_form, ContactForm, FormKind, ValidationPolicy};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, arbitrary::Arbitrary)]
struct Input {
    name: String,
    email: String,
    phone: String,
    subject: String,
    message: String,
    quick: bool,
    require_phone: bool,
}

fuzz_target!(|input: Input| {
    let form = ContactForm {
        name: input.name,
        email: input.email,
        phone: input.phone,
        subject: input.subject,
        message: input.message,
    };
    let kind = if input.quick { FormKind::Quick } else { FormKind::Full };
    let policy = ValidationPolicy {
        require_phone: input.require_phone,
    };
    match validate_form(&form, kind, &policy) {
        Ok(_) => {
            for field in kind.fields() {
                assert!(validate_field(*field, form.get(*field), &policy).is_none());
            }
        }
        Err(errors) => {
            assert!(!errors.is_empty());
            for (field, error) in errors.iter() {
                assert_eq!(validate_field(field, form.get(field), &policy).as_deref(), Some(error));
            }
        }
    }
});
