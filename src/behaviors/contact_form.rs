use fancy_regex::Regex;

use crate::dom::NodeId;
use crate::events::Handler;
use crate::page::{Page, PageState};
use crate::{Error, Result};

const FORM_SELECTOR: &str = ".contact__form";
const SUCCESS_SELECTOR: &str = ".form__success";
const INVALID_CLASS: &str = "is-invalid";

const FIELD_NAMES: [&str; 3] = ["name", "email", "message"];

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

const NAME_REQUIRED: &str = "Te rugăm să adaugi numele.";
const EMAIL_REQUIRED: &str = "Te rugăm să adaugi emailul.";
const EMAIL_FORMAT: &str = "Email invalid. Ex: nume@domeniu.com";
const MESSAGE_REQUIRED: &str = "Spune-ne câteva detalii despre rezervare.";
const SUCCESS_MESSAGE: &str =
    "Mulțumim! Trimite formularul cu providerul preferat (Formspree/EmailJS).";

struct FieldSlot {
    name: &'static str,
    input: Option<NodeId>,
    error_slot: Option<NodeId>,
}

pub(crate) fn attach(page: &mut Page) -> Result<()> {
    let Some(form) = page.query(FORM_SELECTOR)? else {
        return Ok(());
    };

    let mut fields = Vec::with_capacity(FIELD_NAMES.len());
    for name in FIELD_NAMES {
        fields.push(FieldSlot {
            name,
            input: page.query_from(form, &format!("#{name}"))?,
            error_slot: page.query_from(form, &format!("[data-error-for='{name}']"))?,
        });
    }
    let success_slot = page.query_from(form, SUCCESS_SELECTOR)?;
    let email_pattern = Regex::new(EMAIL_PATTERN)
        .map_err(|err| Error::Runtime(format!("email pattern failed to compile: {err}")))?;

    page.add_listener(
        form,
        "submit",
        Handler::new(move |state, event| {
            // Delivery belongs to an external form provider; this layer only
            // validates.
            event.prevent_default();

            clear_feedback(state, &fields, success_slot)?;

            let mut failed = false;
            for field in &fields {
                let value = field
                    .input
                    .map(|input| state.dom.value(input))
                    .transpose()?
                    .unwrap_or_default();
                let Some(message) = field_error(field.name, value.trim(), &email_pattern)? else {
                    continue;
                };
                failed = true;
                if let Some(input) = field.input {
                    state.dom.class_add(input, INVALID_CLASS)?;
                    state.dom.set_attr(input, "aria-invalid", "true")?;
                }
                if let Some(slot) = field.error_slot {
                    state.dom.set_text_content(slot, message)?;
                }
            }

            if !failed {
                if let Some(slot) = success_slot {
                    state.dom.set_text_content(slot, SUCCESS_MESSAGE)?;
                }
                for field in &fields {
                    if let Some(input) = field.input {
                        state.dom.reset_control(input)?;
                    }
                }
            }

            Ok(())
        }),
    );

    Ok(())
}

// Every attempt starts from a clean slate; clearing twice in a row is a
// no-op.
fn clear_feedback(
    state: &mut PageState,
    fields: &[FieldSlot],
    success_slot: Option<NodeId>,
) -> Result<()> {
    for field in fields {
        if let Some(input) = field.input {
            state.dom.class_remove(input, INVALID_CLASS)?;
            state.dom.set_attr(input, "aria-invalid", "false")?;
        }
        if let Some(slot) = field.error_slot {
            state.dom.set_text_content(slot, "")?;
        }
    }
    if let Some(slot) = success_slot {
        state.dom.set_text_content(slot, "")?;
    }
    Ok(())
}

// At most one message per field; email emptiness short-circuits the format
// check. Values arrive already trimmed.
fn field_error(name: &str, value: &str, email_pattern: &Regex) -> Result<Option<&'static str>> {
    if value.is_empty() {
        return Ok(match name {
            "name" => Some(NAME_REQUIRED),
            "email" => Some(EMAIL_REQUIRED),
            "message" => Some(MESSAGE_REQUIRED),
            _ => None,
        });
    }
    if name == "email" && !email_matches(email_pattern, value)? {
        return Ok(Some(EMAIL_FORMAT));
    }
    Ok(None)
}

fn email_matches(email_pattern: &Regex, value: &str) -> Result<bool> {
    email_pattern
        .is_match(value)
        .map_err(|err| Error::Runtime(format!("email pattern match failed: {err}")))
}
