//! Contact form route handler.
//!
//! The form posts over HTMX and is swapped with a fresh copy: cleared after a
//! successful send, refilled with field errors otherwise.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State};
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::models::{FormErrors, Toast};
use crate::services::ContactForm;
use crate::state::AppState;

/// Contact form fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/contact_form.html")]
pub struct ContactFormTemplate {
    pub form: ContactForm,
    pub errors: FormErrors,
    pub toast: Option<Toast>,
}

impl ContactFormTemplate {
    fn with_toast(form: ContactForm, errors: FormErrors, toast: Toast) -> Self {
        Self {
            form,
            errors,
            toast: Some(toast),
        }
    }
}

/// Submit the contact form (HTMX).
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> ContactFormTemplate {
    let Some(client) = state.email() else {
        tracing::warn!("Contact form submitted but email is not configured");
        return ContactFormTemplate::with_toast(
            form,
            FormErrors::new(),
            Toast::error(
                "Contact form unavailable",
                "Messages cannot be sent right now. Please email hello@sinocoffee.com instead.",
            ),
        );
    };

    let message = match form.validate() {
        Ok(message) => message,
        Err(errors) => {
            return ContactFormTemplate::with_toast(
                form,
                errors,
                Toast::error(
                    "Missing Information",
                    "Please fill in all fields before submitting.",
                ),
            );
        }
    };

    match client.send_contact(&message).await {
        Ok(id) => {
            add_breadcrumb(
                "contact",
                "Sent contact message",
                Some(&[("email_id", id.as_str())]),
            );
            tracing::info!(email_id = %id, "Contact message sent");
            ContactFormTemplate::with_toast(
                ContactForm::default(),
                FormErrors::new(),
                Toast::success(
                    "Message Sent!",
                    "Thank you for contacting us. We'll get back to you soon.",
                ),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to send contact message");
            ContactFormTemplate::with_toast(
                form,
                FormErrors::new(),
                Toast::error("Error", "Failed to send message. Please try again."),
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_render_next_to_fields() {
        let form = ContactForm {
            first_name: "Maria".to_string(),
            email: "not-an-email".to_string(),
            ..ContactForm::default()
        };
        let errors = form.validate().unwrap_err();
        let html = ContactFormTemplate {
            form,
            errors,
            toast: None,
        }
        .render()
        .unwrap();
        assert!(html.contains("value=\"Maria\""));
        assert!(html.contains("Last name is required"));
        assert!(html.contains("Please enter a valid email address"));
    }

    #[test]
    fn test_submitted_values_are_escaped() {
        let form = ContactForm {
            subject: "\"><script>alert(1)</script>".to_string(),
            ..ContactForm::default()
        };
        let html = ContactFormTemplate {
            form,
            errors: FormErrors::new(),
            toast: None,
        }
        .render()
        .unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
    }
}
