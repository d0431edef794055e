//! Contact form delivery through the Resend API.

use askama::Template;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sinocoffee_core::Email;

use crate::config::EmailConfig;
use crate::models::{FormErrors, form::non_blank};

/// Resend API base URL.
const BASE_URL: &str = "https://api.resend.com";

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailerError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Body template failed to render.
    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    /// Failed to parse response or build a request.
    #[error("Parse error: {0}")]
    Parse(String),
}

// =============================================================================
// Contact form
// =============================================================================

/// Raw contact form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default, rename = "firstName")]
    pub first_name: String,
    #[serde(default, rename = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// A validated contact message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Validate the submission.
    ///
    /// # Errors
    ///
    /// Returns every blank field, and `email` when it does not parse.
    pub fn validate(&self) -> Result<ContactMessage, FormErrors> {
        let mut errors = FormErrors::new();

        let first_name = non_blank(&self.first_name);
        if first_name.is_none() {
            errors.add("firstName", "First name is required");
        }
        let last_name = non_blank(&self.last_name);
        if last_name.is_none() {
            errors.add("lastName", "Last name is required");
        }
        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(sinocoffee_core::EmailError::Empty) => {
                errors.add("email", "Email is required");
                None
            }
            Err(e) => {
                errors.add("email", format!("Please enter a valid email address ({e})"));
                None
            }
        };
        let subject = non_blank(&self.subject);
        if subject.is_none() {
            errors.add("subject", "Subject is required");
        }
        let message = non_blank(&self.message);
        if message.is_none() {
            errors.add("message", "Message is required");
        }

        match (first_name, last_name, email, subject, message) {
            (Some(first_name), Some(last_name), Some(email), Some(subject), Some(message)) => {
                Ok(ContactMessage {
                    first_name,
                    last_name,
                    email,
                    subject,
                    message,
                })
            }
            _ => Err(errors),
        }
    }
}

/// HTML body of the contact email.
#[derive(Template)]
#[template(path = "emails/contact.html")]
struct ContactHtml<'a> {
    msg: &'a ContactMessage,
}

/// Plain-text body of the contact email.
#[derive(Template)]
#[template(path = "emails/contact.txt")]
struct ContactText<'a> {
    msg: &'a ContactMessage,
}

/// A fully rendered outgoing email, in Resend's request shape.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl ContactMessage {
    /// Render the email that forwards this message to the shop inbox.
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Template` if a body fails to render.
    pub fn to_email(&self, from: &str, to: &str) -> Result<OutgoingEmail, MailerError> {
        Ok(OutgoingEmail {
            from: from.to_string(),
            to: vec![to.to_string()],
            reply_to: self.email.to_string(),
            subject: format!("Contact Form: {}", self.subject),
            html: ContactHtml { msg: self }.render()?,
            text: ContactText { msg: self }.render()?,
        })
    }
}

// =============================================================================
// Client
// =============================================================================

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Resend API client.
#[derive(Clone)]
pub struct EmailClient {
    client: reqwest::Client,
    from: String,
    to: String,
}

impl EmailClient {
    /// Create a client, or `None` when no API key is configured.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn from_config(config: &EmailConfig) -> Result<Option<Self>, MailerError> {
        let Some(api_key) = config.resend_api_key.as_ref() else {
            return Ok(None);
        };

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| MailerError::Parse(format!("Invalid API key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Some(Self {
            client,
            from: config.from_address.clone(),
            to: config.to_address.clone(),
        }))
    }

    /// Forward a contact message to the shop inbox. Returns the Resend
    /// message ID.
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Api` if Resend rejects the email.
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<String, MailerError> {
        let email = message.to_email(&self.from, &self.to)?;
        self.send(&email).await
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailerError> {
        let response = self
            .client
            .post(format!("{BASE_URL}/emails"))
            .json(email)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(MailerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| MailerError::Parse(e.to_string()))?;
        Ok(sent.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            first_name: "Maria".to_string(),
            last_name: "Chen".to_string(),
            email: "Maria@Example.com".to_string(),
            subject: "Catering".to_string(),
            message: "Hello!\nDo you cater events?".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let msg = form().validate().unwrap();
        assert_eq!(msg.email.as_str(), "maria@example.com");
        assert_eq!(msg.first_name, "Maria");
    }

    #[test]
    fn test_all_fields_required() {
        let errors = ContactForm::default().validate().unwrap_err();
        for field in ["firstName", "lastName", "email", "subject", "message"] {
            assert!(errors.has(field), "missing error for {field}");
        }
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn test_invalid_email() {
        let mut f = form();
        f.email = "not-an-email".to_string();
        let errors = f.validate().unwrap_err();
        assert!(errors.has("email"));
        assert!(!errors.has("subject"));
    }

    #[test]
    fn test_whitespace_only_is_blank() {
        let mut f = form();
        f.message = "   \n ".to_string();
        assert!(f.validate().unwrap_err().has("message"));
    }

    #[test]
    fn test_rendered_email() {
        let msg = form().validate().unwrap();
        let email = msg.to_email("SinoCoffee <a@b.co>", "inbox@b.co").unwrap();
        assert_eq!(email.subject, "Contact Form: Catering");
        assert_eq!(email.reply_to, "maria@example.com");
        assert_eq!(email.to, ["inbox@b.co"]);
        assert!(email.html.contains("New Contact Form Submission"));
        assert!(email.html.contains("Hello!<br"));
        assert!(email.html.contains("Reply directly to this email to respond to Maria."));
        assert!(email.text.contains("Hello!\nDo you cater events?"));
    }

    #[test]
    fn test_html_body_is_escaped() {
        let mut f = form();
        f.first_name = "<script>alert(1)</script>".to_string();
        f.message = "<b>hi</b>".to_string();
        let email = f.validate().unwrap().to_email("a@b.co", "c@d.co").unwrap();
        assert!(!email.html.contains("<script>"));
        assert!(!email.html.contains("<b>hi</b>"));
        assert!(email.html.contains("&lt;b&gt;hi&lt;/b&gt;"));
    }

    #[test]
    fn test_resend_request_shape() {
        let msg = form().validate().unwrap();
        let email = msg.to_email("from@b.co", "to@b.co").unwrap();
        let json = serde_json::to_value(&email).unwrap();
        assert_eq!(json["to"][0], "to@b.co");
        assert_eq!(json["reply_to"], "maria@example.com");
        assert!(json["html"].is_string());
    }

    #[test]
    fn test_client_disabled_without_key() {
        let config = crate::config::tests::test_config();
        assert!(EmailClient::from_config(&config.email).unwrap().is_none());
    }
}
