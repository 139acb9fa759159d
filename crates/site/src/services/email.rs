//! Email service for lead magnet delivery and account notifications.
//!
//! Uses SMTP (STARTTLS) via lettre for delivery with Askama HTML templates.
//! Every email goes out as multipart/alternative with a plain text fallback.

use std::path::Path;

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Body, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// Subject line for the lead magnet email.
pub const CHECKLIST_SUBJECT: &str = "Your LinkedIn Profile Checklist";

/// Subject line for the audit confirmation email.
pub const AUDIT_CONFIRMATION_SUBJECT: &str = "We received your profile audit request";

/// Subject line for the welcome email.
pub const WELCOME_SUBJECT: &str = "Welcome to Leadlight";

/// Subject line for the password reset email.
pub const PASSWORD_RESET_SUBJECT: &str = "Reset your Leadlight password";

/// Attachment filename used when the configured path has no usable name.
const CHECKLIST_FILENAME: &str = "linkedin-profile-checklist.pdf";

/// Template names recorded in the email log.
pub mod templates {
    /// Lead magnet email with the checklist PDF.
    pub const CHECKLIST: &str = "checklist";
    /// Audit request confirmation.
    pub const AUDIT_RECEIVED: &str = "audit_received";
    /// Post-registration welcome.
    pub const WELCOME: &str = "welcome";
    /// Password reset link.
    pub const PASSWORD_RESET: &str = "password_reset";
}

/// HTML template for the checklist email.
#[derive(Template)]
#[template(path = "email/checklist.html")]
struct ChecklistEmailHtml<'a> {
    name: &'a str,
}

/// Plain text template for the checklist email.
#[derive(Template)]
#[template(path = "email/checklist.txt")]
struct ChecklistEmailText<'a> {
    name: &'a str,
}

/// HTML template for the audit confirmation email.
#[derive(Template)]
#[template(path = "email/audit_received.html")]
struct AuditReceivedEmailHtml<'a> {
    name: &'a str,
}

/// Plain text template for the audit confirmation email.
#[derive(Template)]
#[template(path = "email/audit_received.txt")]
struct AuditReceivedEmailText<'a> {
    name: &'a str,
}

/// HTML template for the welcome email.
#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeEmailHtml<'a> {
    name: &'a str,
    dashboard_url: &'a str,
}

/// Plain text template for the welcome email.
#[derive(Template)]
#[template(path = "email/welcome.txt")]
struct WelcomeEmailText<'a> {
    name: &'a str,
    dashboard_url: &'a str,
}

/// HTML template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetEmailHtml<'a> {
    name: &'a str,
    reset_url: &'a str,
}

/// Plain text template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetEmailText<'a> {
    name: &'a str,
    reset_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Invalid attachment content type.
    #[error("Invalid content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
///
/// The SMTP transport is built once and reused; lettre pools connections
/// internally, so cloning this service is cheap.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send the lead magnet email, attaching the checklist PDF when available.
    ///
    /// A configured but missing or unreadable PDF downgrades to a send
    /// without the attachment, with a warning in the log. The recipient
    /// still gets their email.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_checklist(
        &self,
        to: &str,
        name: &str,
        checklist_path: Option<&Path>,
    ) -> Result<(), EmailError> {
        let html = ChecklistEmailHtml { name }.render()?;
        let text = ChecklistEmailText { name }.render()?;

        let attachment = match checklist_path {
            Some(path) => match tokio::fs::read(path).await {
                Ok(bytes) => {
                    let filename = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or(CHECKLIST_FILENAME)
                        .to_string();
                    let content_type = ContentType::parse("application/pdf")?;
                    Some(Attachment::new(filename).body(Body::new(bytes), content_type))
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Checklist PDF unreadable, sending without attachment"
                    );
                    None
                }
            },
            None => None,
        };

        self.send_multipart_email(to, CHECKLIST_SUBJECT, &text, &html, attachment)
            .await
    }

    /// Send the audit request confirmation email.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_audit_confirmation(&self, to: &str, name: &str) -> Result<(), EmailError> {
        let html = AuditReceivedEmailHtml { name }.render()?;
        let text = AuditReceivedEmailText { name }.render()?;

        self.send_multipart_email(to, AUDIT_CONFIRMATION_SUBJECT, &text, &html, None)
            .await
    }

    /// Send a welcome email after successful registration.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_welcome(
        &self,
        to: &str,
        name: &str,
        dashboard_url: &str,
    ) -> Result<(), EmailError> {
        let html = WelcomeEmailHtml {
            name,
            dashboard_url,
        }
        .render()?;
        let text = WelcomeEmailText {
            name,
            dashboard_url,
        }
        .render()?;

        self.send_multipart_email(to, WELCOME_SUBJECT, &text, &html, None)
            .await
    }

    /// Send a password reset email with a single-use link.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_password_reset(
        &self,
        to: &str,
        name: &str,
        reset_url: &str,
    ) -> Result<(), EmailError> {
        let html = PasswordResetEmailHtml { name, reset_url }.render()?;
        let text = PasswordResetEmailText { name, reset_url }.render()?;

        self.send_multipart_email(to, PASSWORD_RESET_SUBJECT, &text, &html, None)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions,
    /// optionally with an attachment.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
        attachment: Option<SinglePart>,
    ) -> Result<(), EmailError> {
        let alternative = MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(text_body.to_string()),
            )
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(html_body.to_string()),
            );

        let body = match attachment {
            Some(part) => MultiPart::mixed().multipart(alternative).singlepart(part),
            None => alternative,
        };

        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(body)?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checklist_templates_render_name() {
        let html = ChecklistEmailHtml { name: "Dana" }.render().unwrap();
        let text = ChecklistEmailText { name: "Dana" }.render().unwrap();
        assert!(html.contains("Dana"));
        assert!(text.contains("Dana"));
    }

    #[test]
    fn test_audit_templates_render_name() {
        let html = AuditReceivedEmailHtml { name: "Dana" }.render().unwrap();
        let text = AuditReceivedEmailText { name: "Dana" }.render().unwrap();
        assert!(html.contains("Dana"));
        assert!(text.contains("Dana"));
    }

    #[test]
    fn test_password_reset_templates_include_url() {
        let url = "https://leadlight.dev/reset-password?token=abc123";
        let html = PasswordResetEmailHtml {
            name: "Dana",
            reset_url: url,
        }
        .render()
        .unwrap();
        let text = PasswordResetEmailText {
            name: "Dana",
            reset_url: url,
        }
        .render()
        .unwrap();
        assert!(html.contains(url));
        assert!(text.contains(url));
    }

    #[test]
    fn test_welcome_templates_include_dashboard_link() {
        let url = "https://leadlight.dev/dashboard";
        let html = WelcomeEmailHtml {
            name: "Dana",
            dashboard_url: url,
        }
        .render()
        .unwrap();
        assert!(html.contains(url));
    }
}
