//! Lead intake service.
//!
//! Drives both public capture forms through the same pipeline: validate the
//! submission, upsert it into Postgres, send the confirmation email, and
//! append a row to the CSV backup log.
//!
//! The database write is the only fatal step. A failed email send is logged
//! and recorded but does not fail the submission unless
//! `EMAIL_FAILURE_FATAL` is set, and the CSV append runs even when the
//! database is down so no submission is lost outright.

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;

use leadlight_core::{DeliveryStatus, Email};

use crate::config::IntakeConfig;
use crate::db::{AuditRepository, EmailLogRepository, LeadRepository};
use crate::models::{NewAuditRequest, NewEmailRecord, NewLead};
use crate::services::backup::{BackupLog, BackupRow};
use crate::services::email::{
    AUDIT_CONFIRMATION_SUBJECT, CHECKLIST_SUBJECT, EmailService, templates,
};

/// Source tag stored on leads captured by the checklist form.
const LEAD_MAGNET_SOURCE: &str = "lead_magnet";

// =========================================================================
// Form payloads
// =========================================================================

/// Checklist (lead magnet) form fields.
///
/// Every field defaults to empty so a request missing a key deserializes
/// and fails validation with a field list instead of a serde error.
/// `consent` left out entirely means yes; the forms always submit an
/// explicit value.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadMagnetSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub consent: Option<bool>,
}

/// Profile audit request form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub consent: Option<bool>,
}

// =========================================================================
// Outcome
// =========================================================================

/// Result of processing a form submission.
///
/// Route handlers map variants onto HTTP statuses: `Accepted` is 200,
/// `Rejected` is 400, `Failed` is 500. All three carry a message suitable
/// for showing to the submitter.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Submission stored and acknowledged.
    Accepted { message: String },
    /// Submission invalid; nothing was stored.
    Rejected { message: String },
    /// Submission could not be completed.
    Failed { message: String },
}

impl SubmitOutcome {
    /// Whether the submission went through.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// The user-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Accepted { message } | Self::Rejected { message } | Self::Failed { message } => {
                message
            }
        }
    }
}

// =========================================================================
// Service
// =========================================================================

/// Lead intake service.
///
/// Borrowed per-request from [`crate::state::AppState`].
pub struct IntakeService<'a> {
    leads: LeadRepository<'a>,
    audits: AuditRepository<'a>,
    email_log: EmailLogRepository<'a>,
    email: &'a EmailService,
    backup: &'a BackupLog,
    settings: &'a IntakeConfig,
}

impl<'a> IntakeService<'a> {
    /// Create a new intake service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        email: &'a EmailService,
        backup: &'a BackupLog,
        settings: &'a IntakeConfig,
    ) -> Self {
        Self {
            leads: LeadRepository::new(pool),
            audits: AuditRepository::new(pool),
            email_log: EmailLogRepository::new(pool),
            email,
            backup,
            settings,
        }
    }

    /// Process a checklist form submission.
    ///
    /// Valid submissions produce exactly one lead row (upserted by email),
    /// one send attempt, and one CSV backup row.
    pub async fn submit_lead_magnet(
        &self,
        form: LeadMagnetSubmission,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> SubmitOutcome {
        let missing = missing_lead_fields(&form);
        if !missing.is_empty() {
            return SubmitOutcome::Rejected {
                message: format_missing(&missing),
            };
        }

        let Ok(email) = Email::parse(&form.email.trim().to_lowercase()) else {
            return SubmitOutcome::Rejected {
                message: "Please enter a valid email address.".to_string(),
            };
        };

        let new_lead = NewLead {
            name: form.name.trim().to_string(),
            email,
            company: form.company.and_then(non_empty),
            linkedin_url: form.linkedin_url.and_then(non_empty),
            consent: form.consent.unwrap_or(true),
            source: LEAD_MAGNET_SOURCE.to_string(),
            client_ip,
            user_agent,
        };

        let lead = match self.leads.upsert(&new_lead).await {
            Ok(lead) => lead,
            Err(e) => {
                tracing::error!(
                    email = %new_lead.email,
                    error = %e,
                    "Failed to persist lead, falling back to CSV only"
                );
                self.append_backup(&lead_backup_row(&new_lead, false)).await;
                return SubmitOutcome::Failed {
                    message: "Something went wrong saving your details. Please try again."
                        .to_string(),
                };
            }
        };

        let send_result = self
            .email
            .send_checklist(
                new_lead.email.as_str(),
                &new_lead.name,
                self.settings.checklist_path.as_deref(),
            )
            .await;

        let send_error = match &send_result {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(to = %new_lead.email, error = %e, "Failed to send checklist email");
                Some(e.to_string())
            }
        };

        let record = NewEmailRecord {
            lead_id: Some(lead.id),
            recipient: new_lead.email.to_string(),
            subject: CHECKLIST_SUBJECT.to_string(),
            template: templates::CHECKLIST.to_string(),
            status: if send_error.is_none() {
                DeliveryStatus::Sent
            } else {
                DeliveryStatus::Failed
            },
            error: send_error.clone(),
        };
        if let Err(e) = self.email_log.record(&record).await {
            tracing::error!(error = %e, "Failed to record email log entry");
        }

        self.append_backup(&lead_backup_row(&new_lead, true)).await;

        if send_error.is_some() && self.settings.email_failure_fatal {
            return SubmitOutcome::Failed {
                message: "We saved your details but could not send the checklist email."
                    .to_string(),
            };
        }

        SubmitOutcome::Accepted {
            message: "Thanks! Your checklist is on its way to your inbox.".to_string(),
        }
    }

    /// Process a profile audit request submission.
    pub async fn submit_profile_audit(
        &self,
        form: AuditSubmission,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> SubmitOutcome {
        let missing = missing_audit_fields(&form);
        if !missing.is_empty() {
            return SubmitOutcome::Rejected {
                message: format_missing(&missing),
            };
        }

        let Ok(email) = Email::parse(&form.email.trim().to_lowercase()) else {
            return SubmitOutcome::Rejected {
                message: "Please enter a valid email address.".to_string(),
            };
        };

        let new_audit = NewAuditRequest {
            name: form.name.trim().to_string(),
            email,
            linkedin_url: form.linkedin_url.trim().to_string(),
            target_audience: form.target_audience.trim().to_string(),
            goal: form.goal.trim().to_string(),
            challenge: form.challenge.and_then(non_empty),
            company: form.company.and_then(non_empty),
            consent: form.consent.unwrap_or(true),
            client_ip,
            user_agent,
        };

        if let Err(e) = self.audits.create(&new_audit).await {
            tracing::error!(
                email = %new_audit.email,
                error = %e,
                "Failed to persist audit request, falling back to CSV only"
            );
            self.append_backup(&audit_backup_row(&new_audit, false))
                .await;
            return SubmitOutcome::Failed {
                message: "Something went wrong saving your request. Please try again.".to_string(),
            };
        }

        let send_result = self
            .email
            .send_audit_confirmation(new_audit.email.as_str(), &new_audit.name)
            .await;

        let send_error = match &send_result {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(to = %new_audit.email, error = %e, "Failed to send audit confirmation email");
                Some(e.to_string())
            }
        };

        let record = NewEmailRecord {
            lead_id: None,
            recipient: new_audit.email.to_string(),
            subject: AUDIT_CONFIRMATION_SUBJECT.to_string(),
            template: templates::AUDIT_RECEIVED.to_string(),
            status: if send_error.is_none() {
                DeliveryStatus::Sent
            } else {
                DeliveryStatus::Failed
            },
            error: send_error.clone(),
        };
        if let Err(e) = self.email_log.record(&record).await {
            tracing::error!(error = %e, "Failed to record email log entry");
        }

        self.append_backup(&audit_backup_row(&new_audit, true))
            .await;

        if send_error.is_some() && self.settings.email_failure_fatal {
            return SubmitOutcome::Failed {
                message: "We saved your request but could not send the confirmation email."
                    .to_string(),
            };
        }

        SubmitOutcome::Accepted {
            message: "Thanks! We received your audit request and will be in touch within two \
                      business days."
                .to_string(),
        }
    }

    async fn append_backup(&self, row: &BackupRow<'_>) {
        if let Err(e) = self.backup.append(row).await {
            tracing::warn!(
                path = %self.backup.path().display(),
                error = %e,
                "Failed to append submission to backup CSV"
            );
        }
    }
}

// =========================================================================
// Validation helpers
// =========================================================================

/// Names of required checklist form fields that are missing or blank.
fn missing_lead_fields(form: &LeadMagnetSubmission) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if form.name.trim().is_empty() {
        missing.push("name");
    }
    if form.email.trim().is_empty() {
        missing.push("email");
    }
    missing
}

/// Names of required audit form fields that are missing or blank.
fn missing_audit_fields(form: &AuditSubmission) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if form.name.trim().is_empty() {
        missing.push("name");
    }
    if form.email.trim().is_empty() {
        missing.push("email");
    }
    if form.linkedin_url.trim().is_empty() {
        missing.push("linkedin_url");
    }
    if form.target_audience.trim().is_empty() {
        missing.push("target_audience");
    }
    if form.goal.trim().is_empty() {
        missing.push("goal");
    }
    missing
}

fn format_missing(missing: &[&str]) -> String {
    format!("Missing required fields: {}", missing.join(", "))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn lead_backup_row<'a>(lead: &'a NewLead, persisted: bool) -> BackupRow<'a> {
    BackupRow {
        form: "lead",
        name: &lead.name,
        email: lead.email.as_str(),
        company: lead.company.as_deref(),
        linkedin_url: lead.linkedin_url.as_deref(),
        target_audience: None,
        goal: None,
        challenge: None,
        consent: lead.consent,
        source: Some(&lead.source),
        client_ip: lead.client_ip.as_deref(),
        user_agent: lead.user_agent.as_deref(),
        persisted,
        submitted_at: Utc::now(),
    }
}

fn audit_backup_row<'a>(audit: &'a NewAuditRequest, persisted: bool) -> BackupRow<'a> {
    BackupRow {
        form: "audit",
        name: &audit.name,
        email: audit.email.as_str(),
        company: audit.company.as_deref(),
        linkedin_url: Some(&audit.linkedin_url),
        target_audience: Some(&audit.target_audience),
        goal: Some(&audit.goal),
        challenge: audit.challenge.as_deref(),
        consent: audit.consent,
        source: None,
        client_ip: audit.client_ip.as_deref(),
        user_agent: audit.user_agent.as_deref(),
        persisted,
        submitted_at: Utc::now(),
    }
}
