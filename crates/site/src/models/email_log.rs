//! Email log domain types.

use chrono::{DateTime, Utc};

use leadlight_core::{DeliveryStatus, EmailRecordId, LeadId};

/// A logged email send attempt (domain type).
///
/// The log is append-only: one row per attempt, success or failure. The
/// recipient is kept as the raw string that was attempted, not re-parsed.
#[derive(Debug, Clone)]
pub struct EmailRecord {
    /// Unique record ID.
    pub id: EmailRecordId,
    /// Lead this email relates to, if any. Weak reference: the row
    /// survives lead deletion.
    pub lead_id: Option<LeadId>,
    /// Address the send was attempted to.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Template name (e.g., `checklist`, `audit_received`).
    pub template: String,
    /// Whether the SMTP handoff succeeded.
    pub status: DeliveryStatus,
    /// Transport error message when the send failed.
    pub error: Option<String>,
    /// When the attempt was made.
    pub sent_at: DateTime<Utc>,
}

/// Values for logging a send attempt.
#[derive(Debug, Clone)]
pub struct NewEmailRecord {
    /// Lead this email relates to, if any.
    pub lead_id: Option<LeadId>,
    /// Address the send was attempted to.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Template name.
    pub template: String,
    /// Whether the SMTP handoff succeeded.
    pub status: DeliveryStatus,
    /// Transport error message when the send failed.
    pub error: Option<String>,
}
