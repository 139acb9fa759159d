//! Profile audit request domain types.

use chrono::{DateTime, Utc};

use leadlight_core::{AuditRequestId, AuditStatus, Email};

/// A profile audit request (domain type).
///
/// Unlike leads, every submission creates a new row so reviewers see the
/// full history of what a prospect asked for.
#[derive(Debug, Clone)]
pub struct AuditRequest {
    /// Unique request ID.
    pub id: AuditRequestId,
    /// Name as entered on the form.
    pub name: String,
    /// Email address (lowercased).
    pub email: Email,
    /// `LinkedIn` profile URL to audit.
    pub linkedin_url: String,
    /// Who the profile is trying to reach.
    pub target_audience: String,
    /// What the requester wants the profile to achieve.
    pub goal: String,
    /// Biggest challenge the requester is facing, if shared.
    pub challenge: Option<String>,
    /// Company, if provided.
    pub company: Option<String>,
    /// Whether the submitter agreed to be contacted.
    pub consent: bool,
    /// Review status, mutated from the admin views.
    pub status: AuditStatus,
    /// Client IP recorded at submission time.
    pub client_ip: Option<String>,
    /// User agent recorded at submission time.
    pub user_agent: Option<String>,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the status was last changed.
    pub updated_at: DateTime<Utc>,
}

/// Values for creating an audit request.
#[derive(Debug, Clone)]
pub struct NewAuditRequest {
    /// Name as entered on the form.
    pub name: String,
    /// Validated email address.
    pub email: Email,
    /// `LinkedIn` profile URL to audit.
    pub linkedin_url: String,
    /// Who the profile is trying to reach.
    pub target_audience: String,
    /// What the requester wants the profile to achieve.
    pub goal: String,
    /// Biggest challenge the requester is facing, if shared.
    pub challenge: Option<String>,
    /// Company, if provided.
    pub company: Option<String>,
    /// Whether the submitter agreed to be contacted.
    pub consent: bool,
    /// Client IP of the submitter.
    pub client_ip: Option<String>,
    /// User agent of the submitter.
    pub user_agent: Option<String>,
}
