//! Lead domain types.

use chrono::{DateTime, Utc};

use leadlight_core::{Email, LeadId};

/// A captured lead (domain type).
///
/// One row per email address. Resubmitting the form with the same email
/// refreshes the row in place instead of creating a duplicate.
#[derive(Debug, Clone)]
pub struct Lead {
    /// Unique lead ID.
    pub id: LeadId,
    /// Name as entered on the form.
    pub name: String,
    /// Email address (lowercased).
    pub email: Email,
    /// Company, if provided.
    pub company: Option<String>,
    /// `LinkedIn` profile URL, if provided.
    pub linkedin_url: Option<String>,
    /// Whether the submitter agreed to be contacted.
    pub consent: bool,
    /// Which form captured the lead (e.g., `lead_magnet`).
    pub source: String,
    /// Client IP recorded at submission time.
    pub client_ip: Option<String>,
    /// User agent recorded at submission time.
    pub user_agent: Option<String>,
    /// When the lead was first captured.
    pub created_at: DateTime<Utc>,
    /// When the lead was last refreshed by a resubmission.
    pub updated_at: DateTime<Utc>,
}

/// Values for creating or refreshing a lead.
#[derive(Debug, Clone)]
pub struct NewLead {
    /// Name as entered on the form.
    pub name: String,
    /// Validated email address.
    pub email: Email,
    /// Company, if provided.
    pub company: Option<String>,
    /// `LinkedIn` profile URL, if provided.
    pub linkedin_url: Option<String>,
    /// Whether the submitter agreed to be contacted.
    pub consent: bool,
    /// Which form captured the lead.
    pub source: String,
    /// Client IP of the submitter.
    pub client_ip: Option<String>,
    /// User agent of the submitter.
    pub user_agent: Option<String>,
}
