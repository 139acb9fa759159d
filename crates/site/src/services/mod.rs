//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Password registration, login, and password resets
//! - `backup` - Append-only CSV fallback log for form submissions
//! - `email` - Transactional email delivery via SMTP
//! - `intake` - Lead capture pipeline behind both public forms

pub mod auth;
pub mod backup;
pub mod email;
pub mod intake;

pub use auth::{AuthError, AuthService, PasswordReset};
pub use backup::{BackupError, BackupLog, BackupRow};
pub use email::{EmailError, EmailService};
pub use intake::{AuditSubmission, IntakeService, LeadMagnetSubmission, SubmitOutcome};
