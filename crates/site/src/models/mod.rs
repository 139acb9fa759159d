//! Domain models for the site.
//!
//! These types represent validated domain objects separate from database row
//! types. Repositories parse rows into these and report bad stored data as
//! `RepositoryError::DataCorruption`.

pub mod audit;
pub mod email_log;
pub mod lead;
pub mod session;
pub mod user;

pub use audit::{AuditRequest, NewAuditRequest};
pub use email_log::{EmailRecord, NewEmailRecord};
pub use lead::{Lead, NewLead};
pub use session::CurrentUser;
pub use user::User;
