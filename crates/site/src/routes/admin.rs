//! Admin route handlers.
//!
//! Read-only views over captured leads, audit requests, and the email log,
//! plus the status workflow on audit requests. Every handler takes
//! [`RequireAdmin`], which re-checks the admin flag against the database on
//! each request.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use leadlight_core::{AuditRequestId, AuditStatus};

use crate::db::{
    AuditRepository, EmailLogRepository, LeadRepository, RepositoryError, UserRepository,
};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{AuditRequest, CurrentUser, EmailRecord, Lead};
use crate::state::AppState;

/// How many rows the admin list views show.
const ADMIN_LIST_LIMIT: i64 = 100;

/// Window for the failed-email counter on the dashboard.
const FAILED_EMAIL_WINDOW_DAYS: i64 = 7;

// =============================================================================
// Templates
// =============================================================================

/// Headline counters for the admin dashboard.
#[derive(Debug, Clone)]
pub struct AdminStats {
    pub leads: i64,
    pub pending_audits: i64,
    pub users: i64,
    pub failed_emails: i64,
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub current_user: Option<CurrentUser>,
    pub stats: AdminStats,
}

/// Lead list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/leads.html")]
pub struct AdminLeadsTemplate {
    pub current_user: Option<CurrentUser>,
    pub leads: Vec<Lead>,
}

/// Audit request list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/audits.html")]
pub struct AdminAuditsTemplate {
    pub current_user: Option<CurrentUser>,
    pub audits: Vec<AuditRequest>,
    pub statuses: &'static [AuditStatus],
}

/// Email log template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/emails.html")]
pub struct AdminEmailsTemplate {
    pub current_user: Option<CurrentUser>,
    pub records: Vec<EmailRecord>,
}

// =============================================================================
// Views
// =============================================================================

/// Display the admin dashboard.
#[instrument(skip(state, admin))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let since = Utc::now() - chrono::Duration::days(FAILED_EMAIL_WINDOW_DAYS);

    let stats = AdminStats {
        leads: LeadRepository::new(state.pool()).count().await?,
        pending_audits: AuditRepository::new(state.pool()).count_pending().await?,
        users: UserRepository::new(state.pool()).count().await?,
        failed_emails: EmailLogRepository::new(state.pool())
            .count_failures_since(since)
            .await?,
    };

    Ok(AdminDashboardTemplate {
        current_user: Some(admin),
        stats,
    })
}

/// Display captured leads, most recently touched first.
pub async fn leads(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let leads = LeadRepository::new(state.pool())
        .list_recent(ADMIN_LIST_LIMIT)
        .await?;

    Ok(AdminLeadsTemplate {
        current_user: Some(admin),
        leads,
    })
}

/// Display audit requests with their status controls.
pub async fn audits(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let audits = AuditRepository::new(state.pool())
        .list_recent(ADMIN_LIST_LIMIT)
        .await?;

    Ok(AdminAuditsTemplate {
        current_user: Some(admin),
        audits,
        statuses: &AuditStatus::ALL,
    })
}

/// Display the email send log.
pub async fn emails(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let records = EmailLogRepository::new(state.pool())
        .list_recent(ADMIN_LIST_LIMIT)
        .await?;

    Ok(AdminEmailsTemplate {
        current_user: Some(admin),
        records,
    })
}

// =============================================================================
// Actions
// =============================================================================

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Update the status of an audit request.
///
/// POST /admin/audits/{id}/status
#[instrument(skip(state, _admin), fields(audit_id = id, status = %form.status))]
pub async fn set_audit_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError> {
    let status: AuditStatus = form
        .status
        .parse()
        .map_err(|_| AppError::BadRequest(format!("unknown audit status: {}", form.status)))?;

    let audits = AuditRepository::new(state.pool());
    match audits.set_status(AuditRequestId::new(id), status).await {
        Ok(()) => {}
        Err(RepositoryError::NotFound) => {
            return Err(AppError::NotFound(format!("audit request {id}")));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(audit_id = id, status = %status, "Audit request status updated");

    Ok(Redirect::to("/admin/audits").into_response())
}
