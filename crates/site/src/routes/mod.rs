//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health                    - Health check (wired up in main)
//! GET  /contact                   - Contact page
//! GET  /resources                 - Resources page with checklist signup
//! GET  /profile-audit             - Profile audit landing page
//!
//! # Lead capture (JSON or url-encoded)
//! POST /submit-lead-magnet        - Checklist signup form
//! POST /submit-profile-audit      - Audit request form
//!
//! # Auth
//! GET  /login                     - Login page
//! POST /login                     - Login action
//! GET  /register                  - Registration page
//! POST /register                  - Registration action
//! GET  /logout                    - Logout action
//! GET  /forgot-password           - Request a reset link
//! POST /forgot-password           - Send the reset link
//! GET  /reset-password            - Reset form (from email link)
//! POST /reset-password            - Apply the new password
//!
//! # Members (requires session)
//! GET  /dashboard                 - Member dashboard
//! GET  /profile                   - Account details
//!
//! # Admin (requires admin, re-checked per request)
//! GET  /admin                     - Counters overview
//! GET  /admin/leads               - Captured leads
//! GET  /admin/audits              - Audit requests
//! POST /admin/audits/{id}/status  - Update an audit request status
//! GET  /admin/emails              - Email send log
//! ```

pub mod admin;
pub mod auth;
pub mod leads;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the public page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/contact", get(pages::contact))
        .route("/resources", get(pages::resources))
        .route("/profile-audit", get(pages::profile_audit))
        .route("/dashboard", get(pages::dashboard))
        .route("/profile", get(pages::profile))
}

/// Create the lead capture routes router.
pub fn lead_routes() -> Router<AppState> {
    Router::new()
        .route("/submit-lead-magnet", post(leads::submit_lead_magnet))
        .route("/submit-profile-audit", post(leads::submit_profile_audit))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/reset-password",
            get(auth::reset_password_page).post(auth::reset_password),
        )
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/leads", get(admin::leads))
        .route("/audits", get(admin::audits))
        .route("/audits/{id}/status", post(admin::set_audit_status))
        .route("/emails", get(admin::emails))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(page_routes())
        .merge(lead_routes())
        .merge(auth_routes())
        .nest("/admin", admin_routes())
}
