//! Marketing page and member page route handlers.
//!
//! Public pages render with an optional logged-in user for the navbar.
//! `/dashboard` and `/profile` require a session and redirect to the login
//! page without one.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};

use crate::db::UserRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, User};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub current_user: Option<CurrentUser>,
}

/// Resources page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/resources.html")]
pub struct ResourcesTemplate {
    pub current_user: Option<CurrentUser>,
}

/// Profile audit landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/profile_audit.html")]
pub struct ProfileAuditTemplate {
    pub current_user: Option<CurrentUser>,
}

/// Member dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate {
    pub current_user: Option<CurrentUser>,
    pub user: CurrentUser,
}

/// Account profile template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<CurrentUser>,
    pub user: User,
}

// =============================================================================
// Public Pages
// =============================================================================

/// Display the home page.
pub async fn home(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    HomeTemplate { current_user }
}

/// Display the contact page.
pub async fn contact(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    ContactTemplate { current_user }
}

/// Display the resources page with the checklist signup form.
pub async fn resources(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    ResourcesTemplate { current_user }
}

/// Display the profile audit landing page with the request form.
pub async fn profile_audit(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    ProfileAuditTemplate { current_user }
}

// =============================================================================
// Member Pages
// =============================================================================

/// Display the member dashboard.
pub async fn dashboard(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    DashboardTemplate {
        current_user: Some(user.clone()),
        user,
    }
}

/// Display the account profile.
///
/// Reads the full user record so the page reflects the database, not the
/// session snapshot. A stale session for a deleted user is logged out.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Response, AppError> {
    let users = UserRepository::new(state.pool());

    let Some(user) = users.get_by_id(current.id).await? else {
        tracing::warn!(user_id = %current.id, "Session refers to a missing user, logging out");
        return Ok(Redirect::to("/logout").into_response());
    };

    Ok(ProfileTemplate {
        current_user: Some(CurrentUser::from(&user)),
        user,
    }
    .into_response())
}
