//! Authentication route handlers.
//!
//! Handles login, registration, logout, and the password reset flow.
//! Form posts redirect back with short error codes in the query string;
//! the page handlers translate those codes into messages for display.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use leadlight_core::DeliveryStatus;

use crate::db::EmailLogRepository;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, NewEmailRecord};
use crate::services::auth::{AuthError, AuthService};
use crate::services::email::{PASSWORD_RESET_SUBJECT, WELCOME_SUBJECT, templates};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Query parameters for the reset password page.
#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    pub token: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub error: Option<String>,
    pub token: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(login_error_message),
        success: query.success.as_deref().map(login_success_message),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    match auth.login(&form.email, &form.password).await {
        Ok(user) => {
            let current = CurrentUser::from(&user);
            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }

            set_sentry_user(&user.id, Some(user.email.as_str()));
            Redirect::to("/dashboard").into_response()
        }
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            tracing::warn!("Login failed: invalid credentials");
            Redirect::to("/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            Redirect::to("/login?error=internal").into_response()
        }
    }
}

fn login_error_message(code: &str) -> String {
    match code {
        "credentials" => "Invalid email or password.".to_string(),
        "session" => "Could not start your session. Please try again.".to_string(),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}

fn login_success_message(code: &str) -> String {
    match code {
        "password_reset" => "Your password has been reset. You can now log in.".to_string(),
        _ => "Success.".to_string(),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: query.error.as_deref().map(register_error_message),
    }
}

/// Handle registration form submission.
///
/// Creates the account, logs the new user in, and sends a welcome email
/// (best effort).
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/register?error=password_mismatch").into_response();
    }

    let auth = AuthService::new(state.pool());

    let user = match auth.register(&form.email, &form.name, &form.password).await {
        Ok(user) => user,
        Err(AuthError::UserAlreadyExists) => {
            return Redirect::to("/register?error=email_taken").into_response();
        }
        Err(AuthError::WeakPassword(_)) => {
            return Redirect::to("/register?error=password_too_short").into_response();
        }
        Err(AuthError::InvalidEmail(_)) => {
            return Redirect::to("/register?error=invalid_email").into_response();
        }
        Err(AuthError::EmptyName) => {
            return Redirect::to("/register?error=name_required").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Registration failed");
            return Redirect::to("/register?error=failed").into_response();
        }
    };

    let current = CurrentUser::from(&user);
    if let Err(e) = set_current_user(&session, &current).await {
        tracing::error!("Failed to set session after registration: {}", e);
        return Redirect::to("/login?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));

    // Welcome email is best effort; the account exists either way
    let dashboard_url = format!(
        "{}/dashboard",
        state.config().base_url.trim_end_matches('/')
    );
    let send_result = state
        .email()
        .send_welcome(user.email.as_str(), &user.name, &dashboard_url)
        .await;
    if let Err(e) = &send_result {
        tracing::warn!(to = %user.email, error = %e, "Failed to send welcome email");
    }
    record_send(
        &state,
        user.email.as_str(),
        WELCOME_SUBJECT,
        templates::WELCOME,
        send_result.err().map(|e| e.to_string()),
    )
    .await;

    Redirect::to("/dashboard").into_response()
}

fn register_error_message(code: &str) -> String {
    match code {
        "password_mismatch" => "Passwords do not match.".to_string(),
        "password_too_short" => "Password must be at least 8 characters.".to_string(),
        "email_taken" => "An account with this email already exists.".to_string(),
        "invalid_email" => "Please enter a valid email address.".to_string(),
        "name_required" => "Please enter your name.".to_string(),
        _ => "Registration failed. Please try again.".to_string(),
    }
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    ForgotPasswordTemplate {
        error: query.error.as_deref().map(forgot_error_message),
        success: query
            .success
            .as_deref()
            .map(|_| "If that email is registered, a reset link is on its way.".to_string()),
    }
}

/// Handle forgot password form submission.
///
/// Always redirects to the success state to prevent email enumeration.
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    match auth.start_password_reset(&form.email).await {
        Ok(Some(reset)) => {
            let reset_url = format!(
                "{}/reset-password?token={}",
                state.config().base_url.trim_end_matches('/'),
                reset.token
            );
            let send_result = state
                .email()
                .send_password_reset(reset.user.email.as_str(), &reset.user.name, &reset_url)
                .await;
            if let Err(e) = &send_result {
                tracing::error!(to = %reset.user.email, error = %e, "Failed to send password reset email");
            }
            record_send(
                &state,
                reset.user.email.as_str(),
                PASSWORD_RESET_SUBJECT,
                templates::PASSWORD_RESET,
                send_result.err().map(|e| e.to_string()),
            )
            .await;
        }
        Ok(None) => {
            tracing::debug!("Password reset requested for unregistered email");
        }
        Err(e) => {
            // Still show success to prevent email enumeration
            tracing::warn!(error = %e, "Password reset request failed");
        }
    }

    Redirect::to("/forgot-password?success=email_sent").into_response()
}

fn forgot_error_message(code: &str) -> String {
    match code {
        "invalid_reset_link" => "That reset link is invalid or has expired.".to_string(),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}

/// Display the reset password page.
///
/// Called when the user clicks the link in the reset email.
pub async fn reset_password_page(Query(query): Query<ResetQuery>) -> Response {
    match query.token {
        Some(token) => ResetPasswordTemplate {
            error: query.error.as_deref().map(reset_error_message),
            token,
        }
        .into_response(),
        None => Redirect::to("/forgot-password?error=invalid_reset_link").into_response(),
    }
}

/// Handle reset password form submission.
///
/// Consumes the token, updates the password, and logs the user in.
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    if form.password != form.password_confirm {
        let redirect_url = format!(
            "/reset-password?token={}&error=password_mismatch",
            form.token
        );
        return Redirect::to(&redirect_url).into_response();
    }

    let auth = AuthService::new(state.pool());

    match auth
        .complete_password_reset(&form.token, &form.password)
        .await
    {
        Ok(user) => {
            let current = CurrentUser::from(&user);
            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session after password reset: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }

            set_sentry_user(&user.id, Some(user.email.as_str()));
            Redirect::to("/dashboard").into_response()
        }
        Err(AuthError::InvalidResetToken) => {
            Redirect::to("/forgot-password?error=invalid_reset_link").into_response()
        }
        Err(AuthError::WeakPassword(_)) => {
            let redirect_url = format!(
                "/reset-password?token={}&error=password_too_short",
                form.token
            );
            Redirect::to(&redirect_url).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Password reset failed");
            let redirect_url = format!("/reset-password?token={}&error=failed", form.token);
            Redirect::to(&redirect_url).into_response()
        }
    }
}

fn reset_error_message(code: &str) -> String {
    match code {
        "password_mismatch" => "Passwords do not match.".to_string(),
        "password_too_short" => "Password must be at least 8 characters.".to_string(),
        _ => "Could not reset your password. Please try again.".to_string(),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Clears the login and destroys the whole session.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    clear_sentry_user();

    Redirect::to("/").into_response()
}

// =============================================================================
// Helpers
// =============================================================================

/// Record a send attempt in the email log (best effort).
async fn record_send(
    state: &AppState,
    recipient: &str,
    subject: &str,
    template: &str,
    error: Option<String>,
) {
    let record = NewEmailRecord {
        lead_id: None,
        recipient: recipient.to_string(),
        subject: subject.to_string(),
        template: template.to_string(),
        status: if error.is_none() {
            DeliveryStatus::Sent
        } else {
            DeliveryStatus::Failed
        },
        error,
    };

    if let Err(e) = EmailLogRepository::new(state.pool()).record(&record).await {
        tracing::error!(error = %e, "Failed to record email log entry");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_messages() {
        assert_eq!(login_error_message("credentials"), "Invalid email or password.");
        assert!(login_error_message("whatever").contains("Something went wrong"));
    }

    #[test]
    fn test_register_error_messages_cover_codes() {
        for code in [
            "password_mismatch",
            "password_too_short",
            "email_taken",
            "invalid_email",
            "name_required",
            "unknown",
        ] {
            assert!(!register_error_message(code).is_empty());
        }
    }

    #[test]
    fn test_reset_error_messages() {
        assert_eq!(reset_error_message("password_mismatch"), "Passwords do not match.");
        assert!(reset_error_message("other").contains("Could not reset"));
    }
}
