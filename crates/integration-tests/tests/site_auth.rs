//! Integration tests for registration, login, and the admin guard.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The site running (cargo run -p leadlight-site)
//! - `SITE_DATABASE_URL` set for the tests that verify database state
//!
//! Run with: cargo test -p leadlight-integration-tests -- --ignored

use reqwest::{Client, StatusCode, redirect::Policy};
use secrecy::SecretString;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Base URL for the site (configurable via environment).
fn site_base_url() -> String {
    std::env::var("SITE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A unique email so tests never collide with earlier runs.
fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4())
}

/// A client that keeps session cookies but never follows redirects, so the
/// post/redirect/get flow stays visible to assertions.
fn browser_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// The Location header of a redirect response.
fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Connect to the test database.
async fn db_pool() -> PgPool {
    let url = std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .expect("SITE_DATABASE_URL or DATABASE_URL must be set for database tests");

    leadlight_site::db::create_pool(&url)
        .await
        .expect("Failed to connect to database")
}

/// Register a fresh user and return their email and password. The client
/// holds the session cookie afterwards.
async fn register_user(client: &Client, prefix: &str) -> (String, String) {
    let base_url = site_base_url();
    let email = unique_email(prefix);
    let password = format!("pw-{}", Uuid::new_v4());

    let resp = client
        .post(format!("{base_url}/register"))
        .form(&[
            ("name", "Integration Test"),
            ("email", email.as_str()),
            ("password", password.as_str()),
            ("password_confirm", password.as_str()),
        ])
        .send()
        .await
        .expect("Failed to register");

    assert!(
        resp.status().is_redirection(),
        "Expected redirect, got: {}",
        resp.status()
    );
    assert_eq!(location(&resp), "/dashboard");

    (email, password)
}

// ============================================================================
// Registration & Login Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_register_logs_in_and_reaches_dashboard() {
    let client = browser_client();
    let base_url = site_base_url();

    register_user(&client, "auth-register").await;

    let resp = client
        .get(format!("{base_url}/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Integration Test"));
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_register_password_mismatch_bounces_back() {
    let client = browser_client();
    let base_url = site_base_url();

    let resp = client
        .post(format!("{base_url}/register"))
        .form(&[
            ("name", "Integration Test"),
            ("email", unique_email("auth-mismatch").as_str()),
            ("password", "long-enough-password"),
            ("password_confirm", "a-different-password"),
        ])
        .send()
        .await
        .expect("Failed to register");

    assert!(resp.status().is_redirection());
    assert!(location(&resp).contains("error=password_mismatch"));
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_login_with_wrong_password_leaves_no_session() {
    let base_url = site_base_url();

    // Register with one client, then attack with another
    let (email, _password) = register_user(&browser_client(), "auth-wrong-pw").await;

    let client = browser_client();
    let resp = client
        .post(format!("{base_url}/login"))
        .form(&[("email", email.as_str()), ("password", "wrong-password-123")])
        .send()
        .await
        .expect("Failed to post login");

    assert!(resp.status().is_redirection());
    assert!(
        location(&resp).contains("/login?error=credentials"),
        "Expected credentials error, got: {}",
        location(&resp)
    );

    // The failed login must not have created a session
    let resp = client
        .get(format!("{base_url}/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_login_with_correct_password_succeeds() {
    let base_url = site_base_url();
    let (email, password) = register_user(&browser_client(), "auth-login").await;

    let client = browser_client();
    let resp = client
        .post(format!("{base_url}/login"))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to post login");

    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_dashboard_requires_login() {
    let client = browser_client();
    let base_url = site_base_url();

    let resp = client
        .get(format!("{base_url}/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");

    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_logout_destroys_session() {
    let client = browser_client();
    let base_url = site_base_url();

    register_user(&client, "auth-logout").await;

    let resp = client
        .get(format!("{base_url}/logout"))
        .send()
        .await
        .expect("Failed to get logout");
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/");

    // The session is gone, not just the navbar state
    let resp = client
        .get(format!("{base_url}/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/login");
}

// ============================================================================
// Admin Guard Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_admin_views_require_admin_flag() {
    let client = browser_client();
    let base_url = site_base_url();

    // A freshly registered user is never an admin
    register_user(&client, "auth-non-admin").await;

    for path in ["/admin", "/admin/leads", "/admin/audits", "/admin/emails"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to get admin page");

        assert!(
            resp.status().is_redirection(),
            "Expected redirect for {path}, got: {}",
            resp.status()
        );
        assert_eq!(location(&resp), "/dashboard");
    }
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_admin_mutation_refused_for_non_admin() {
    let base_url = site_base_url();
    let pool = db_pool().await;

    // Create an audit request to target
    let email = unique_email("auth-audit-target");
    let resp = Client::new()
        .post(format!("{base_url}/submit-profile-audit"))
        .json(&json!({
            "name": "Integration Test",
            "email": email,
            "linkedin_url": "https://linkedin.com/in/integration-test",
            "target_audience": "Heads of Sales",
            "goal": "Inbound leads",
        }))
        .send()
        .await
        .expect("Failed to submit audit form");
    assert_eq!(resp.status(), StatusCode::OK);

    let (audit_id,): (i32,) = sqlx::query_as("SELECT id FROM audit_requests WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .expect("Failed to find audit request");

    // A logged-in non-admin tries to change its status
    let client = browser_client();
    register_user(&client, "auth-non-admin-mutation").await;

    let resp = client
        .post(format!("{base_url}/admin/audits/{audit_id}/status"))
        .form(&[("status", "completed")])
        .send()
        .await
        .expect("Failed to post status change");

    assert!(
        resp.status().is_redirection(),
        "Expected redirect, got: {}",
        resp.status()
    );

    // The guard must have stopped the handler before any write
    let (status,): (String,) = sqlx::query_as("SELECT status FROM audit_requests WHERE id = $1")
        .bind(audit_id)
        .fetch_one(&pool)
        .await
        .expect("Failed to re-read audit request");
    assert_eq!(status, "pending", "Non-admin request must not mutate state");
}
