//! Integration tests for the lead magnet and profile audit forms.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The site running (cargo run -p leadlight-site)
//! - `SITE_DATABASE_URL` set for the tests that verify database state
//!
//! Run with: cargo test -p leadlight-integration-tests -- --ignored

use leadlight_core::AuditStatus;
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde::Deserialize;
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

/// Connect to the test database and make sure the schema exists.
async fn db_pool() -> PgPool {
    let url = std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .expect("SITE_DATABASE_URL or DATABASE_URL must be set for database tests");

    let pool = leadlight_site::db::create_pool(&url)
        .await
        .expect("Failed to connect to database");
    leadlight_site::db::ensure_schema(&pool)
        .await
        .expect("Failed to ensure schema");
    pool
}

/// Shape of every submit endpoint response.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    success: bool,
    message: String,
}

// ============================================================================
// Lead Magnet Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_lead_magnet_accepts_json() {
    let base_url = site_base_url();

    let resp = Client::new()
        .post(format!("{base_url}/submit-lead-magnet"))
        .json(&json!({
            "name": "Integration Test",
            "email": unique_email("lead-json"),
        }))
        .send()
        .await
        .expect("Failed to submit lead form");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: SubmitResponse = resp.json().await.expect("Failed to parse response");
    assert!(body.success);
    assert!(!body.message.is_empty());
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_lead_magnet_accepts_form_encoding() {
    let base_url = site_base_url();
    let email = unique_email("lead-form");

    // The checkbox submits "consent=true" on the no-JavaScript path
    let resp = Client::new()
        .post(format!("{base_url}/submit-lead-magnet"))
        .form(&[
            ("name", "Integration Test"),
            ("email", email.as_str()),
            ("consent", "true"),
        ])
        .send()
        .await
        .expect("Failed to submit lead form");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: SubmitResponse = resp.json().await.expect("Failed to parse response");
    assert!(body.success);
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_lead_magnet_missing_fields_rejected() {
    let base_url = site_base_url();

    let resp = Client::new()
        .post(format!("{base_url}/submit-lead-magnet"))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to submit empty form");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: SubmitResponse = resp.json().await.expect("Failed to parse response");
    assert!(!body.success);
    assert!(body.message.contains("Missing required fields"));
    assert!(body.message.contains("name"));
    assert!(body.message.contains("email"));
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_lead_magnet_invalid_email_rejected() {
    let base_url = site_base_url();

    let resp = Client::new()
        .post(format!("{base_url}/submit-lead-magnet"))
        .json(&json!({
            "name": "Integration Test",
            "email": "not-an-email",
        }))
        .send()
        .await
        .expect("Failed to submit lead form");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: SubmitResponse = resp.json().await.expect("Failed to parse response");
    assert!(!body.success);
    assert!(body.message.contains("valid email"));
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_lead_magnet_rejected_submission_not_persisted() {
    let base_url = site_base_url();
    let pool = db_pool().await;
    let email = unique_email("lead-rejected");

    // Blank name fails validation, so nothing may reach the database
    let resp = Client::new()
        .post(format!("{base_url}/submit-lead-magnet"))
        .json(&json!({ "name": "", "email": email }))
        .send()
        .await
        .expect("Failed to submit lead form");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leads WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .expect("Failed to count leads");
    assert_eq!(count.0, 0, "Rejected submission must not create a lead row");
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_lead_magnet_persists_one_row() {
    let base_url = site_base_url();
    let pool = db_pool().await;
    let email = unique_email("lead-persist");

    let resp = Client::new()
        .post(format!("{base_url}/submit-lead-magnet"))
        .json(&json!({ "name": "Integration Test", "email": email }))
        .send()
        .await
        .expect("Failed to submit lead form");

    assert_eq!(resp.status(), StatusCode::OK);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leads WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .expect("Failed to count leads");
    assert_eq!(count.0, 1);
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_lead_magnet_upserts_duplicate_email() {
    let base_url = site_base_url();
    let pool = db_pool().await;
    let client = Client::new();
    let email = unique_email("lead-dup");

    for name in ["First Name", "Second Name"] {
        let resp = client
            .post(format!("{base_url}/submit-lead-magnet"))
            .json(&json!({ "name": name, "email": email }))
            .send()
            .await
            .expect("Failed to submit lead form");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM leads WHERE email = $1")
        .bind(&email)
        .fetch_all(&pool)
        .await
        .expect("Failed to fetch leads");

    // Same email twice keeps a single row holding the latest values
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows.first().map(|r| r.0.as_str()),
        Some("Second Name"),
        "Duplicate submission must overwrite the stored name"
    );
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_lead_magnet_records_consent_choice() {
    let base_url = site_base_url();
    let pool = db_pool().await;
    let client = Client::new();

    let opted_out = unique_email("lead-no-consent");
    let resp = client
        .post(format!("{base_url}/submit-lead-magnet"))
        .json(&json!({ "name": "Integration Test", "email": opted_out, "consent": false }))
        .send()
        .await
        .expect("Failed to submit lead form");
    assert_eq!(resp.status(), StatusCode::OK);

    let row: (bool,) = sqlx::query_as("SELECT consent FROM leads WHERE email = $1")
        .bind(&opted_out)
        .fetch_one(&pool)
        .await
        .expect("Failed to fetch lead");
    assert!(!row.0, "Explicit consent=false must be stored");

    // A payload without the field counts as consent
    let defaulted = unique_email("lead-default-consent");
    let resp = client
        .post(format!("{base_url}/submit-lead-magnet"))
        .json(&json!({ "name": "Integration Test", "email": defaulted }))
        .send()
        .await
        .expect("Failed to submit lead form");
    assert_eq!(resp.status(), StatusCode::OK);

    let row: (bool,) = sqlx::query_as("SELECT consent FROM leads WHERE email = $1")
        .bind(&defaulted)
        .fetch_one(&pool)
        .await
        .expect("Failed to fetch lead");
    assert!(row.0, "Missing consent field defaults to true");
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_lead_magnet_logs_send_attempt() {
    let base_url = site_base_url();
    let pool = db_pool().await;
    let email = unique_email("lead-logged");

    let resp = Client::new()
        .post(format!("{base_url}/submit-lead-magnet"))
        .json(&json!({ "name": "Integration Test", "email": email }))
        .send()
        .await
        .expect("Failed to submit lead form");

    assert_eq!(resp.status(), StatusCode::OK);

    // One send attempt is logged whether SMTP succeeded or not
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM email_log WHERE recipient = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .expect("Failed to count email log rows");
    assert_eq!(count.0, 1);
}

// ============================================================================
// Profile Audit Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_audit_request_accepts_json() {
    let base_url = site_base_url();

    let resp = Client::new()
        .post(format!("{base_url}/submit-profile-audit"))
        .json(&json!({
            "name": "Integration Test",
            "email": unique_email("audit-json"),
            "linkedin_url": "https://linkedin.com/in/integration-test",
            "target_audience": "Heads of Sales",
            "goal": "Inbound leads",
        }))
        .send()
        .await
        .expect("Failed to submit audit form");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: SubmitResponse = resp.json().await.expect("Failed to parse response");
    assert!(body.success);
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_audit_request_missing_fields_listed() {
    let base_url = site_base_url();

    let resp = Client::new()
        .post(format!("{base_url}/submit-profile-audit"))
        .json(&json!({ "name": "Integration Test" }))
        .send()
        .await
        .expect("Failed to submit audit form");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: SubmitResponse = resp.json().await.expect("Failed to parse response");
    assert!(!body.success);
    for field in ["email", "linkedin_url", "target_audience", "goal"] {
        assert!(
            body.message.contains(field),
            "Message should name missing field {field}: {}",
            body.message
        );
    }
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_audit_request_persists_pending_row() {
    let base_url = site_base_url();
    let pool = db_pool().await;
    let email = unique_email("audit-persist");

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

    let rows: Vec<(String,)> = sqlx::query_as("SELECT status FROM audit_requests WHERE email = $1")
        .bind(&email)
        .fetch_all(&pool)
        .await
        .expect("Failed to fetch audit requests");

    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows.first().map(|r| r.0.as_str()),
        Some(AuditStatus::Pending.as_str())
    );
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_audit_request_keeps_every_submission() {
    let base_url = site_base_url();
    let pool = db_pool().await;
    let client = Client::new();
    let email = unique_email("audit-repeat");

    // Audit requests are never deduplicated by email
    for _ in 0..2 {
        let resp = client
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
    }

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_requests WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .expect("Failed to count audit requests");
    assert_eq!(count.0, 2);
}
