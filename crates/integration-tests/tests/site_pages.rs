//! Integration tests for public pages and health endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The site running (cargo run -p leadlight-site)
//!
//! Run with: cargo test -p leadlight-integration-tests -- --ignored

use reqwest::{Client, StatusCode};

/// Base URL for the site (configurable via environment).
fn site_base_url() -> String {
    std::env::var("SITE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_health_endpoint() {
    let base_url = site_base_url();

    let resp = Client::new()
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert_eq!(body, "ok");
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_readiness_endpoint() {
    let base_url = site_base_url();

    let resp = Client::new()
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach readiness endpoint");

    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Public Page Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_public_pages_render() {
    let base_url = site_base_url();
    let client = Client::new();

    for path in ["/", "/contact", "/resources", "/profile-audit"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to get page");

        assert_eq!(resp.status(), StatusCode::OK, "Page {path} did not render");
        let body = resp.text().await.expect("Failed to read response");
        assert!(body.contains("Leadlight"), "Page {path} missing branding");
    }
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_home_page_has_lead_magnet_form() {
    let base_url = site_base_url();

    let resp = Client::new()
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get home page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains(r#"data-endpoint="/submit-lead-magnet""#));
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_audit_page_has_request_form() {
    let base_url = site_base_url();

    let resp = Client::new()
        .get(format!("{base_url}/profile-audit"))
        .send()
        .await
        .expect("Failed to get audit page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains(r#"data-endpoint="/submit-profile-audit""#));
    for field in ["linkedin_url", "target_audience", "goal", "challenge", "consent"] {
        assert!(body.contains(field), "Audit form missing field {field}");
    }
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_auth_pages_render() {
    let base_url = site_base_url();
    let client = Client::new();

    for path in ["/login", "/register", "/forgot-password"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to get auth page");

        assert_eq!(resp.status(), StatusCode::OK, "Page {path} did not render");
        let body = resp.text().await.expect("Failed to read response");
        assert!(body.contains("<form"), "Page {path} missing form");
    }
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_unknown_page_is_404() {
    let base_url = site_base_url();

    let resp = Client::new()
        .get(format!("{base_url}/definitely-not-a-page"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_static_assets_served() {
    let base_url = site_base_url();

    let resp = Client::new()
        .get(format!("{base_url}/static/css/main.css"))
        .send()
        .await
        .expect("Failed to get stylesheet");

    assert_eq!(resp.status(), StatusCode::OK);
}
