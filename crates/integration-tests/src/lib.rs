//! Integration tests for Leadlight.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply the schema
//! docker compose up -d postgres
//! cargo run -p leadlight-cli -- migrate
//!
//! # Start the site
//! cargo run -p leadlight-site
//!
//! # Run the ignored live-server tests
//! cargo test -p leadlight-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `site_pages` - Public page and health endpoint tests
//! - `site_submissions` - Lead magnet and profile audit form tests
//! - `site_auth` - Registration, login, and admin guard tests
//!
//! # Environment Variables
//!
//! - `SITE_BASE_URL` - Base URL of the running site (default `http://localhost:3000`)
//! - `SITE_DATABASE_URL` / `DATABASE_URL` - Connection string for tests that
//!   verify database state directly
