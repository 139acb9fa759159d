//! Lead capture route handlers.
//!
//! Both public forms post here and get back a small JSON envelope
//! (`{success, message}`). The endpoints accept either a JSON body or a
//! classic url-encoded form so the same routes serve fetch() calls and
//! plain HTML form posts.

use std::net::SocketAddr;

use axum::{
    Form, Json,
    extract::{ConnectInfo, FromRequest, Request, State},
    http::{HeaderMap, StatusCode, header},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;

use crate::services::intake::{
    AuditSubmission, IntakeService, LeadMagnetSubmission, SubmitOutcome,
};
use crate::state::AppState;

/// Response envelope for form submissions.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

/// Extractor that accepts either a JSON or url-encoded form body.
///
/// Dispatches on the `Content-Type` header; anything that is not JSON is
/// handed to the form extractor. Parse failures come back as the same
/// `{success, message}` envelope the handlers use.
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = (StatusCode, Json<SubmitResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            let Json(payload) = Json::<T>::from_request(req, state).await.map_err(|e| {
                tracing::debug!(error = %e, "Rejected malformed JSON submission");
                invalid_body()
            })?;
            return Ok(Self(payload));
        }

        let Form(payload) = Form::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "Rejected malformed form submission");
            invalid_body()
        })?;
        Ok(Self(payload))
    }
}

fn invalid_body() -> (StatusCode, Json<SubmitResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(SubmitResponse {
            success: false,
            message: "Could not read the submitted form.".to_string(),
        }),
    )
}

/// Submit the checklist signup form.
///
/// POST /submit-lead-magnet
#[instrument(skip(state, headers, form), fields(email = %form.email))]
pub async fn submit_lead_magnet(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    JsonOrForm(form): JsonOrForm<LeadMagnetSubmission>,
) -> (StatusCode, Json<SubmitResponse>) {
    let intake = IntakeService::new(
        state.pool(),
        state.email(),
        state.backup(),
        &state.config().intake,
    );

    let outcome = intake
        .submit_lead_magnet(form, Some(client_ip(&headers, peer)), user_agent(&headers))
        .await;

    outcome_response(outcome)
}

/// Submit the profile audit request form.
///
/// POST /submit-profile-audit
#[instrument(skip(state, headers, form), fields(email = %form.email))]
pub async fn submit_profile_audit(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    JsonOrForm(form): JsonOrForm<AuditSubmission>,
) -> (StatusCode, Json<SubmitResponse>) {
    let intake = IntakeService::new(
        state.pool(),
        state.email(),
        state.backup(),
        &state.config().intake,
    );

    let outcome = intake
        .submit_profile_audit(form, Some(client_ip(&headers, peer)), user_agent(&headers))
        .await;

    outcome_response(outcome)
}

fn outcome_response(outcome: SubmitOutcome) -> (StatusCode, Json<SubmitResponse>) {
    let status = match &outcome {
        SubmitOutcome::Accepted { .. } => StatusCode::OK,
        SubmitOutcome::Rejected { .. } => StatusCode::BAD_REQUEST,
        SubmitOutcome::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = SubmitResponse {
        success: outcome.success(),
        message: outcome.message().to_string(),
    };

    (status, Json(body))
}

/// Client IP for lead attribution.
///
/// Prefers the first `X-Forwarded-For` entry when running behind a proxy,
/// otherwise falls back to the peer address.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}
