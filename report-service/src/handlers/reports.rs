//! Report generation and enhancement endpoints.
//!
//! Both endpoints check their preconditions in a fixed order: preflight
//! and method are handled by the router, then the credential check, then
//! body parsing. Handlers take the raw body text so the credential check
//! runs before any JSON is parsed.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::de::DeserializeOwned;
use service_core::error::AppError;

use crate::models::{EnhanceReportRequest, GenerateReportRequest};
use crate::services::providers::ChatRequest;
use crate::services::report;
use crate::startup::AppState;

const COMPLETION_TEMPERATURE: f32 = 0.7;
const GENERATE_MAX_TOKENS: u32 = 2000;
const ENHANCE_MAX_TOKENS: u32 = 4000;

/// CORS preflight response shared by the report routes.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Uniform 405 body for non-POST methods on the report routes.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Generate a fresh strategic report from raw metrics.
pub async fn generate_report(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    ensure_api_key(&state)?;

    let payload: GenerateReportRequest = parse_body(&body)?;
    let report_data = payload
        .report_data
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing report data")))?;

    let request = ChatRequest {
        system: report::GENERATE_SYSTEM_PROMPT.to_string(),
        user: report::generate_prompt(&report_data),
        temperature: COMPLETION_TEMPERATURE,
        max_tokens: GENERATE_MAX_TOKENS,
    };

    let analysis = state.provider.complete(&request).await.map_err(|e| {
        AppError::InternalError(anyhow::Error::new(e).context("Failed to generate report"))
    })?;

    let generated = report::assemble_report(&analysis).map_err(|e| {
        AppError::InternalError(anyhow::Error::new(e).context("Failed to generate report"))
    })?;

    tracing::info!(sections = generated.sections.len(), "Generated report");

    Ok((StatusCode::OK, Json(generated)))
}

/// Enhance an existing report with per-section insights and a trailing
/// recommendations section.
pub async fn enhance_report(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    ensure_api_key(&state)?;

    let payload: EnhanceReportRequest = parse_body(&body)?;
    let (initial_report, metrics) = match (payload.initial_report, payload.metrics) {
        (Some(initial_report), Some(metrics)) => (initial_report, metrics),
        _ => return Err(AppError::BadRequest(anyhow::anyhow!("Missing required data"))),
    };

    let request = ChatRequest {
        system: report::ENHANCE_SYSTEM_PROMPT.to_string(),
        user: report::enhance_prompt(&initial_report, &metrics),
        temperature: COMPLETION_TEMPERATURE,
        max_tokens: ENHANCE_MAX_TOKENS,
    };

    let analysis = state.provider.complete(&request).await.map_err(|e| {
        AppError::InternalError(anyhow::Error::new(e).context("Failed to enhance report"))
    })?;

    let enhanced = report::enhance_sections(&initial_report, &analysis);

    tracing::info!(sections = enhanced.len(), "Enhanced report");

    Ok((StatusCode::OK, Json(enhanced)))
}

/// The credential precondition comes before any body parsing: a request
/// with a malformed body and no configured key must still fail 500.
fn ensure_api_key(state: &AppState) -> Result<(), AppError> {
    if state.config.openai.api_key.is_empty() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "OpenAI API key is not configured"
        )));
    }
    Ok(())
}

/// Parse a request body the way the platform delivered it: an absent or
/// empty body counts as an empty JSON object, anything else must be
/// valid JSON.
fn parse_body<T: DeserializeOwned + Default>(body: &str) -> Result<T, AppError> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body)
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid JSON body: {}", e)))
}
