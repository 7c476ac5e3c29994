use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::data::models::PlayerProfile;
use crate::engine::stat_claim::Metric;
use crate::engine::{Engine, EstimateRequest};

/// Build the Axum router for the JSON API.
pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/estimate", post(estimate_handler))
        .route("/api/career-outlook", post(career_outlook_handler))
        .route("/api/stat-projection", post(stat_projection_handler))
        .route("/api/milestone", post(milestone_handler))
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

/// GET /api/health
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// POST /api/estimate
async fn estimate_handler(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<EstimateRequest>,
) -> Response {
    debug!("Estimate request: {}", req.prompt);
    match engine.estimate(&req) {
        Some(estimate) => Json(estimate).into_response(),
        None => Json(json!({ "status": "no_match" })).into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CareerOutlookRequest {
    profile: PlayerProfile,
    #[serde(default)]
    as_of_date: Option<NaiveDate>,
}

/// POST /api/career-outlook
async fn career_outlook_handler(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<CareerOutlookRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    require_name(&req.profile)?;
    Ok(Json(engine.career_outlook(&req.profile, None, req.as_of_date)))
}

fn require_name(profile: &PlayerProfile) -> Result<(), (StatusCode, String)> {
    if profile.name.trim().is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "profile.name is required".to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatProjectionRequest {
    profile: PlayerProfile,
    metric: Metric,
    threshold: f64,
    #[serde(default = "default_projection_years")]
    years: u32,
    #[serde(default)]
    as_of_date: Option<NaiveDate>,
}

fn default_projection_years() -> u32 {
    5
}

/// POST /api/stat-projection
async fn stat_projection_handler(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<StatProjectionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    require_name(&req.profile)?;
    if !(req.threshold.is_finite() && req.threshold > 0.0) {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "threshold must be positive".to_string()));
    }
    Ok(Json(engine.stat_season_projection(
        &req.profile,
        req.metric,
        req.threshold,
        req.years,
        req.as_of_date,
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MilestoneRequest {
    profile: PlayerProfile,
    metric: Metric,
    target: f64,
    #[serde(default)]
    current: Option<f64>,
    #[serde(default)]
    as_of_date: Option<NaiveDate>,
}

/// POST /api/milestone
async fn milestone_handler(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<MilestoneRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    require_name(&req.profile)?;
    Ok(Json(engine.milestone_outlook(
        &req.profile,
        req.metric,
        req.target,
        req.current,
        req.as_of_date,
    )))
}
