use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{RecommendationRequest, RecommendationResponse},
};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let max_inputs = state.engine.settings().max_input_slugs;
    if request.movie_slugs.len() > max_inputs {
        return Err(AppError::InvalidInput(format!(
            "At most {} movie slugs may be submitted",
            max_inputs
        )));
    }

    tracing::info!(
        request_id = %request_id,
        seeds = request.movie_slugs.len(),
        "Processing recommendation request"
    );

    let recommendations = state
        .engine
        .generate_recommendations(&request.movie_slugs)
        .await
        .map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Recommendation request failed");
            e
        })?;

    tracing::info!(
        request_id = %request_id,
        returned = recommendations.len(),
        "Recommendation request completed"
    );

    Ok(Json(RecommendationResponse { recommendations }))
}
