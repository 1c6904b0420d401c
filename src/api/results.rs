use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::core::config::Settings;
use crate::core::state::AppState;
use crate::schemas::results::{ResultsQuery, ResultsResponse};
use crate::services::results;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_results))
}

async fn list_results(
    Query(params): Query<ResultsQuery>,
    State(state): State<AppState>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let limit = resolve_limit(state.settings(), params.limit)?;
    let attempts = results::recent_results(state.db(), limit).await?;

    Ok(Json(ResultsResponse { attempts, limit }))
}

fn resolve_limit(settings: &Settings, requested: Option<i64>) -> Result<i64, ApiError> {
    let max_limit = settings.results().max_limit;
    match requested {
        None => Ok(settings.results().default_limit.min(max_limit)),
        Some(limit) if (1..=max_limit).contains(&limit) => Ok(limit),
        Some(limit) => Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {max_limit}, got {limit}"
        ))),
    }
}
