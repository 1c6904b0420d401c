use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::fact::FactResponse;
use crate::services::errors::DataUnavailable;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_facts))
}

async fn list_facts(State(state): State<AppState>) -> Result<Json<Vec<FactResponse>>, ApiError> {
    let facts = repositories::facts::list_newest_first(state.db())
        .await
        .map_err(|err| DataUnavailable::new("facts", err))?;

    Ok(Json(facts.into_iter().map(FactResponse::from).collect()))
}
