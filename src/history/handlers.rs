use axum::{extract::State, routing::get, Json, Router};
use tracing::{error, instrument};

use super::repo::{get_history, list_entries, HistoryEntry, HistoryPoint};
use crate::{auth::Session, error::ApiError, state::AppState};

const HISTORY_UNAVAILABLE: &str = "Could not load your history";

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(trend))
        .route("/history/entries", get(entries))
}

#[instrument(skip(state, session), fields(user_id = session.user_id))]
pub async fn trend(State(state): State<AppState>, session: Session) -> Result<Json<Vec<HistoryPoint>>, ApiError> {
    let points = get_history(&state.db, session.user_id).await.map_err(|e| {
        error!(error = %e, "get_history failed");
        ApiError::ServiceUnavailable(HISTORY_UNAVAILABLE.into())
    })?;
    Ok(Json(points))
}

#[instrument(skip(state, session), fields(user_id = session.user_id))]
pub async fn entries(State(state): State<AppState>, session: Session) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let rows = list_entries(&state.db, session.user_id).await.map_err(|e| {
        error!(error = %e, "list_entries failed");
        ApiError::ServiceUnavailable(HISTORY_UNAVAILABLE.into())
    })?;
    Ok(Json(rows))
}
