use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use super::{
    dto::{AssessmentRequest, AssessmentResponse},
    services::assess,
};
use crate::{auth::MaybeSession, error::ApiError, state::AppState};

pub fn assessment_routes() -> Router<AppState> {
    Router::new().route("/assessments", post(create_assessment))
}

/// POST /assessments. Works signed out; results are only kept for signed-in users.
#[instrument(skip(state, session, payload))]
pub async fn create_assessment(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Json(payload): Json<AssessmentRequest>,
) -> Result<Json<AssessmentResponse>, ApiError> {
    let response = assess(&state, session.as_ref(), &payload).await?;
    Ok(Json(response))
}
