mod dto;
pub mod handlers;
pub mod input;
pub mod model;
pub mod recommend;
pub mod scoring;
mod services;
pub mod validation;

pub use dto::{AssessmentRequest, AssessmentResponse, NotificationStatus};
pub use input::{AssessmentInput, FEATURE_NAMES};
pub use model::{BurnoutModel, FeatureRow, LinearModel};
pub use recommend::{recommend, RiskTier};
pub use scoring::{ScoringEngine, ScoringError};
pub use services::assess;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::assessment_routes()
}
