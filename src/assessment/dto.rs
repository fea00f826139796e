use serde::{Deserialize, Serialize};

use super::{input::AssessmentInput, recommend::RiskTier};

/// Request body for `POST /assessments`.
#[derive(Debug, Deserialize)]
pub struct AssessmentRequest {
    pub habits: AssessmentInput,
    /// Email the result when it lands in the high-risk band. Requires login.
    #[serde(default)]
    pub notify_by_email: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    NotRequested,
    NotEligible,
    Sent,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub score: f64,
    pub tier: RiskTier,
    pub recommendations: Vec<&'static str>,
    pub saved: bool,
    pub history_id: Option<i64>,
    pub notification: NotificationStatus,
    /// Non-fatal problems the user should be told about.
    pub messages: Vec<String>,
}
