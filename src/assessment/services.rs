use tracing::{error, info, warn};

use super::{
    dto::{AssessmentRequest, AssessmentResponse, NotificationStatus},
    recommend::RiskTier,
    scoring::ScoringError,
};
use crate::{
    auth::Session,
    db::PLACEHOLDER_EMAIL,
    error::ApiError,
    history::save_history,
    notify::{result_email, should_notify},
    state::AppState,
};

pub const SAVE_FAILED: &str = "Could not save your results. Please try again.";
pub const EMAIL_FAILED: &str = "Email service temporarily unavailable";

/// Score one submission, then persist and notify for signed-in users.
///
/// Only validation and scoring failures abort the request. Storage and mail
/// problems come back as `messages` next to the score.
pub async fn assess(
    state: &AppState,
    session: Option<&Session>,
    request: &AssessmentRequest,
) -> Result<AssessmentResponse, ApiError> {
    let score = match state.scoring.score(&request.habits) {
        Ok(score) => score,
        Err(ScoringError::Invalid(errors)) => {
            warn!(errors = ?errors, "assessment rejected");
            return Err(ApiError::Validation(errors));
        }
        Err(ScoringError::Unavailable) => return Err(ApiError::unavailable()),
        Err(e @ ScoringError::Model(_)) => {
            error!(error = %e, "prediction failed");
            return Err(ApiError::unavailable());
        }
    };

    let tier = RiskTier::from_score(score);
    let recommendations = tier.recommendations();
    let mut response = AssessmentResponse {
        score,
        tier,
        recommendations: recommendations.to_vec(),
        saved: false,
        history_id: None,
        notification: NotificationStatus::NotRequested,
        messages: Vec::new(),
    };

    let Some(session) = session else {
        if request.notify_by_email {
            response.notification = NotificationStatus::NotEligible;
        }
        return Ok(response);
    };

    match save_history(&state.db, session.user_id, &request.habits, score).await {
        Ok(entry) => {
            info!(user_id = session.user_id, history_id = entry.id, score, "assessment saved");
            response.saved = true;
            response.history_id = Some(entry.id);
        }
        Err(e) => {
            error!(error = %e, user_id = session.user_id, "save_history failed");
            response.messages.push(SAVE_FAILED.into());
        }
    }

    if request.notify_by_email {
        response.notification = if session.email == PLACEHOLDER_EMAIL {
            warn!(user_id = session.user_id, "no email address on file");
            NotificationStatus::NotEligible
        } else if should_notify(score, true) {
            let email = result_email(score, recommendations, state.config.public_url.as_deref());
            match state.mailer.send(&session.email, &email.subject, &email.body).await {
                Ok(()) => NotificationStatus::Sent,
                Err(e) => {
                    warn!(error = %e, user_id = session.user_id, "result email failed");
                    response.messages.push(EMAIL_FAILED.into());
                    NotificationStatus::Failed
                }
            }
        } else {
            NotificationStatus::NotEligible
        };
    }

    Ok(response)
}
