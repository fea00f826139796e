use std::{path::Path, sync::Arc};

use tracing::{debug, error};

use super::{
    input::AssessmentInput,
    model::{BurnoutModel, FeatureRow, LinearModel},
    validation::validate_input,
};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("invalid input: {}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error("no model is loaded")]
    Unavailable,
    #[error("model failed: {0}")]
    Model(#[source] anyhow::Error),
}

/// Validates habit inputs, runs the model and clamps its output.
#[derive(Clone)]
pub struct ScoringEngine {
    model: Option<Arc<dyn BurnoutModel>>,
}

impl ScoringEngine {
    pub fn new(model: Arc<dyn BurnoutModel>) -> Self {
        Self { model: Some(model) }
    }

    /// An engine that refuses every request; used when no model could be loaded.
    pub fn disabled() -> Self {
        Self { model: None }
    }

    /// Load the linear model artifact. Failure is logged here, once, and
    /// leaves the engine disabled.
    pub fn from_artifact(path: &Path) -> Self {
        match LinearModel::load(path) {
            Ok(model) => Self::new(Arc::new(model)),
            Err(e) => {
                error!(error = %format!("{e:#}"), path = %path.display(), "model unavailable; scoring disabled");
                Self::disabled()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn score(&self, input: &AssessmentInput) -> Result<f64, ScoringError> {
        let errors = validate_input(input);
        if !errors.is_empty() {
            return Err(ScoringError::Invalid(errors));
        }

        let model = self.model.as_ref().ok_or(ScoringError::Unavailable)?;
        let row = FeatureRow::from_input(input, model.feature_names()).map_err(ScoringError::Model)?;
        let raw = model.predict(&row).map_err(ScoringError::Model)?;
        if !raw.is_finite() {
            return Err(ScoringError::Model(anyhow::anyhow!("model produced {raw}")));
        }

        let score = clamp_score(raw);
        debug!(raw, score, "prediction");
        Ok(score)
    }
}

pub fn clamp_score(raw: f64) -> f64 {
    raw.clamp(MIN_SCORE, MAX_SCORE)
}
