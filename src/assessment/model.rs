use std::{collections::HashSet, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use super::input::{AssessmentInput, FEATURE_NAMES};

/// One row of named features, in the order the model expects them.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureRow {
    /// Build a row by looking each requested column up by name.
    pub fn from_input(input: &AssessmentInput, order: &[String]) -> anyhow::Result<Self> {
        let values = order
            .iter()
            .map(|name| {
                input
                    .feature(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown feature {name}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            names: order.to_vec(),
            values,
        })
    }
}

/// A pre-trained regressor: one row of habit features in, one raw score out.
pub trait BurnoutModel: Send + Sync {
    /// Column order the model was trained on.
    fn feature_names(&self) -> &[String];

    fn predict(&self, row: &FeatureRow) -> anyhow::Result<f64>;
}

/// Linear regressor serialized as JSON:
/// `{ "feature_names": [...], "coefficients": [...], "intercept": 0.0 }`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn new(feature_names: Vec<String>, coefficients: Vec<f64>, intercept: f64) -> anyhow::Result<Self> {
        let model = Self {
            feature_names,
            coefficients,
            intercept,
        };
        model.check()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read model artifact {}", path.display()))?;
        let model: LinearModel = serde_json::from_str(&raw)
            .with_context(|| format!("parse model artifact {}", path.display()))?;
        model.check()?;
        info!(path = %path.display(), features = model.feature_names.len(), "model loaded");
        Ok(model)
    }

    fn check(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.feature_names.len() == self.coefficients.len(),
            "model has {} feature names but {} coefficients",
            self.feature_names.len(),
            self.coefficients.len()
        );
        let declared: HashSet<&str> = self.feature_names.iter().map(String::as_str).collect();
        let expected: HashSet<&str> = FEATURE_NAMES.into_iter().collect();
        anyhow::ensure!(
            declared == expected && self.feature_names.len() == FEATURE_NAMES.len(),
            "model features {:?} do not match the habit fields",
            self.feature_names
        );
        anyhow::ensure!(
            self.intercept.is_finite() && self.coefficients.iter().all(|c| c.is_finite()),
            "model parameters must be finite"
        );
        Ok(())
    }
}

impl BurnoutModel for LinearModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, row: &FeatureRow) -> anyhow::Result<f64> {
        anyhow::ensure!(
            row.names == self.feature_names,
            "feature row does not match the model's column order"
        );
        let dot: f64 = row
            .values
            .iter()
            .zip(&self.coefficients)
            .map(|(x, w)| x * w)
            .sum();
        Ok(self.intercept + dot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::input::sample_input;
    use std::io::Write;

    fn names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn predicts_intercept_plus_weighted_sum() {
        let model = LinearModel::new(names(), vec![2.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0], 5.0).unwrap();
        let row = FeatureRow::from_input(&sample_input(), model.feature_names()).unwrap();
        // 5 + 2*8 - 1*7 + 10*3
        assert_eq!(model.predict(&row).unwrap(), 44.0);
    }

    #[test]
    fn row_follows_artifact_order_not_struct_order() {
        let mut order = names();
        order.reverse();
        let row = FeatureRow::from_input(&sample_input(), &order).unwrap();
        assert_eq!(row.names[0], "stress_level");
        assert_eq!(row.values, vec![3.0, 2.0, 5.0, 4.0, 2.0, 30.0, 7.0, 8.0]);

        let mut weights = vec![0.0; 8];
        weights[0] = 1.0; // stress_level
        let model = LinearModel::new(order, weights, 0.0).unwrap();
        let row = FeatureRow::from_input(&sample_input(), model.feature_names()).unwrap();
        assert_eq!(model.predict(&row).unwrap(), 3.0);
    }

    #[test]
    fn rejects_mismatched_artifacts() {
        assert!(LinearModel::new(names(), vec![1.0; 7], 0.0).is_err());

        let mut wrong = names();
        wrong[0] = "shoe_size".into();
        assert!(LinearModel::new(wrong, vec![1.0; 8], 0.0).is_err());

        let mut duplicated = names();
        duplicated[1] = duplicated[0].clone();
        assert!(LinearModel::new(duplicated, vec![1.0; 8], 0.0).is_err());
    }

    #[test]
    fn predict_rejects_rows_in_another_order() {
        let model = LinearModel::new(names(), vec![1.0; 8], 0.0).unwrap();
        let mut order = names();
        order.swap(0, 1);
        let row = FeatureRow::from_input(&sample_input(), &order).unwrap();
        assert!(model.predict(&row).is_err());
    }

    #[test]
    fn load_reads_a_json_artifact() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let artifact = serde_json::json!({
            "feature_names": FEATURE_NAMES,
            "coefficients": [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            "intercept": 1.5,
        });
        write!(file, "{artifact}").unwrap();

        let model = LinearModel::load(file.path()).expect("load");
        let row = FeatureRow::from_input(&sample_input(), model.feature_names()).unwrap();
        assert_eq!(model.predict(&row).unwrap(), 9.5);
    }

    #[test]
    fn load_reports_missing_and_garbled_files() {
        let err = LinearModel::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("read model artifact"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = LinearModel::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("parse model artifact"));
    }

    #[test]
    fn shipped_artifact_is_loadable() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("burnout_model.json");
        let model = LinearModel::load(&path).expect("bundled model");
        let row = FeatureRow::from_input(&sample_input(), model.feature_names()).unwrap();
        assert!(model.predict(&row).unwrap().is_finite());
    }
}
