//! Tabular estimator backend.
//!
//! Wraps a serialized standard-scaler + logistic-regression model over
//! the full Cleveland-13 schema. The artifact answers the positive-class
//! probability directly; there is no separate score-aggregation stage.

use std::path::Path;

use serde::Deserialize;

use crate::adapters::{
    check_version_pin, read_artifact, sigmoid, ModelLoadError, ARTIFACT_FORMAT_VERSION,
};
use crate::domain::schema::CLEVELAND_13;
use crate::domain::{FeatureVector, SchemaId, ShapeError};
use crate::ports::ModelBackend;

/// On-disk artifact layout (JSON).
#[derive(Debug, Deserialize)]
struct EstimatorArtifact {
    format_version: u32,
    model_version: String,
    schema: String,
    feature_names: Vec<String>,
    scaler_mean: Vec<f64>,
    scaler_scale: Vec<f64>,
    coefficients: Vec<f64>,
    intercept: f64,
}

/// Loaded tabular estimator.
///
/// Holds the trained parameters read-only for the process lifetime.
#[derive(Debug)]
pub struct EstimatorBackend {
    model_version: String,
    scaler_mean: Vec<f64>,
    scaler_scale: Vec<f64>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl EstimatorBackend {
    /// Default artifact file name inside the model directory.
    pub const ARTIFACT_FILE: &'static str = "estimator_model.json";

    /// Load and verify an artifact.
    ///
    /// # Errors
    /// Returns `ModelLoadError` if the file is missing or unreadable, is
    /// not valid JSON, declares an unsupported format version or the
    /// wrong schema, fails the optional version pin, or its declared
    /// shape does not match the Cleveland-13 field count.
    pub fn load(path: &Path, required_version: Option<&str>) -> Result<Self, ModelLoadError> {
        let artifact: EstimatorArtifact = read_artifact(path)?;

        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelLoadError::FormatVersion {
                expected: ARTIFACT_FORMAT_VERSION,
                found: artifact.format_version,
            });
        }
        if artifact.schema != SchemaId::Cleveland13.to_string() {
            return Err(ModelLoadError::SchemaMismatch {
                expected: SchemaId::Cleveland13.to_string(),
                found: artifact.schema,
            });
        }
        check_version_pin(&artifact.model_version, required_version)?;

        let width = CLEVELAND_13.numeric_order.len();
        for (name, len) in [
            ("feature_names", artifact.feature_names.len()),
            ("scaler_mean", artifact.scaler_mean.len()),
            ("scaler_scale", artifact.scaler_scale.len()),
            ("coefficients", artifact.coefficients.len()),
        ] {
            if len != width {
                return Err(ModelLoadError::BadShape(format!(
                    "{name} has {len} entries, schema expects {width}"
                )));
            }
        }
        for (declared, expected) in artifact.feature_names.iter().zip(CLEVELAND_13.numeric_order)
        {
            if declared != expected {
                return Err(ModelLoadError::BadShape(format!(
                    "feature '{declared}' where schema orders '{expected}'"
                )));
            }
        }
        if artifact.scaler_scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(ModelLoadError::BadShape(
                "scaler_scale entries must be finite and non-zero".to_string(),
            ));
        }

        tracing::info!(
            path = %path.display(),
            version = %artifact.model_version,
            features = width,
            "Estimator model loaded"
        );

        Ok(Self {
            model_version: artifact.model_version,
            scaler_mean: artifact.scaler_mean,
            scaler_scale: artifact.scaler_scale,
            coefficients: artifact.coefficients,
            intercept: artifact.intercept,
        })
    }
}

impl ModelBackend for EstimatorBackend {
    fn schema(&self) -> SchemaId {
        SchemaId::Cleveland13
    }

    fn backend_name(&self) -> &'static str {
        "estimator"
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }

    fn classify(&self, features: &FeatureVector) -> Result<f64, ShapeError> {
        if !features.categorical.is_empty() {
            return Err(ShapeError::GroupWidth {
                group: "categorical",
                expected: 0,
                got: features.categorical.len(),
            });
        }
        if features.numeric.len() != self.coefficients.len() {
            return Err(ShapeError::GroupWidth {
                group: "numeric",
                expected: self.coefficients.len(),
                got: features.numeric.len(),
            });
        }

        let mut z = self.intercept;
        for i in 0..self.coefficients.len() {
            let scaled = (features.numeric[i] - self.scaler_mean[i]) / self.scaler_scale[i];
            z += self.coefficients[i] * scaled;
        }

        Ok(sigmoid(z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn neutral_artifact_json(intercept: f64) -> String {
        // Identity scaler, zero coefficients: the probability is
        // sigmoid(intercept) regardless of input.
        format!(
            r#"{{
  "format_version": 1,
  "model_version": "0.1.0",
  "schema": "cleveland13",
  "feature_names": ["age","sex","cp","trestbps","chol","fbs","restecg","thalach","exang","oldpeak","slope","ca","thal"],
  "scaler_mean": [0,0,0,0,0,0,0,0,0,0,0,0,0],
  "scaler_scale": [1,1,1,1,1,1,1,1,1,1,1,1,1],
  "coefficients": [0,0,0,0,0,0,0,0,0,0,0,0,0],
  "intercept": {intercept}
}}"#
        )
    }

    fn write_artifact(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(EstimatorBackend::ARTIFACT_FILE);
        let mut file = std::fs::File::create(&path).expect("create artifact");
        file.write_all(contents.as_bytes()).expect("write artifact");
        path
    }

    fn flat_features() -> FeatureVector {
        FeatureVector {
            numeric: vec![55.0, 1.0, 4.0, 138.0, 250.0, 0.0, 1.0, 142.0, 1.0, 2.1, 2.0, 1.0, 7.0],
            categorical: vec![],
        }
    }

    #[test]
    fn test_load_and_classify() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_artifact(&dir, &neutral_artifact_json(2.0));

        let backend = EstimatorBackend::load(&path, None).expect("loads");
        assert_eq!(backend.model_version(), "0.1.0");
        assert_eq!(backend.schema(), SchemaId::Cleveland13);

        let probability = backend.classify(&flat_features()).expect("classifies");
        assert!((probability - 0.8808).abs() < 1e-4);
    }

    #[test]
    fn test_missing_artifact_fails_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = EstimatorBackend::load(&dir.path().join("nope.json"), None).unwrap_err();
        assert!(matches!(err, ModelLoadError::Io { .. }));
    }

    #[test]
    fn test_corrupt_artifact_fails_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_artifact(&dir, "{ definitely not json");
        let err = EstimatorBackend::load(&path, None).unwrap_err();
        assert!(matches!(err, ModelLoadError::Parse { .. }));
    }

    #[test]
    fn test_wrong_width_fails_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let truncated = neutral_artifact_json(0.0).replace(
            r#""coefficients": [0,0,0,0,0,0,0,0,0,0,0,0,0]"#,
            r#""coefficients": [0,0,0]"#,
        );
        let path = write_artifact(&dir, &truncated);
        let err = EstimatorBackend::load(&path, None).unwrap_err();
        assert!(matches!(err, ModelLoadError::BadShape(_)));
    }

    #[test]
    fn test_reordered_features_fail_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let reordered = neutral_artifact_json(0.0).replace(
            r#""age","sex","#,
            r#""sex","age","#,
        );
        let path = write_artifact(&dir, &reordered);
        let err = EstimatorBackend::load(&path, None).unwrap_err();
        assert!(matches!(err, ModelLoadError::BadShape(_)));
    }

    #[test]
    fn test_version_pin_mismatch_fails_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_artifact(&dir, &neutral_artifact_json(0.0));
        let err = EstimatorBackend::load(&path, Some("9.9.9")).unwrap_err();
        assert!(matches!(err, ModelLoadError::VersionPin { .. }));
    }

    #[test]
    fn test_split_vector_is_shape_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_artifact(&dir, &neutral_artifact_json(0.0));
        let backend = EstimatorBackend::load(&path, None).expect("loads");

        let split = FeatureVector {
            numeric: vec![1.0],
            categorical: vec![3, 0, 2, 0, 1],
        };
        let err = backend.classify(&split).unwrap_err();
        assert!(matches!(
            err,
            ShapeError::GroupWidth { group: "categorical", .. }
        ));
    }

    #[test]
    fn test_committed_artifact_loads() {
        let backend =
            EstimatorBackend::load(Path::new("models/estimator_model.json"), None).expect("loads");
        let probability = backend.classify(&flat_features()).expect("classifies");
        assert!((0.0..=1.0).contains(&probability));
    }
}
