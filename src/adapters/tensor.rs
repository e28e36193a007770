//! Tensor ensemble backend.
//!
//! Wraps a small ensemble trained on the Compact-6 schema. Each member
//! ("head") combines one weight for the continuous group with embedding
//! tables for the five categorical codes and emits a raw logit. The
//! forward pass keeps the raw `(batch, members)` shape; reduction to a
//! single scalar is a separate, checked step.

use std::path::Path;

use serde::Deserialize;

use crate::adapters::{
    check_version_pin, read_artifact, sigmoid, ModelLoadError, ARTIFACT_FORMAT_VERSION,
};
use crate::domain::schema::COMPACT_6;
use crate::domain::{FeatureVector, SchemaId, ShapeError};
use crate::ports::ModelBackend;

/// On-disk artifact layout (JSON).
#[derive(Debug, Deserialize)]
struct TensorArtifact {
    format_version: u32,
    model_version: String,
    schema: String,
    continuous_dim: usize,
    categorical_cardinalities: Vec<usize>,
    heads: Vec<Head>,
}

/// One ensemble member.
#[derive(Debug, Deserialize)]
struct Head {
    bias: f64,
    continuous_weights: Vec<f64>,
    embeddings: Vec<Vec<f64>>,
}

/// Raw real-valued model output, shape `(batch, members)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScores {
    pub rows: Vec<Vec<f64>>,
}

impl RawScores {
    /// Reduce raw scores to a single scalar logit.
    ///
    /// The batch dimension must be exactly 1 and the member row
    /// non-empty; the reduction is always the full mean across members.
    /// Any other shape is a `ShapeError`; ensemble members are never
    /// silently discarded.
    pub fn reduce(&self) -> Result<f64, ShapeError> {
        if self.rows.len() != 1 {
            return Err(ShapeError::Batch {
                rows: self.rows.len(),
            });
        }
        let members = &self.rows[0];
        if members.is_empty() {
            return Err(ShapeError::EmptyScores);
        }
        Ok(members.iter().sum::<f64>() / members.len() as f64)
    }
}

/// Loaded tensor ensemble.
///
/// Holds the trained parameters read-only for the process lifetime; the
/// forward pass has no mutable scratch state.
#[derive(Debug)]
pub struct TensorBackend {
    model_version: String,
    continuous_dim: usize,
    cardinalities: Vec<usize>,
    heads: Vec<Head>,
}

impl TensorBackend {
    /// Default artifact file name inside the model directory.
    pub const ARTIFACT_FILE: &'static str = "tensor_model.json";

    /// Load and verify an artifact.
    ///
    /// # Errors
    /// Returns `ModelLoadError` if the file is missing or unreadable, is
    /// not valid JSON, declares an unsupported format version or the
    /// wrong schema, fails the optional version pin, or any declared
    /// dimension disagrees with the Compact-6 schema.
    pub fn load(path: &Path, required_version: Option<&str>) -> Result<Self, ModelLoadError> {
        let artifact: TensorArtifact = read_artifact(path)?;

        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelLoadError::FormatVersion {
                expected: ARTIFACT_FORMAT_VERSION,
                found: artifact.format_version,
            });
        }
        if artifact.schema != SchemaId::Compact6.to_string() {
            return Err(ModelLoadError::SchemaMismatch {
                expected: SchemaId::Compact6.to_string(),
                found: artifact.schema,
            });
        }
        check_version_pin(&artifact.model_version, required_version)?;

        if artifact.continuous_dim != COMPACT_6.numeric_order.len() {
            return Err(ModelLoadError::BadShape(format!(
                "continuous_dim {} where schema has {} continuous fields",
                artifact.continuous_dim,
                COMPACT_6.numeric_order.len()
            )));
        }
        if artifact.categorical_cardinalities.len() != COMPACT_6.categorical_order.len() {
            return Err(ModelLoadError::BadShape(format!(
                "{} cardinalities where schema has {} categorical fields",
                artifact.categorical_cardinalities.len(),
                COMPACT_6.categorical_order.len()
            )));
        }
        // Compact-6 codes are 0-based and contiguous, so each embedding
        // table must cover exactly the declared code set.
        for (field, cardinality) in COMPACT_6
            .categorical_order
            .iter()
            .zip(&artifact.categorical_cardinalities)
        {
            let declared = match COMPACT_6.describe(field).map(|spec| spec.kind) {
                Some(crate::domain::FieldKind::Categorical { codes }) => codes.len(),
                _ => 0,
            };
            if *cardinality != declared {
                return Err(ModelLoadError::BadShape(format!(
                    "cardinality {cardinality} for '{field}', schema declares {declared} codes"
                )));
            }
        }
        if artifact.heads.is_empty() {
            return Err(ModelLoadError::BadShape(
                "ensemble has no heads".to_string(),
            ));
        }
        for (i, head) in artifact.heads.iter().enumerate() {
            if head.continuous_weights.len() != artifact.continuous_dim {
                return Err(ModelLoadError::BadShape(format!(
                    "head {i} has {} continuous weights, expected {}",
                    head.continuous_weights.len(),
                    artifact.continuous_dim
                )));
            }
            if head.embeddings.len() != artifact.categorical_cardinalities.len() {
                return Err(ModelLoadError::BadShape(format!(
                    "head {i} has {} embedding tables, expected {}",
                    head.embeddings.len(),
                    artifact.categorical_cardinalities.len()
                )));
            }
            for (table, cardinality) in
                head.embeddings.iter().zip(&artifact.categorical_cardinalities)
            {
                if table.len() != *cardinality {
                    return Err(ModelLoadError::BadShape(format!(
                        "head {i} embedding table has {} rows, expected {cardinality}",
                        table.len()
                    )));
                }
            }
        }

        tracing::info!(
            path = %path.display(),
            version = %artifact.model_version,
            heads = artifact.heads.len(),
            "Tensor model loaded"
        );

        Ok(Self {
            model_version: artifact.model_version,
            continuous_dim: artifact.continuous_dim,
            cardinalities: artifact.categorical_cardinalities,
            heads: artifact.heads,
        })
    }

    /// Forward pass producing raw per-member scores, shape `(1, heads)`.
    fn forward(&self, features: &FeatureVector) -> Result<RawScores, ShapeError> {
        if features.numeric.len() != self.continuous_dim {
            return Err(ShapeError::GroupWidth {
                group: "numeric",
                expected: self.continuous_dim,
                got: features.numeric.len(),
            });
        }
        if features.categorical.len() != self.cardinalities.len() {
            return Err(ShapeError::GroupWidth {
                group: "categorical",
                expected: self.cardinalities.len(),
                got: features.categorical.len(),
            });
        }
        for (&code, &cardinality) in features.categorical.iter().zip(&self.cardinalities) {
            if code < 0 || code as usize >= cardinality {
                return Err(ShapeError::CodeRange { code, cardinality });
            }
        }

        let mut members = Vec::with_capacity(self.heads.len());
        for head in &self.heads {
            let mut logit = head.bias;
            for (x, w) in features.numeric.iter().zip(&head.continuous_weights) {
                logit += w * x;
            }
            for (i, &code) in features.categorical.iter().enumerate() {
                logit += head.embeddings[i][code as usize];
            }
            members.push(logit);
        }

        Ok(RawScores {
            rows: vec![members],
        })
    }
}

impl ModelBackend for TensorBackend {
    fn schema(&self) -> SchemaId {
        SchemaId::Compact6
    }

    fn backend_name(&self) -> &'static str {
        "tensor"
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }

    fn classify(&self, features: &FeatureVector) -> Result<f64, ShapeError> {
        let raw = self.forward(features)?;
        let logit = raw.reduce()?;
        Ok(sigmoid(logit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reduce_means_all_members() {
        let raw = RawScores {
            rows: vec![vec![0.2, 0.4, 0.6]],
        };
        let logit = raw.reduce().expect("reduces");
        assert!((logit - 0.4).abs() < 1e-12);
        assert!((sigmoid(logit) - 0.5987).abs() < 1e-4);
    }

    #[test]
    fn test_reduce_single_member() {
        let raw = RawScores {
            rows: vec![vec![2.0]],
        };
        assert!((raw.reduce().expect("reduces") - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reduce_rejects_batches() {
        let raw = RawScores {
            rows: vec![vec![0.2], vec![0.4]],
        };
        assert_eq!(raw.reduce().unwrap_err(), ShapeError::Batch { rows: 2 });

        let empty = RawScores { rows: vec![] };
        assert_eq!(empty.reduce().unwrap_err(), ShapeError::Batch { rows: 0 });
    }

    #[test]
    fn test_reduce_rejects_empty_members() {
        let raw = RawScores { rows: vec![vec![]] };
        assert_eq!(raw.reduce().unwrap_err(), ShapeError::EmptyScores);
    }

    fn artifact_json(heads: &str) -> String {
        format!(
            r#"{{
  "format_version": 1,
  "model_version": "0.1.0",
  "schema": "compact6",
  "continuous_dim": 1,
  "categorical_cardinalities": [4, 2, 3, 4, 4],
  "heads": [{heads}]
}}"#
        )
    }

    /// Head with zeroed embeddings: the logit is bias + w * oldpeak.
    fn zero_head(bias: f64, weight: f64) -> String {
        format!(
            r#"{{"bias": {bias}, "continuous_weights": [{weight}],
"embeddings": [[0,0,0,0],[0,0],[0,0,0],[0,0,0,0],[0,0,0,0]]}}"#
        )
    }

    fn write_artifact(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(TensorBackend::ARTIFACT_FILE);
        let mut file = std::fs::File::create(&path).expect("create artifact");
        file.write_all(contents.as_bytes()).expect("write artifact");
        path
    }

    fn split_features() -> FeatureVector {
        FeatureVector {
            numeric: vec![0.0],
            categorical: vec![3, 0, 2, 0, 0],
        }
    }

    #[test]
    fn test_ensemble_mean_then_squash() {
        let dir = tempfile::tempdir().expect("tempdir");
        let heads = [zero_head(0.2, 0.0), zero_head(0.4, 0.0), zero_head(0.6, 0.0)].join(",");
        let path = write_artifact(&dir, &artifact_json(&heads));

        let backend = TensorBackend::load(&path, None).expect("loads");
        let probability = backend.classify(&split_features()).expect("classifies");
        assert!((probability - 0.5987).abs() < 1e-4);
    }

    #[test]
    fn test_scalar_logit_squash() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_artifact(&dir, &artifact_json(&zero_head(2.0, 0.0)));

        let backend = TensorBackend::load(&path, None).expect("loads");
        let probability = backend.classify(&split_features()).expect("classifies");
        assert!((probability - 0.8808).abs() < 1e-4);
    }

    #[test]
    fn test_continuous_weight_applies() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_artifact(&dir, &artifact_json(&zero_head(0.0, 1.0)));
        let backend = TensorBackend::load(&path, None).expect("loads");

        let features = FeatureVector {
            numeric: vec![2.0],
            categorical: vec![0, 0, 0, 0, 0],
        };
        let probability = backend.classify(&features).expect("classifies");
        assert!((probability - 0.8808).abs() < 1e-4);
    }

    #[test]
    fn test_empty_ensemble_fails_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_artifact(&dir, &artifact_json(""));
        let err = TensorBackend::load(&path, None).unwrap_err();
        assert!(matches!(err, ModelLoadError::BadShape(_)));
    }

    #[test]
    fn test_wrong_cardinalities_fail_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = artifact_json(&zero_head(0.0, 0.0))
            .replace("[4, 2, 3, 4, 4]", "[4, 2, 3, 4, 9]");
        let path = write_artifact(&dir, &bad);
        let err = TensorBackend::load(&path, None).unwrap_err();
        assert!(matches!(err, ModelLoadError::BadShape(_)));
    }

    #[test]
    fn test_flat_vector_is_shape_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_artifact(&dir, &artifact_json(&zero_head(0.0, 0.0)));
        let backend = TensorBackend::load(&path, None).expect("loads");

        let flat = FeatureVector {
            numeric: vec![0.0; 13],
            categorical: vec![],
        };
        let err = backend.classify(&flat).unwrap_err();
        assert!(matches!(err, ShapeError::GroupWidth { .. }));
    }

    #[test]
    fn test_committed_artifact_loads() {
        let backend =
            TensorBackend::load(Path::new("models/tensor_model.json"), None).expect("loads");
        let probability = backend.classify(&split_features()).expect("classifies");
        assert!((0.0..=1.0).contains(&probability));
    }
}
