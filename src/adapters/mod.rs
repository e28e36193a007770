//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the model backends:
//! - `estimator`: tabular scaler + logistic-regression artifact
//! - `tensor`: ensemble tensor model with split numeric/categorical input

pub mod estimator;
pub mod tensor;

use std::path::Path;

use serde::de::DeserializeOwned;

pub use estimator::EstimatorBackend;
pub use tensor::TensorBackend;

/// Artifact format revision both loaders understand.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Model artifact loading failures.
///
/// Fatal at startup: the application refuses to serve predictions
/// without a verified backend.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model artifact {path} not readable: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact format version {found} unsupported (expected {expected})")]
    FormatVersion { expected: u32, found: u32 },

    #[error("artifact declares schema '{found}' but the backend expects '{expected}'")]
    SchemaMismatch { expected: String, found: String },

    #[error("artifact is model version {found}, required version is {required}")]
    VersionPin { required: String, found: String },

    #[error("artifact shape invalid: {0}")]
    BadShape(String),
}

/// Read and parse a JSON artifact file.
pub(crate) fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ModelLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ModelLoadError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Check an artifact's declared version against an optional pin.
pub(crate) fn check_version_pin(
    found: &str,
    required: Option<&str>,
) -> Result<(), ModelLoadError> {
    match required {
        Some(required) if required != found => Err(ModelLoadError::VersionPin {
            required: required.to_string(),
            found: found.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Logistic squash mapping an unbounded score to a probability.
pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_known_values() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!((sigmoid(0.4) - 0.5987).abs() < 1e-4);
        assert!((sigmoid(2.0) - 0.8808).abs() < 1e-4);
        assert!((sigmoid(-2.0) - (1.0 - sigmoid(2.0))).abs() < 1e-12);
    }

    #[test]
    fn test_version_pin() {
        assert!(check_version_pin("0.1.0", None).is_ok());
        assert!(check_version_pin("0.1.0", Some("0.1.0")).is_ok());
        assert!(matches!(
            check_version_pin("0.1.0", Some("0.2.0")),
            Err(ModelLoadError::VersionPin { .. })
        ));
    }
}
