//! Model backend port: one classification contract over incompatible
//! backends.
//!
//! The presentation layer and the screening service depend only on this
//! trait, never on which concrete backend is loaded.

use crate::domain::{FeatureVector, SchemaId, ShapeError};

/// Trait for pre-trained binary classifiers.
///
/// A value of an implementing type always wraps a fully loaded model
/// artifact: loading failures are surfaced by the concrete constructors
/// and are fatal to startup, never deferred to `classify`.
///
/// Inference is read-only and stateless across calls (no parameter
/// mutation, no ordering dependency), so a backend is safe to share
/// behind an `Arc`.
pub trait ModelBackend: Send + Sync {
    /// Field schema this backend was trained against.
    fn schema(&self) -> SchemaId;

    /// Short backend identifier for logs and display.
    fn backend_name(&self) -> &'static str;

    /// Version string declared by the loaded artifact.
    fn model_version(&self) -> &str;

    /// Probability of the positive ("disease present") class, in [0, 1].
    ///
    /// # Errors
    /// Returns `ShapeError` if `features` does not match the layout this
    /// backend was trained with.
    fn classify(&self, features: &FeatureVector) -> Result<f64, ShapeError>;
}
