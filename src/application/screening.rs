//! Screening service: orchestrates one-shot risk prediction.
//!
//! Pipeline per request:
//! 1. Shape the validated record into the backend's feature layout
//! 2. Query the backend for the disease probability
//! 3. Band the probability and build the report
//!
//! The pipeline is side-effect-free apart from structured logging; a
//! request either produces a full report or an error, never a partial
//! result.

use std::sync::Arc;

use crate::domain::schema::FieldSchema;
use crate::domain::{assemble, PatientRecord, PredictionResult, Report, ShapeError};
use crate::ports::ModelBackend;
use crate::CardioscreenError;

/// Service for running risk screenings against a loaded backend.
///
/// The backend handle is injected and shared read-only for the process
/// lifetime (the service never mutates it), so tests can substitute a
/// fake backend returning fixed scores.
pub struct ScreeningService<B>
where
    B: ModelBackend + ?Sized,
{
    backend: Arc<B>,
}

impl<B> ScreeningService<B>
where
    B: ModelBackend + ?Sized,
{
    /// Create a new screening service over a loaded backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Schema the active backend expects the form to collect.
    #[must_use]
    pub fn schema(&self) -> &'static FieldSchema {
        self.backend.schema().schema()
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    #[must_use]
    pub fn model_version(&self) -> String {
        self.backend.model_version().to_string()
    }

    /// Run one screening.
    ///
    /// # Errors
    /// Returns a `ShapeError` wrapped in `CardioscreenError` if the
    /// record's schema does not match the backend or assembly fails.
    pub fn screen(&self, record: PatientRecord) -> Result<Report, CardioscreenError> {
        let schema = self.schema();
        if record.schema_id() != schema.id {
            return Err(ShapeError::SchemaMismatch {
                record: record.schema_id(),
                backend: schema.id,
            }
            .into());
        }

        tracing::debug!(schema = %schema.id, fields = record.len(), "Assembling feature vector");
        let features = assemble(&record, schema)?;

        let probability = self.backend.classify(&features)?;
        debug_assert!((0.0..=1.0).contains(&probability));

        let result = PredictionResult::new(probability);
        let report = Report::new(
            result,
            self.backend.backend_name(),
            self.backend.model_version(),
            schema.id,
        );

        tracing::info!(
            "Screening complete: prediction={}, confidence={:.2}%, risk={}",
            report.result.prediction,
            report.result.confidence * 100.0,
            report.risk_band
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sigmoid;
    use crate::domain::{FeatureVector, RiskBand, SchemaId};

    /// Backend that squashes a fixed raw logit, tensor-style.
    struct FixedLogitBackend {
        schema: SchemaId,
        logit: f64,
    }

    impl ModelBackend for FixedLogitBackend {
        fn schema(&self) -> SchemaId {
            self.schema
        }

        fn backend_name(&self) -> &'static str {
            "fixed-logit"
        }

        fn model_version(&self) -> &str {
            "test"
        }

        fn classify(&self, _features: &FeatureVector) -> Result<f64, ShapeError> {
            Ok(sigmoid(self.logit))
        }
    }

    fn compact6_record() -> PatientRecord {
        PatientRecord::from_values(
            SchemaId::Compact6,
            &[
                ("oldpeak", 0.0),
                ("cp", 3.0),
                ("exang", 0.0),
                ("slope", 2.0),
                ("ca", 0.0),
                ("thal", 0.0),
            ],
        )
        .expect("valid record")
    }

    #[test]
    fn test_scalar_logit_screening_is_high_risk() {
        let backend = Arc::new(FixedLogitBackend {
            schema: SchemaId::Compact6,
            logit: 2.0,
        });
        let service = ScreeningService::new(backend);

        let report = service.screen(compact6_record()).expect("screens");
        assert!((report.result.probability - 0.8808).abs() < 1e-4);
        assert_eq!(report.risk_band, RiskBand::High);
        assert_eq!(report.result.prediction, 1);
        assert_eq!(report.schema, SchemaId::Compact6);
    }

    #[test]
    fn test_schema_mismatch_aborts_before_inference() {
        let backend = Arc::new(FixedLogitBackend {
            schema: SchemaId::Cleveland13,
            logit: 0.0,
        });
        let service = ScreeningService::new(backend);

        let err = service.screen(compact6_record()).unwrap_err();
        assert!(matches!(
            err,
            CardioscreenError::Shape(ShapeError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_dyn_backend_injection() {
        // The TUI drives the service through a trait object; make sure
        // the unsized path works the same way.
        let backend: Arc<dyn ModelBackend> = Arc::new(FixedLogitBackend {
            schema: SchemaId::Compact6,
            logit: -2.0,
        });
        let service: ScreeningService<dyn ModelBackend> = ScreeningService::new(backend);

        let report = service.screen(compact6_record()).expect("screens");
        assert_eq!(report.risk_band, RiskBand::Low);
        assert_eq!(report.result.prediction, 0);
        assert_eq!(service.backend_name(), "fixed-logit");
    }
}
