//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no external service
//! dependencies. All types are serializable and implement strict
//! validation.

mod features;
mod patient;
mod prediction;
pub mod schema;

pub use features::{assemble, FeatureVector, ShapeError};
pub use patient::PatientRecord;
pub use prediction::{PredictionResult, Report, RiskBand};
pub use schema::{
    FieldKind, FieldSchema, FieldSpec, SchemaId, ValidatedValue, ValidationError,
};
