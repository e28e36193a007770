//! # Cardioscreen
#![allow(non_snake_case)]
//!
//! Local heart-disease risk screening over pre-trained model artifacts.
//!
//! This crate provides:
//! - Two named clinical field schemas with strict validation
//! - A uniform classifier interface over two incompatible model backends
//! - Threshold-based risk banding for screening results
//! - Terminal UI for local-only deployment
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (schemas, records, feature vectors, reports)
//! - `ports`: Trait definition for the model backend boundary
//! - `adapters`: Concrete backends (tabular estimator, tensor ensemble)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{PatientRecord, PredictionResult, Report, RiskBand};

/// Result type for Cardioscreen operations
pub type Result<T> = std::result::Result<T, CardioscreenError>;

/// Main error type for Cardioscreen
#[derive(Debug, thiserror::Error)]
pub enum CardioscreenError {
    #[error("Invalid patient data: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error("Model backend unavailable: {0}")]
    ModelLoad(#[from] adapters::ModelLoadError),

    #[error("Feature shape mismatch: {0}")]
    Shape(#[from] domain::ShapeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
