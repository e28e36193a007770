//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, this trait defines the boundary
//! between the application and the model backends.

mod classifier;

pub use classifier::ModelBackend;
