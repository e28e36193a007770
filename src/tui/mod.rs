//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Dashboard with backend status
//! - Schema-driven patient data entry
//! - Screening result display

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::MedicalTheme;
