//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::{EstimatorBackend, TensorBackend};
use crate::application::ScreeningService;
use crate::ports::ModelBackend;

use super::ui::{
    dashboard::{render_dashboard, DashboardState},
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    PatientForm,
    Result,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Screening service over the backend selected at startup
    service: ScreeningService<dyn ModelBackend>,

    /// Dashboard state
    dashboard_state: DashboardState,

    /// Patient form state
    form_state: PatientFormState,

    /// Result state
    result_state: ResultState,
}

impl App {
    /// Create a new application instance from environment configuration.
    ///
    /// Reads `CARDIOSCREEN_BACKEND` (estimator | tensor),
    /// `CARDIOSCREEN_MODEL_PATH` (artifact directory) and the optional
    /// `CARDIOSCREEN_MODEL_VERSION` pin.
    ///
    /// # Errors
    /// Returns error if the model artifact cannot be loaded or verified.
    /// Screening must be unavailable rather than wrong, so a load
    /// failure refuses startup instead of disabling parts of the UI.
    pub fn new() -> Result<Self> {
        let model_path = std::env::var("CARDIOSCREEN_MODEL_PATH")
            .or_else(|_| std::env::var("Cardioscreen_MODEL_PATH"))
            .unwrap_or_else(|_| "models".to_string());
        let model_dir = std::path::Path::new(&model_path);

        if !model_dir.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set CARDIOSCREEN_MODEL_PATH to a directory containing {} or {}.",
                model_dir,
                EstimatorBackend::ARTIFACT_FILE,
                TensorBackend::ARTIFACT_FILE
            ));
        }

        let backend_kind = std::env::var("CARDIOSCREEN_BACKEND")
            .or_else(|_| std::env::var("Cardioscreen_BACKEND"))
            .unwrap_or_else(|_| "estimator".to_string());
        let version_pin = std::env::var("CARDIOSCREEN_MODEL_VERSION").ok();

        let backend: Arc<dyn ModelBackend> = match backend_kind.as_str() {
            "estimator" => Arc::new(
                EstimatorBackend::load(
                    &model_dir.join(EstimatorBackend::ARTIFACT_FILE),
                    version_pin.as_deref(),
                )
                .map_err(|e| anyhow!("Failed to load model from {:?}: {}", model_dir, e))?,
            ),
            "tensor" => Arc::new(
                TensorBackend::load(
                    &model_dir.join(TensorBackend::ARTIFACT_FILE),
                    version_pin.as_deref(),
                )
                .map_err(|e| anyhow!("Failed to load model from {:?}: {}", model_dir, e))?,
            ),
            other => {
                return Err(anyhow!(
                    "Unknown backend '{}'. CARDIOSCREEN_BACKEND must be 'estimator' or 'tensor'.",
                    other
                ))
            }
        };

        Self::with_service(ScreeningService::new(backend))
    }

    /// Create the application over a pre-built service (Composition Root
    /// pattern). Lets `main.rs` or tests construct the backend externally.
    ///
    /// # Errors
    /// Returns error if initialization fails.
    pub fn with_service(service: ScreeningService<dyn ModelBackend>) -> Result<Self> {
        let dashboard_state = DashboardState::new(
            service.backend_name(),
            service.model_version(),
            service.schema().id.to_string(),
        );
        let form_state = PatientFormState::new(service.schema());

        Ok(Self {
            screen: Screen::Dashboard,
            should_quit: false,
            service,
            dashboard_state,
            form_state,
            result_state: ResultState::default(),
        })
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            // Draw current screen
            terminal.draw(|f| {
                let area = f.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(area);

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match self.screen {
                    Screen::Dashboard => {
                        render_dashboard(f, content_area, &self.dashboard_state)
                    }
                    Screen::PatientForm => {
                        render_patient_form(f, content_area, &self.form_state)
                    }
                    Screen::Result => render_result(f, content_area, &self.result_state),
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::PatientForm => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.form_state.reset();
                self.screen = Screen::PatientForm;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Up => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_form();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match &self.result_state {
            ResultState::Complete { .. } => match key {
                KeyCode::Enter | KeyCode::Esc => {
                    self.screen = Screen::Dashboard;
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.form_state.reset();
                    self.screen = Screen::PatientForm;
                }
                _ => {}
            },
            ResultState::Error { .. } => match key {
                KeyCode::Enter => {
                    self.screen = Screen::PatientForm;
                }
                KeyCode::Esc => {
                    self.screen = Screen::Dashboard;
                }
                _ => {}
            },
            ResultState::Idle => {
                if key == KeyCode::Esc {
                    self.screen = Screen::Dashboard;
                }
            }
        }
    }

    fn submit_form(&mut self) {
        // Validation errors stay on the form; nothing reaches the
        // backend until every field is in its declared domain.
        let record = match self.form_state.to_record() {
            Ok(record) => record,
            Err(e) => {
                self.form_state.error_message = Some(e);
                return;
            }
        };

        let entries = self.form_state.entries();

        match self.service.screen(record) {
            Ok(report) => {
                self.dashboard_state.record_band(report.risk_band);
                self.result_state = ResultState::Complete { report, entries };
            }
            Err(e) => {
                // Schema/backend mismatch bug, surfaced loudly.
                self.result_state = ResultState::Error {
                    message: e.to_string(),
                };
            }
        }

        // Clear plaintext buffers from the UI immediately.
        self.form_state.reset();
        self.screen = Screen::Result;
    }
}
