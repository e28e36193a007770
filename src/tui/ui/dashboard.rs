//! Dashboard view: Main overview screen.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::RiskBand;
use crate::tui::styles::{MedicalTheme, LOGO};

/// Dashboard state: backend identity plus session-local counters.
///
/// Counters live only for the process lifetime; nothing is persisted.
pub struct DashboardState {
    pub backend: &'static str,
    pub model_version: String,
    pub schema: String,
    pub total: usize,
    pub low: u32,
    pub moderate: u32,
    pub high: u32,
}

impl DashboardState {
    #[must_use]
    pub fn new(backend: &'static str, model_version: String, schema: String) -> Self {
        Self {
            backend,
            model_version,
            schema,
            total: 0,
            low: 0,
            moderate: 0,
            high: 0,
        }
    }

    /// Count one completed screening.
    pub fn record_band(&mut self, band: RiskBand) {
        self.total += 1;
        match band {
            RiskBand::Low => self.low += 1,
            RiskBand::Moderate => self.moderate += 1,
            RiskBand::High => self.high += 1,
        }
    }
}

/// Render the main dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // Logo
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);

    let logo = Paragraph::new(LOGO)
        .style(MedicalTheme::subtitle())
        .alignment(Alignment::Center);
    f.render_widget(logo, chunks[1]);

    render_main_content(f, chunks[2], state);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Cardioscreen", MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled(
            "Heart-Disease Risk Screening",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_main_content(f: &mut Frame, area: Rect, state: &DashboardState) {
    // Status panel on the left, session summary on the right.
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_status_panel(f, chunks[0], state);
    render_session_summary(f, chunks[1], state);
}

fn render_status_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // System status
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let status_items = vec![
        format_status_item("Model Loaded", true),
        Line::from(vec![
            Span::styled("  Backend: ", MedicalTheme::text_secondary()),
            Span::styled(state.backend, MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Model version: ", MedicalTheme::text_secondary()),
            Span::styled(state.model_version.clone(), MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Field schema: ", MedicalTheme::text_secondary()),
            Span::styled(state.schema.clone(), MedicalTheme::text()),
        ]),
    ];

    let status_block = Block::default()
        .title(Span::styled(" System Status ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let status_list = Paragraph::new(status_items).block(status_block);
    f.render_widget(status_list, chunks[0]);

    let actions = vec![
        Line::from(vec![
            Span::styled("[N] ", MedicalTheme::key_hint()),
            Span::styled("New Screening", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    ];

    let actions_block = Block::default()
        .title(Span::styled(" Quick Actions ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let actions_list = Paragraph::new(actions).block(actions_block);
    f.render_widget(actions_list, chunks[1]);
}

fn format_status_item(label: &str, ok: bool) -> Line<'static> {
    let (icon, style) = if ok {
        ("OK", MedicalTheme::success())
    } else {
        ("FAIL", MedicalTheme::danger())
    };

    Line::from(vec![
        Span::styled(format!("  {icon} "), style),
        Span::styled(label.to_string(), MedicalTheme::text()),
    ])
}

fn render_session_summary(f: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default()
        .title(Span::styled(" This Session ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    if state.total == 0 {
        let empty_msg = Paragraph::new(Line::from(vec![Span::styled(
            "No screenings yet. Press [N] to start.",
            MedicalTheme::text_muted(),
        )]))
        .block(block);
        f.render_widget(empty_msg, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(vec![
            Span::styled("Screenings: ", MedicalTheme::text_secondary()),
            Span::styled(state.total.to_string(), MedicalTheme::text()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Low: ", MedicalTheme::text_secondary()),
            Span::styled(
                state.low.to_string(),
                MedicalTheme::risk_band(RiskBand::Low),
            ),
            Span::styled("  Moderate: ", MedicalTheme::text_secondary()),
            Span::styled(
                state.moderate.to_string(),
                MedicalTheme::risk_band(RiskBand::Moderate),
            ),
            Span::styled("  High: ", MedicalTheme::text_secondary()),
            Span::styled(
                state.high.to_string(),
                MedicalTheme::risk_band(RiskBand::High),
            ),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Counts reset when the application exits; nothing is stored.",
            MedicalTheme::text_muted(),
        )]),
    ];

    let p = Paragraph::new(lines).block(Block::default());
    f.render_widget(p, inner);
}
