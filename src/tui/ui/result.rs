//! Screening result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::Report;
use crate::tui::styles::MedicalTheme;

/// Result screen state
#[derive(Debug, Clone, Default)]
pub enum ResultState {
    /// No screening run yet
    #[default]
    Idle,
    /// Completed with a report and the echoed form entries
    Complete {
        report: Report,
        entries: Vec<(String, String)>,
    },
    /// Error occurred
    Error { message: String },
}

/// Render the screening result view
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        ResultState::Idle => render_idle(f, chunks[1]),
        ResultState::Complete { report, entries } => {
            render_report(f, chunks[1], report, entries)
        }
        ResultState::Error { message } => render_error(f, chunks[1], message),
    }
    render_result_footer(f, chunks[2], state);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Screening Result", MedicalTheme::title()),
        Span::styled(" │ Risk Classification", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No screening yet",
            MedicalTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter patient data to begin",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_report(f: &mut Frame, area: Rect, report: &Report, entries: &[(String, String)]) {
    // Result panel on the left, entered values on the right.
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_outcome(f, columns[0], report);
    render_entries(f, columns[1], entries);
}

fn render_outcome(f: &mut Frame, area: Rect, report: &Report) {
    let block = Block::default()
        .title(Span::styled(" Outcome ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Headline + band
            Constraint::Length(3), // Probability gauge
            Constraint::Min(0),    // Detail lines
        ])
        .margin(1)
        .split(inner);

    let band_style = MedicalTheme::risk_band(report.risk_band);
    let headline = if report.result.prediction == 1 {
        Span::styled(
            "Model indicates HIGH probability of heart disease",
            MedicalTheme::danger(),
        )
    } else {
        Span::styled(
            "Model indicates LOW probability of heart disease",
            MedicalTheme::success(),
        )
    };

    let risk_display = Paragraph::new(vec![
        Line::from(headline),
        Line::from(Span::styled(
            format!("{}", report.risk_band),
            band_style.add_modifier(ratatui::style::Modifier::BOLD),
        )),
        Line::from(Span::styled(
            report.risk_band.advice(),
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(risk_display, chunks[0]);

    let prob_gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Disease Probability ",
                    MedicalTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(
            ratatui::style::Style::default().fg(MedicalTheme::band_color(report.risk_band)),
        )
        .ratio(report.result.probability.clamp(0.0, 1.0))
        .label(format!("{:.2}%", report.result.probability * 100.0));
    f.render_widget(prob_gauge, chunks[1]);

    let details = vec![
        Line::from(vec![
            Span::styled("Probability of disease:  ", MedicalTheme::text_secondary()),
            Span::styled(
                format!("{:.2}%", report.result.probability * 100.0),
                MedicalTheme::text(),
            ),
        ]),
        Line::from(vec![
            Span::styled("Probability of absence:  ", MedicalTheme::text_secondary()),
            Span::styled(
                format!("{:.2}%", report.result.absence_probability() * 100.0),
                MedicalTheme::text(),
            ),
        ]),
        Line::from(vec![
            Span::styled("Confidence:              ", MedicalTheme::text_secondary()),
            Span::styled(
                format!("{:.1}%", report.result.confidence * 100.0),
                MedicalTheme::text(),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Backend: ", MedicalTheme::text_secondary()),
            Span::styled(report.backend.clone(), MedicalTheme::text_muted()),
            Span::styled("  Model: ", MedicalTheme::text_secondary()),
            Span::styled(report.model_version.clone(), MedicalTheme::text_muted()),
        ]),
        Line::from(vec![
            Span::styled("Report: ", MedicalTheme::text_secondary()),
            Span::styled(report.id.clone(), MedicalTheme::text_muted()),
        ]),
    ];
    f.render_widget(Paragraph::new(details), chunks[2]);
}

fn render_entries(f: &mut Frame, area: Rect, entries: &[(String, String)]) {
    let block = Block::default()
        .title(Span::styled(" Entered Values ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let lines: Vec<Line> = entries
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label}: "), MedicalTheme::text_secondary()),
                Span::styled(value.clone(), MedicalTheme::text()),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect, state: &ResultState) {
    let content = match state {
        ResultState::Complete { .. } => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Dashboard ", MedicalTheme::key_desc()),
            Span::styled("[N] ", MedicalTheme::key_hint()),
            Span::styled("New Screening", MedicalTheme::key_desc()),
        ]),
        ResultState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Back to Form ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Dashboard", MedicalTheme::key_desc()),
        ]),
        ResultState::Idle => Line::from(vec![Span::styled(
            "Waiting for input...",
            MedicalTheme::text_muted(),
        )]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
