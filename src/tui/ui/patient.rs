//! Patient data input form.
//!
//! The form is schema-driven: it renders whichever field set the loaded
//! backend was trained against, with range and code-label hints taken
//! from the field declarations.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{FieldKind, FieldSchema, FieldSpec, PatientRecord};
use crate::tui::styles::MedicalTheme;

/// One form field bound to its schema declaration.
#[derive(Debug, Clone)]
pub struct FormField {
    pub spec: &'static FieldSpec,
    pub hint: String,
    pub value: String,
}

impl FormField {
    fn new(spec: &'static FieldSpec) -> Self {
        let hint = match spec.kind {
            FieldKind::Numeric { min, max } => format!("{min} to {max}"),
            FieldKind::Categorical { codes } => codes
                .iter()
                .map(|(code, label)| format!("{code}={label}"))
                .collect::<Vec<_>>()
                .join(", "),
        };
        Self {
            spec,
            hint,
            value: String::new(),
        }
    }
}

/// Patient form state
pub struct PatientFormState {
    schema: &'static FieldSchema,
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl PatientFormState {
    /// Build an empty form for the given schema.
    #[must_use]
    pub fn new(schema: &'static FieldSchema) -> Self {
        Self {
            schema,
            fields: schema.fields.iter().map(FormField::new).collect(),
            selected_field: 0,
            error_message: None,
        }
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Add a character to the current field
    pub fn input_char(&mut self, c: char) {
        if c.is_ascii_digit() || c == '.' || c == '-' {
            self.fields[self.selected_field].value.push(c);
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].value.pop();
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        self.fields[self.selected_field].value.clear();
    }

    /// Clear all field buffers and reset the cursor.
    pub fn reset(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.clear();
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Parse and validate the buffers into a record.
    ///
    /// Validation happens through the schema, so a returned record is
    /// ready for assembly; nothing reaches the backend on error.
    pub fn to_record(&self) -> Result<PatientRecord, String> {
        let mut record = PatientRecord::new(self.schema.id);

        for field in self.fields.iter() {
            let raw: f64 = field
                .value
                .trim()
                .parse()
                .map_err(|_| format!("{}: Invalid number", field.spec.label))?;

            record
                .set(field.spec.name, raw)
                .map_err(|e| e.to_string())?;
        }

        Ok(record)
    }

    /// Entered values with display labels, for the result-screen echo.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|field| {
                let shown = match field.value.trim().parse::<i64>() {
                    Ok(code) => match field.spec.code_label(code) {
                        Some(label) => format!("{code} ({label})"),
                        None => field.value.trim().to_string(),
                    },
                    Err(_) => field.value.trim().to_string(),
                };
                (field.spec.label.to_string(), shown)
            })
            .collect()
    }

    /// Load sample data (typical symptomatic patient).
    pub fn load_sample_data(&mut self) {
        let sample: &[&str] = match self.schema.id {
            crate::domain::SchemaId::Cleveland13 => &[
                "57",  // age
                "1",   // sex
                "4",   // cp (asymptomatic)
                "140", // trestbps
                "260", // chol
                "0",   // fbs
                "1",   // restecg
                "132", // thalach
                "1",   // exang
                "2.1", // oldpeak
                "2",   // slope
                "1",   // ca
                "7",   // thal (reversible defect)
            ],
            crate::domain::SchemaId::Compact6 => &[
                "2.1", // oldpeak
                "3",   // cp (asymptomatic)
                "1",   // exang
                "1",   // slope (flat)
                "1",   // ca
                "3",   // thal (reversible defect)
            ],
        };
        for (field, val) in self.fields.iter_mut().zip(sample) {
            field.value = (*val).to_string();
        }
    }
}

/// Render the patient data input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], state);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Patient Data Entry", MedicalTheme::title()),
        Span::styled(
            format!(" │ {} schema", state.schema.id),
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

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    // Two-column layout; the left column takes the extra field on odd counts.
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let border_style = if is_selected {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        };

        let title_style = if is_selected {
            MedicalTheme::focused()
        } else {
            MedicalTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.spec.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value_display = if field.value.is_empty() {
            Span::styled(field.hint.as_str(), MedicalTheme::text_muted())
        } else {
            Span::styled(field.value.as_str(), MedicalTheme::text())
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected {
                Span::styled("▌", MedicalTheme::focused())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Submit ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample Data ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Cancel", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{CLEVELAND_13, COMPACT_6};

    #[test]
    fn test_form_tracks_schema_fields() {
        let form = PatientFormState::new(&CLEVELAND_13);
        assert_eq!(form.fields.len(), 13);

        let form = PatientFormState::new(&COMPACT_6);
        assert_eq!(form.fields.len(), 6);
        assert_eq!(form.fields[0].spec.name, "oldpeak");
    }

    #[test]
    fn test_sample_data_produces_valid_record() {
        for schema in [&CLEVELAND_13, &COMPACT_6] {
            let mut form = PatientFormState::new(schema);
            form.load_sample_data();
            let record = form.to_record().expect("sample data validates");
            assert_eq!(record.len(), schema.field_count());
        }
    }

    #[test]
    fn test_out_of_range_input_reports_field() {
        let mut form = PatientFormState::new(&CLEVELAND_13);
        form.load_sample_data();
        form.fields[0].value = "101".to_string(); // age out of range

        let err = form.to_record().unwrap_err();
        assert!(err.contains("age"), "unexpected message: {err}");
    }

    #[test]
    fn test_unparseable_input_reports_label() {
        let mut form = PatientFormState::new(&COMPACT_6);
        form.load_sample_data();
        form.fields[1].value.clear();

        let err = form.to_record().unwrap_err();
        assert!(err.contains("Invalid number"), "unexpected message: {err}");
    }

    #[test]
    fn test_entries_echo_code_labels() {
        let mut form = PatientFormState::new(&COMPACT_6);
        form.load_sample_data();

        let entries = form.entries();
        let (_, thal) = entries.last().expect("has entries");
        assert_eq!(thal, "3 (Reversible defect)");
    }
}
