//! Feature assembly: validated records into backend-shaped vectors.

use serde::{Deserialize, Serialize};

use super::patient::PatientRecord;
use super::schema::{FieldSchema, SchemaId};

/// Ordered model input derived from a [`PatientRecord`].
///
/// `numeric` and `categorical` follow the schema's declared group orders
/// exactly. The orders are part of the trained model's input contract:
/// reordering silently breaks inference correctness, so the vector is
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub numeric: Vec<f64>,
    pub categorical: Vec<i64>,
}

impl FeatureVector {
    /// Total feature count across both groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }
}

/// Schema/backend mismatch while shaping or consuming features.
///
/// This is a bug class, not a user input problem: it means the schema and
/// the active backend disagree. Callers abort loudly instead of degrading.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("expected {expected} fields for {schema}, got {got}")]
    FieldCount {
        schema: SchemaId,
        expected: usize,
        got: usize,
    },

    #[error("record is missing field {field}")]
    MissingField { field: &'static str },

    #[error("field {field} is not a categorical code")]
    NotACode { field: &'static str },

    #[error("record uses schema {record}, backend expects {backend}")]
    SchemaMismatch { record: SchemaId, backend: SchemaId },

    #[error("expected {expected} {group} features, got {got}")]
    GroupWidth {
        group: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("categorical code {code} outside embedding cardinality {cardinality}")]
    CodeRange { code: i64, cardinality: usize },

    #[error("expected a single score row, got batch of {rows}")]
    Batch { rows: usize },

    #[error("model produced no scores")]
    EmptyScores,
}

/// Shape a validated record into the vector layout `schema` declares.
///
/// Deterministic: assembling the same record twice yields bit-identical
/// vectors.
///
/// # Errors
/// Returns `ShapeError` if the record does not carry exactly the
/// schema's fields, or a grouped field has the wrong value kind.
pub fn assemble(record: &PatientRecord, schema: &FieldSchema) -> Result<FeatureVector, ShapeError> {
    let expected = schema.numeric_order.len() + schema.categorical_order.len();
    if record.len() != expected {
        return Err(ShapeError::FieldCount {
            schema: schema.id,
            expected,
            got: record.len(),
        });
    }

    let mut numeric = Vec::with_capacity(schema.numeric_order.len());
    for &field in schema.numeric_order {
        let value = record
            .get(field)
            .ok_or(ShapeError::MissingField { field })?;
        numeric.push(value.as_f64());
    }

    let mut categorical = Vec::with_capacity(schema.categorical_order.len());
    for &field in schema.categorical_order {
        let value = record
            .get(field)
            .ok_or(ShapeError::MissingField { field })?;
        categorical.push(value.as_code().ok_or(ShapeError::NotACode { field })?);
    }

    Ok(FeatureVector {
        numeric,
        categorical,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{CLEVELAND_13, COMPACT_6};

    fn compact6_record() -> PatientRecord {
        PatientRecord::from_values(
            SchemaId::Compact6,
            &[
                ("oldpeak", 1.4),
                ("cp", 3.0),
                ("exang", 0.0),
                ("slope", 2.0),
                ("ca", 0.0),
                ("thal", 1.0),
            ],
        )
        .expect("valid record")
    }

    fn cleveland13_record() -> PatientRecord {
        PatientRecord::from_values(
            SchemaId::Cleveland13,
            &[
                ("age", 55.0),
                ("sex", 1.0),
                ("cp", 4.0),
                ("trestbps", 138.0),
                ("chol", 250.0),
                ("fbs", 0.0),
                ("restecg", 1.0),
                ("thalach", 142.0),
                ("exang", 1.0),
                ("oldpeak", 2.1),
                ("slope", 2.0),
                ("ca", 1.0),
                ("thal", 7.0),
            ],
        )
        .expect("valid record")
    }

    #[test]
    fn test_flat_row_for_estimator_schema() {
        let vector = assemble(&cleveland13_record(), &CLEVELAND_13).expect("assembles");
        assert_eq!(vector.numeric.len(), 13);
        assert!(vector.categorical.is_empty());
        // Declared order, codes cast in place.
        assert_eq!(vector.numeric[0], 55.0);
        assert_eq!(vector.numeric[2], 4.0);
        assert_eq!(vector.numeric[12], 7.0);
    }

    #[test]
    fn test_split_groups_for_tensor_schema() {
        let vector = assemble(&compact6_record(), &COMPACT_6).expect("assembles");
        assert_eq!(vector.numeric, vec![1.4]);
        assert_eq!(vector.categorical, vec![3, 0, 2, 0, 1]);
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let record = compact6_record();
        let first = assemble(&record, &COMPACT_6).expect("assembles");
        let second = assemble(&record, &COMPACT_6).expect("assembles");
        assert_eq!(first, second);
    }

    #[test]
    fn test_incomplete_record_is_shape_error() {
        let mut record = PatientRecord::new(SchemaId::Compact6);
        record.set("oldpeak", 1.0).expect("valid");
        let err = assemble(&record, &COMPACT_6).unwrap_err();
        assert_eq!(
            err,
            ShapeError::FieldCount {
                schema: SchemaId::Compact6,
                expected: 6,
                got: 1,
            }
        );
    }
}
