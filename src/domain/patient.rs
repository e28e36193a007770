//! Patient record assembled from validated form input.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schema::{SchemaId, ValidatedValue, ValidationError};

/// One patient's validated field values for a single screening request.
///
/// Values only enter through [`crate::domain::FieldSchema::validate`], so
/// a constructed record is always within the declared domain of its
/// schema. Records are request-scoped: created fresh per screening,
/// never persisted, no identity beyond the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    schema: SchemaId,
    values: BTreeMap<String, ValidatedValue>,

    /// Timestamp of data entry
    pub created_at: DateTime<Utc>,
}

impl PatientRecord {
    /// Create an empty record speaking the given schema.
    #[must_use]
    pub fn new(schema: SchemaId) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Validate and store one field value.
    ///
    /// # Errors
    /// Returns `ValidationError` if the value fails the schema's checks;
    /// the record is left unchanged in that case.
    pub fn set(&mut self, field: &str, raw: f64) -> Result<(), ValidationError> {
        let value = self.schema.schema().validate(field, raw)?;
        self.values.insert(field.to_string(), value);
        Ok(())
    }

    /// Build a record from `(field, raw value)` pairs, validating each.
    ///
    /// # Errors
    /// Returns the first `ValidationError` encountered.
    pub fn from_values(schema: SchemaId, raw: &[(&str, f64)]) -> Result<Self, ValidationError> {
        let mut record = Self::new(schema);
        for (field, value) in raw {
            record.set(field, *value)?;
        }
        Ok(record)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<ValidatedValue> {
        self.values.get(field).copied()
    }

    #[must_use]
    pub fn schema_id(&self) -> SchemaId {
        self.schema
    }

    /// Number of fields currently set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_validates_through_schema() {
        let mut record = PatientRecord::new(SchemaId::Cleveland13);
        record.set("age", 55.0).expect("valid age");
        assert_eq!(record.get("age"), Some(ValidatedValue::Numeric(55.0)));

        let err = record.set("age", 101.0).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "age", .. }
        ));
        // Failed set leaves the previous value in place.
        assert_eq!(record.get("age"), Some(ValidatedValue::Numeric(55.0)));
    }

    #[test]
    fn test_from_values_stops_at_first_error() {
        let result = PatientRecord::from_values(
            SchemaId::Compact6,
            &[("oldpeak", 1.0), ("cp", 7.0), ("exang", 0.0)],
        );
        assert!(matches!(
            result,
            Err(ValidationError::UnknownCode { field: "cp", code: 7, .. })
        ));
    }

    #[test]
    fn test_codes_stored_as_codes() {
        let record =
            PatientRecord::from_values(SchemaId::Compact6, &[("thal", 2.0)]).expect("valid");
        assert_eq!(record.get("thal"), Some(ValidatedValue::Code(2)));
        assert_eq!(record.get("thal").and_then(ValidatedValue::as_code), Some(2));
    }
}
