//! Clinical field schemas for heart-disease screening.
//!
//! Two schemas exist because the two model backends were trained against
//! different encodings of the same clinical concepts (chest pain is 1-4
//! for the estimator, 0-3 for the tensor model; thal is {3,6,7} vs
//! {0..3}). They stay separate named schemas: merging the code sets would
//! silently change a backend's input contract.

use serde::{Deserialize, Serialize};

/// Identifies which named schema a record or backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaId {
    /// Full 13-feature Cleveland encoding, used by the estimator backend.
    Cleveland13,
    /// Reduced 6-feature encoding, used by the tensor backend.
    Compact6,
}

impl SchemaId {
    /// The schema definition this id names.
    #[must_use]
    pub fn schema(self) -> &'static FieldSchema {
        match self {
            Self::Cleveland13 => &CLEVELAND_13,
            Self::Compact6 => &COMPACT_6,
        }
    }
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cleveland13 => write!(f, "cleveland13"),
            Self::Compact6 => write!(f, "compact6"),
        }
    }
}

/// Value domain of a single clinical field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Continuous value with inclusive bounds.
    Numeric { min: f64, max: f64 },
    /// Ordinal code drawn from a fixed set, each code with a display label.
    Categorical { codes: &'static [(i64, &'static str)] },
}

/// Declaration of one clinical input field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Dataset column name (e.g. `trestbps`).
    pub name: &'static str,
    /// Human-readable prompt for the form.
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    #[must_use]
    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Categorical { .. })
    }

    /// Display label for a categorical code, if the code is declared.
    #[must_use]
    pub fn code_label(&self, code: i64) -> Option<&'static str> {
        match self.kind {
            FieldKind::Categorical { codes } => codes
                .iter()
                .find(|(c, _)| *c == code)
                .map(|(_, label)| *label),
            FieldKind::Numeric { .. } => None,
        }
    }
}

/// A raw value that passed schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ValidatedValue {
    Numeric(f64),
    Code(i64),
}

impl ValidatedValue {
    /// Value as the flat numeric representation (codes cast).
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Numeric(v) => v,
            Self::Code(c) => c as f64,
        }
    }

    /// Value as a categorical code, if it is one.
    #[must_use]
    pub fn as_code(self) -> Option<i64> {
        match self {
            Self::Code(c) => Some(c),
            Self::Numeric(_) => None,
        }
    }
}

/// Validation failures for submitted field values.
///
/// These are caller errors, surfaced before any inference attempt.
/// Values are never clamped into range or defaulted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} code {code} is not part of the {schema} schema")]
    UnknownCode {
        field: &'static str,
        code: i64,
        schema: SchemaId,
    },

    #[error("{field} {value} must be a whole code")]
    NotACode { field: &'static str, value: f64 },

    #[error("unknown field {field} for schema {schema}")]
    UnknownField { field: String, schema: SchemaId },
}

/// A named, immutable set of field declarations plus the feature-group
/// ordering the paired backend was trained with.
pub struct FieldSchema {
    pub id: SchemaId,
    /// All fields in form display order.
    pub fields: &'static [FieldSpec],
    /// Continuous-group assembly order. This order is part of the
    /// backend's input contract and must never be rearranged.
    pub numeric_order: &'static [&'static str],
    /// Categorical-group assembly order, same contract.
    pub categorical_order: &'static [&'static str],
}

impl FieldSchema {
    /// Look up a field declaration by dataset name.
    #[must_use]
    pub fn describe(&self, field: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.name == field)
    }

    /// Total number of fields a complete record must carry.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Validate one raw value against its field declaration.
    ///
    /// # Errors
    /// Returns `ValidationError` if the field is unknown, the value lies
    /// outside the declared bounds, or a categorical code is not in the
    /// enumerated set.
    pub fn validate(&self, field: &str, raw: f64) -> Result<ValidatedValue, ValidationError> {
        let spec = self
            .describe(field)
            .ok_or_else(|| ValidationError::UnknownField {
                field: field.to_string(),
                schema: self.id,
            })?;

        match spec.kind {
            FieldKind::Numeric { min, max } => {
                if (min..=max).contains(&raw) {
                    Ok(ValidatedValue::Numeric(raw))
                } else {
                    Err(ValidationError::OutOfRange {
                        field: spec.name,
                        value: raw,
                        min,
                        max,
                    })
                }
            }
            FieldKind::Categorical { codes } => {
                if raw.fract() != 0.0 || !raw.is_finite() {
                    return Err(ValidationError::NotACode {
                        field: spec.name,
                        value: raw,
                    });
                }
                let code = raw as i64;
                if codes.iter().any(|(c, _)| *c == code) {
                    Ok(ValidatedValue::Code(code))
                } else {
                    Err(ValidationError::UnknownCode {
                        field: spec.name,
                        code,
                        schema: self.id,
                    })
                }
            }
        }
    }
}

const YES_NO: &[(i64, &str)] = &[(0, "No"), (1, "Yes")];

/// Full 13-feature Cleveland schema (estimator backend).
///
/// Ranges and code labels follow the processed Cleveland dataset the
/// estimator was trained on. All 13 fields assemble into one flat
/// numeric row, categorical codes cast in place.
pub static CLEVELAND_13: FieldSchema = FieldSchema {
    id: SchemaId::Cleveland13,
    fields: &[
        FieldSpec {
            name: "age",
            label: "Age (years)",
            kind: FieldKind::Numeric { min: 20.0, max: 100.0 },
        },
        FieldSpec {
            name: "sex",
            label: "Sex",
            kind: FieldKind::Categorical {
                codes: &[(0, "Female"), (1, "Male")],
            },
        },
        FieldSpec {
            name: "cp",
            label: "Chest pain type",
            kind: FieldKind::Categorical {
                codes: &[
                    (1, "Typical angina"),
                    (2, "Atypical angina"),
                    (3, "Non-anginal pain"),
                    (4, "Asymptomatic"),
                ],
            },
        },
        FieldSpec {
            name: "trestbps",
            label: "Resting blood pressure (mm Hg)",
            kind: FieldKind::Numeric { min: 80.0, max: 220.0 },
        },
        FieldSpec {
            name: "chol",
            label: "Serum cholesterol (mg/dl)",
            kind: FieldKind::Numeric { min: 100.0, max: 600.0 },
        },
        FieldSpec {
            name: "fbs",
            label: "Fasting blood sugar > 120 mg/dl",
            kind: FieldKind::Categorical { codes: YES_NO },
        },
        FieldSpec {
            name: "restecg",
            label: "Resting ECG result",
            kind: FieldKind::Categorical {
                codes: &[
                    (0, "Normal"),
                    (1, "ST-T wave abnormality"),
                    (2, "Left ventricular hypertrophy"),
                ],
            },
        },
        FieldSpec {
            name: "thalach",
            label: "Maximum heart rate (bpm)",
            kind: FieldKind::Numeric { min: 60.0, max: 220.0 },
        },
        FieldSpec {
            name: "exang",
            label: "Exercise-induced angina",
            kind: FieldKind::Categorical { codes: YES_NO },
        },
        FieldSpec {
            name: "oldpeak",
            label: "Exercise-induced ST depression",
            kind: FieldKind::Numeric { min: 0.0, max: 7.0 },
        },
        FieldSpec {
            name: "slope",
            label: "Peak exercise ST slope",
            kind: FieldKind::Categorical {
                codes: &[(1, "Upsloping"), (2, "Flat"), (3, "Downsloping")],
            },
        },
        FieldSpec {
            name: "ca",
            label: "Major vessels colored by fluoroscopy",
            kind: FieldKind::Categorical {
                codes: &[(0, "0"), (1, "1"), (2, "2"), (3, "3"), (4, "4")],
            },
        },
        FieldSpec {
            name: "thal",
            label: "Thalassemia result",
            kind: FieldKind::Categorical {
                codes: &[(3, "Normal"), (6, "Fixed defect"), (7, "Reversible defect")],
            },
        },
    ],
    numeric_order: &[
        "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang",
        "oldpeak", "slope", "ca", "thal",
    ],
    categorical_order: &[],
};

/// Reduced 6-feature schema (tensor backend).
///
/// The tensor model takes a strict split: oldpeak alone in the
/// continuous group, five 0-based codes in the categorical group.
pub static COMPACT_6: FieldSchema = FieldSchema {
    id: SchemaId::Compact6,
    fields: &[
        FieldSpec {
            name: "oldpeak",
            label: "Exercise-induced ST depression",
            kind: FieldKind::Numeric { min: -3.0, max: 7.0 },
        },
        FieldSpec {
            name: "cp",
            label: "Chest pain type",
            kind: FieldKind::Categorical {
                codes: &[
                    (0, "Typical angina"),
                    (1, "Atypical angina"),
                    (2, "Non-anginal pain"),
                    (3, "Asymptomatic"),
                ],
            },
        },
        FieldSpec {
            name: "exang",
            label: "Exercise-induced angina",
            kind: FieldKind::Categorical { codes: YES_NO },
        },
        FieldSpec {
            name: "slope",
            label: "Peak exercise ST slope",
            kind: FieldKind::Categorical {
                codes: &[(0, "Upsloping"), (1, "Flat"), (2, "Downsloping")],
            },
        },
        FieldSpec {
            name: "ca",
            label: "Major vessels colored by fluoroscopy",
            kind: FieldKind::Categorical {
                codes: &[(0, "0"), (1, "1"), (2, "2"), (3, "3")],
            },
        },
        FieldSpec {
            name: "thal",
            label: "Thalassemia result",
            kind: FieldKind::Categorical {
                codes: &[
                    (0, "Unknown"),
                    (1, "Normal"),
                    (2, "Fixed defect"),
                    (3, "Reversible defect"),
                ],
            },
        },
    ],
    numeric_order: &["oldpeak"],
    categorical_order: &["cp", "exang", "slope", "ca", "thal"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_bounds_inclusive() {
        assert!(CLEVELAND_13.validate("age", 100.0).is_ok());
        assert!(CLEVELAND_13.validate("age", 101.0).is_err());
        assert!(CLEVELAND_13.validate("age", 20.0).is_ok());
        assert!(CLEVELAND_13.validate("age", 19.0).is_err());

        assert!(CLEVELAND_13.validate("oldpeak", 7.0).is_ok());
        assert!(CLEVELAND_13.validate("oldpeak", 7.1).is_err());

        // The reduced schema allows negative ST depression.
        assert!(COMPACT_6.validate("oldpeak", -3.0).is_ok());
        assert!(CLEVELAND_13.validate("oldpeak", -0.5).is_err());
    }

    #[test]
    fn test_unlisted_code_rejected() {
        let err = CLEVELAND_13.validate("thal", 5.0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownCode {
                field: "thal",
                code: 5,
                schema: SchemaId::Cleveland13,
            }
        );

        // The same clinical concept uses a different code set per schema.
        assert!(CLEVELAND_13.validate("thal", 3.0).is_ok());
        assert!(COMPACT_6.validate("thal", 3.0).is_ok());
        assert!(COMPACT_6.validate("thal", 6.0).is_err());
        assert!(CLEVELAND_13.validate("cp", 4.0).is_ok());
        assert!(COMPACT_6.validate("cp", 4.0).is_err());
    }

    #[test]
    fn test_fractional_code_rejected() {
        let err = CLEVELAND_13.validate("cp", 2.5).unwrap_err();
        assert!(matches!(err, ValidationError::NotACode { field: "cp", .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = COMPACT_6.validate("chol", 200.0).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { .. }));
    }

    #[test]
    fn test_code_labels_total_and_injective() {
        for schema in [&CLEVELAND_13, &COMPACT_6] {
            for spec in schema.fields {
                let FieldKind::Categorical { codes } = spec.kind else {
                    continue;
                };
                for (code, _) in codes {
                    // Total: every declared code resolves to a label.
                    assert!(spec.code_label(*code).is_some());
                    // Injective: each code is declared exactly once.
                    assert_eq!(codes.iter().filter(|(c, _)| c == code).count(), 1);
                }
                assert_eq!(spec.code_label(99), None);
            }
        }
    }

    #[test]
    fn test_group_orders_cover_all_fields() {
        for schema in [&CLEVELAND_13, &COMPACT_6] {
            let grouped = schema.numeric_order.len() + schema.categorical_order.len();
            assert_eq!(grouped, schema.field_count());
            for field in schema
                .numeric_order
                .iter()
                .chain(schema.categorical_order)
            {
                assert!(schema.describe(field).is_some(), "{field} not declared");
            }
        }
    }
}
