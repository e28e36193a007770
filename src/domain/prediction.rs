//! Screening result types and risk banding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schema::SchemaId;

/// Risk band for heart-disease screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    /// Low risk of heart disease
    Low,
    /// Moderate risk, monitoring recommended
    Moderate,
    /// High risk, intervention recommended
    High,
}

impl RiskBand {
    /// Band a probability with the fixed thresholds.
    ///
    /// Lower boundaries are closed: 0.30 is already Moderate and 0.70
    /// already High.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.3 {
            Self::Low
        } else if probability < 0.7 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Fixed advisory text shown with the band.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - No significant indicators",
            Self::Moderate => "Moderate risk - Follow-up recommended",
            Self::High => "High risk - Immediate consultation advised",
        }
    }

    /// Associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),      // Emerald (#10B981)
            Self::Moderate => (251, 191, 36), // Amber (#FBBF24)
            Self::High => (244, 63, 94),      // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Result of one model query (before presentation).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of the positive ("disease present") class (0.0 to 1.0)
    pub probability: f64,

    /// Binary call at the 0.5 split (0 = absent, 1 = present)
    pub prediction: u8,

    /// Display confidence, |p - 0.5| * 2. Derived only; never fed back
    /// into any decision.
    pub confidence: f64,
}

impl PredictionResult {
    /// Create a new result from the model probability.
    #[must_use]
    pub fn new(probability: f64) -> Self {
        let prediction = if probability >= 0.5 { 1 } else { 0 };
        let confidence = (probability - 0.5).abs() * 2.0;

        Self {
            probability,
            prediction,
            confidence,
        }
    }

    /// Get the risk band for this probability.
    #[must_use]
    pub fn risk_band(&self) -> RiskBand {
        RiskBand::from_probability(self.probability)
    }

    /// Probability mass on the "disease absent" class.
    #[must_use]
    pub fn absence_probability(&self) -> f64 {
        1.0 - self.probability
    }
}

/// Complete screening report for one request.
///
/// Computed fresh per request and never cached across records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Unique identifier
    pub id: String,

    /// The model prediction result
    pub result: PredictionResult,

    /// Risk classification
    pub risk_band: RiskBand,

    /// Backend that produced the result
    pub backend: String,

    /// Model artifact version
    pub model_version: String,

    /// Schema the record was validated against
    pub schema: SchemaId,

    /// Timestamp of the screening
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Create a new report from a prediction result.
    #[must_use]
    pub fn new(
        result: PredictionResult,
        backend: impl Into<String>,
        model_version: impl Into<String>,
        schema: SchemaId,
    ) -> Self {
        Self {
            id: uuid_v4(),
            risk_band: result.risk_band(),
            result,
            backend: backend.into(),
            model_version: model_version.into(),
            schema,
            created_at: Utc::now(),
        }
    }
}

/// Generate a simple UUID v4 (random) using a CSPRNG.
///
/// Uses ChaCha20Rng seeded from OS entropy on all platforms.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}
