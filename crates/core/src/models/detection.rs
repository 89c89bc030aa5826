//! Plate detection results

use serde::{Deserialize, Serialize};

/// Where a detected plate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionSource {
    /// Recognised by the detection service
    Backend,
    /// Generated locally because the service could not be used
    Mock,
}

/// A successfully detected plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub license_plate_number: String,
    /// Recognition confidence in `0.0..=1.0`
    pub confidence: f64,
    pub source: DetectionSource,
}

impl Detection {
    /// Confidence as a rounded percentage
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round().clamp(0.0, 100.0) as u32
    }

    pub fn is_mock(&self) -> bool {
        self.source == DetectionSource::Mock
    }
}

/// Outcome of a detection request the service answered
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    Found(Detection),
    NotFound { message: String },
}
