//! Offline demo detection
//!
//! When the detection service cannot be used the client can fabricate a
//! result so the workflow stays demoable. Results are always tagged
//! [`DetectionSource::Mock`].

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Detection, DetectionSource};

/// Plates the mock generator picks from
pub const MOCK_PLATES: [&str; 5] = ["ABC123", "XYZ789", "DEF456", "GHI789", "JKL012"];

pub const MOCK_MIN_CONFIDENCE: f64 = 0.85;
pub const MOCK_MAX_CONFIDENCE: f64 = 1.0;

/// Generate a mock detection with the thread RNG
pub fn mock_detection() -> Detection {
    mock_detection_with(&mut rand::thread_rng())
}

/// Generate a mock detection from the given RNG.
///
/// Confidence is uniform in `[0.85, 1.0]`, rounded to two decimals.
pub fn mock_detection_with<R: Rng + ?Sized>(rng: &mut R) -> Detection {
    let plate = MOCK_PLATES
        .choose(rng)
        .copied()
        .unwrap_or(MOCK_PLATES[0]);
    let raw = rng.gen_range(MOCK_MIN_CONFIDENCE..=MOCK_MAX_CONFIDENCE);
    let confidence = ((raw * 100.0).round() / 100.0).clamp(MOCK_MIN_CONFIDENCE, MOCK_MAX_CONFIDENCE);

    Detection {
        license_plate_number: plate.to_string(),
        confidence,
        source: DetectionSource::Mock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_mock_detection_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let d = mock_detection_with(&mut rng);
            assert!(MOCK_PLATES.contains(&d.license_plate_number.as_str()));
            assert!((MOCK_MIN_CONFIDENCE..=MOCK_MAX_CONFIDENCE).contains(&d.confidence));
            assert!((85..=100).contains(&d.confidence_percent()));
            assert!(d.is_mock());
        }
    }

    #[test]
    fn test_mock_detection_uses_every_plate() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(mock_detection_with(&mut rng).license_plate_number);
        }
        assert_eq!(seen.len(), MOCK_PLATES.len());
    }
}
