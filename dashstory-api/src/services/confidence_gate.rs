//! Confidence gate for vision results
//!
//! Low-confidence interpretations are returned to the caller but never
//! spoken aloud.

use crate::models::VisionResult;

/// Minimum confidence required before a vision result is synthesized
pub const CONFIDENCE_THRESHOLD: f64 = 0.6;

pub fn should_synthesize(result: &VisionResult) -> bool {
    result.confidence >= CONFIDENCE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_confidence(confidence: f64) -> VisionResult {
        VisionResult {
            confidence,
            ..Default::default()
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(should_synthesize(&with_confidence(0.6)));
        assert!(should_synthesize(&with_confidence(0.88)));
        assert!(!should_synthesize(&with_confidence(0.59)));
        assert!(!should_synthesize(&with_confidence(0.0)));
    }
}
