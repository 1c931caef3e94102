use crate::provider::VisionProvider;
use std::collections::HashMap;
use std::sync::Arc;

/// Threshold entry applied when no exact label entry matched.
pub const WILDCARD_LABEL: &str = "*";

/// Minimum-confidence thresholds keyed by label. A score matches only when it
/// is strictly greater than the configured minimum; the wildcard entry is
/// consulted even when an exact entry exists but did not match.
#[derive(Debug, Clone, Default)]
pub struct ThresholdMap {
    thresholds: HashMap<String, f64>,
}

impl ThresholdMap {
    pub fn new(thresholds: HashMap<String, f64>) -> Self {
        Self { thresholds }
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn matches(&self, label: &str, score: f64) -> bool {
        if let Some(&min) = self.thresholds.get(label) {
            if score > min {
                return true;
            }
        }

        if let Some(&min) = self.thresholds.get(WILDCARD_LABEL) {
            if score > min {
                return true;
            }
        }

        false
    }
}

impl<const N: usize> From<[(&str, f64); N]> for ThresholdMap {
    fn from(entries: [(&str, f64); N]) -> Self {
        Self::new(
            entries
                .into_iter()
                .map(|(label, min)| (label.to_string(), min))
                .collect(),
        )
    }
}

/// One vision service together with the thresholds it is evaluated against.
/// Whether a binding inhibits or accepts is decided by which list the policy
/// holds it in, not by a flag on the binding itself.
#[derive(Clone)]
pub struct PredicateBinding {
    pub provider: Arc<dyn VisionProvider>,
    pub classifications: ThresholdMap,
    pub detections: ThresholdMap,
}

impl PredicateBinding {
    pub fn new(
        provider: Arc<dyn VisionProvider>,
        classifications: ThresholdMap,
        detections: ThresholdMap,
    ) -> Self {
        Self {
            provider,
            classifications,
            detections,
        }
    }
}
