use crate::thresholds::PredicateBinding;
use crate::types::Verdict;
use framegate_foundation::CaptureError;

/// Stats label used when no provider decided the outcome: either the frame
/// matched nothing, or there were no acceptors configured at all.
pub const NO_PROVIDER_LABEL: &str = "no providers triggered";

/// Maximum classification results requested per provider call.
const MAX_CLASSIFICATION_RESULTS: usize = 100;

/// Reject-first trigger evaluation over two ordered predicate lists.
///
/// Inhibitors are evaluated before acceptors; the first inhibitor match wins
/// outright and stops all further evaluation for the frame. With no acceptors
/// configured the policy defaults to accept, so a camera with only inhibitors
/// sends everything that is not inhibited.
pub struct TriggerPolicy {
    inhibitors: Vec<PredicateBinding>,
    acceptors: Vec<PredicateBinding>,
}

impl TriggerPolicy {
    pub fn new(inhibitors: Vec<PredicateBinding>, acceptors: Vec<PredicateBinding>) -> Self {
        Self {
            inhibitors,
            acceptors,
        }
    }

    pub fn has_acceptors(&self) -> bool {
        !self.acceptors.is_empty()
    }

    /// Evaluate one encoded frame. Provider failures propagate immediately;
    /// retries, if any, belong to the provider implementation.
    pub async fn evaluate(&self, image: &[u8]) -> Result<Verdict, CaptureError> {
        for binding in &self.inhibitors {
            if let Some(label) = Self::first_match(binding, image).await? {
                tracing::debug!(provider = binding.provider.name(), %label, "frame inhibited");
                return Ok(Verdict::Inhibited { label });
            }
        }

        for binding in &self.acceptors {
            if let Some(label) = Self::first_match(binding, image).await? {
                tracing::debug!(provider = binding.provider.name(), %label, "frame accepted");
                return Ok(Verdict::Accepted { label });
            }
        }

        if self.acceptors.is_empty() {
            tracing::debug!("no acceptors configured, defaulting to accept");
            return Ok(Verdict::Accepted {
                label: NO_PROVIDER_LABEL.to_string(),
            });
        }

        Ok(Verdict::Abstained)
    }

    /// Check one binding's classification thresholds, then its detection
    /// thresholds. Returns the first matching label. Provider calls are
    /// skipped entirely for empty threshold maps.
    async fn first_match(
        binding: &PredicateBinding,
        image: &[u8],
    ) -> Result<Option<String>, CaptureError> {
        if !binding.classifications.is_empty() {
            let results = binding
                .provider
                .classify(image, MAX_CLASSIFICATION_RESULTS)
                .await?;
            if let Some(c) = results
                .iter()
                .find(|c| binding.classifications.matches(&c.label, c.score))
            {
                return Ok(Some(c.label.clone()));
            }
        }

        if !binding.detections.is_empty() {
            let results = binding.provider.detect(image).await?;
            if let Some(d) = results
                .iter()
                .find(|d| binding.detections.matches(&d.label, d.score))
            {
                return Ok(Some(d.label.clone()));
            }
        }

        Ok(None)
    }
}
