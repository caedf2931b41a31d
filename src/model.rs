use serde::Deserialize;

use crate::error::FareError;
use crate::features::FeatureVector;

#[derive(Debug, Deserialize)]
struct ArtifactPayload {
    weights: Vec<f64>,
    intercept: f64,
}

/// Immutable snapshot of trained model parameters, tagged with the
/// YYYY-MM version token from its storage identifier. Superseded
/// wholesale on refresh, never edited in place.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    weights: Vec<f64>,
    intercept: f64,
    version: String,
}

impl ModelArtifact {
    pub fn new(weights: Vec<f64>, intercept: f64, version: String) -> Self {
        Self {
            weights,
            intercept,
            version,
        }
    }

    /// Deserializes `weights` + `intercept` out of stored bytes. A
    /// missing field is a format error, not a default substitution.
    pub fn from_bytes(id: &str, version: String, bytes: &[u8]) -> Result<Self, FareError> {
        let payload: ArtifactPayload =
            serde_json::from_slice(bytes).map_err(|e| FareError::ArtifactFormat {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(payload.weights, payload.intercept, version))
    }

    pub fn weight_len(&self) -> usize {
        self.weights.len()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `fare = intercept + Σ weight_i · feature_i`.
    ///
    /// Lengths must agree: a skew means the encoder and the artifact
    /// come from different model versions, and truncating or padding
    /// would corrupt the prediction silently. The output is returned
    /// as-is; plausibility filtering is not this layer's job.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, FareError> {
        if self.weights.len() != features.len() {
            return Err(FareError::DimensionMismatch {
                features: features.len(),
                weights: self.weights.len(),
            });
        }
        let dot: f64 = self
            .weights
            .iter()
            .zip(features.as_slice())
            .map(|(w, f)| w * f)
            .sum();
        Ok(self.intercept + dot)
    }
}
