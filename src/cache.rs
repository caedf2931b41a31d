use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::FareError;
use crate::model::ModelArtifact;
use crate::selector;
use crate::store::ArtifactStore;

/// Process-wide holder of the active model artifact.
///
/// Readers clone the current `Arc`; `refresh()` builds the replacement
/// fully off to the side and publishes it in one swap, so a reader
/// never observes a torn weights/intercept pair. A failed refresh
/// leaves the previous artifact in place. Concurrent refreshes race
/// safely with last-writer-wins ordering.
pub struct ModelCache {
    current: RwLock<Option<Arc<ModelArtifact>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// The active artifact, or `None` when nothing has loaded yet.
    pub fn get(&self) -> Option<Arc<ModelArtifact>> {
        self.current.read().clone()
    }

    /// One load attempt: list, select the newest candidate, read and
    /// deserialize it, check its dimension against the encoder width,
    /// then swap it in. No internal retries; retry policy belongs to
    /// the caller.
    pub fn refresh(
        &self,
        store: &dyn ArtifactStore,
        prefix: &str,
        expected_len: usize,
    ) -> Result<Arc<ModelArtifact>, FareError> {
        let ids = store.list(prefix)?;
        let candidate = selector::select_latest(&ids)?;
        tracing::info!(
            "loading model artifact {} (token {})",
            candidate.id,
            candidate.token
        );

        let bytes = store.read(&candidate.id)?;
        let artifact = ModelArtifact::from_bytes(&candidate.id, candidate.token, &bytes)?;
        if artifact.weight_len() != expected_len {
            return Err(FareError::DimensionMismatch {
                features: expected_len,
                weights: artifact.weight_len(),
            });
        }

        let artifact = Arc::new(artifact);
        *self.current.write() = Some(Arc::clone(&artifact));
        tracing::info!("model artifact {} published", artifact.version());
        Ok(artifact)
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}
