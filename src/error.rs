use thiserror::Error;

/// Failure taxonomy for the fare core. The HTTP layer maps these onto
/// status codes; the core never folds a failure into a numeric output.
#[derive(Debug, Error)]
pub enum FareError {
    /// Malformed or out-of-range ride fields. A client-side fault.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The store listed no identifier carrying a version token.
    #[error("no model artifact found in the store")]
    ArtifactNotFound,

    /// A stored artifact was present but unreadable as weights + intercept.
    #[error("malformed model artifact `{id}`: {reason}")]
    ArtifactFormat { id: String, reason: String },

    /// Feature vector length and weight vector length disagree; the
    /// encoder and the artifact are from different model versions.
    #[error("dimension mismatch: {features} features vs {weights} weights")]
    DimensionMismatch { features: usize, weights: usize },

    /// Propagated from the artifact store collaborator, not retried here.
    #[error("artifact store i/o: {0}")]
    StoreIo(#[from] std::io::Error),
}
