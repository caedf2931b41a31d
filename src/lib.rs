//! Taxi fare estimation core: deterministic feature engineering, linear
//! inference, and versioned model artifact selection.
//!
//! A ride request flows through the [`FeatureAssembler`], which runs the
//! encoders in a fixed contract order, and the resulting vector is dotted
//! with the weights of the artifact currently held by [`ModelCache`].
//! Artifacts live in an external [`store::ArtifactStore`] and are picked
//! by the newest YYYY-MM token embedded in their identifiers.

pub mod cache;
pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod request;
pub mod selector;
pub mod store;

pub use cache::ModelCache;
pub use error::FareError;
pub use features::{FeatureAssembler, FeatureVector};
pub use model::ModelArtifact;
pub use request::RideRequest;
pub use selector::ArtifactCandidate;
pub use store::{ArtifactStore, FsArtifactStore};
