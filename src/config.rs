use std::path::PathBuf;

use anyhow::Context;

/// Identifier prefix the trained artifacts are published under.
pub const DEFAULT_ARTIFACT_PREFIX: &str = "lr_model_yellow_tripdata_";

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub artifact_dir: PathBuf,
    pub artifact_prefix: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let artifact_dir = std::env::var("ARTIFACT_DIR")
            .context("ARTIFACT_DIR not set")?
            .into();
        let artifact_prefix = std::env::var("ARTIFACT_PREFIX")
            .unwrap_or_else(|_| DEFAULT_ARTIFACT_PREFIX.to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        Ok(Self {
            artifact_dir,
            artifact_prefix,
            port,
        })
    }
}
