//! Picks the newest model artifact out of a set of stored candidates
//! by the YYYY-MM token embedded in each identifier, e.g.
//! `lr_model_yellow_tripdata_2024-01.json`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::FareError;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}").expect("token pattern compiles"));

/// A storage identifier paired with the version token parsed out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCandidate {
    pub id: String,
    pub token: String,
}

impl ArtifactCandidate {
    /// Parses the embedded token. Identifiers without one are simply
    /// not candidates; the last match wins if several appear.
    pub fn parse(id: &str) -> Option<Self> {
        let token = TOKEN_RE.find_iter(id).last()?.as_str().to_string();
        Some(Self {
            id: id.to_string(),
            token,
        })
    }
}

/// Returns the candidate with the lexicographically greatest token,
/// which for YYYY-MM tokens is the chronologically latest. Ties on the
/// token break by full identifier so selection stays deterministic.
pub fn select_latest<I, S>(ids: I) -> Result<ArtifactCandidate, FareError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter()
        .filter_map(|id| ArtifactCandidate::parse(id.as_ref()))
        .max_by(|a, b| a.token.cmp(&b.token).then_with(|| a.id.cmp(&b.id)))
        .ok_or(FareError::ArtifactNotFound)
}
