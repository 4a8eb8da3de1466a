//! Input document loading.
//!
//! The engine consumes an already-fetched batch: a JSON document with a
//! `claims` array. Reading or parsing failures are fatal for the run and
//! surface as non-zero exit codes at the CLI; per-claim problems are not
//! handled here, they degrade later in the normalizer.

use crate::config::types::{RawClaimRecord, Result, TriageError};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct ClaimBatch {
    #[serde(default)]
    pub claims: Vec<RawClaimRecord>,
}

/// Parse a claims document from a JSON string.
pub fn parse_claims(raw: &str) -> Result<Vec<RawClaimRecord>> {
    let batch: ClaimBatch = serde_json::from_str(raw)
        .map_err(|e| TriageError::Input(format!("malformed claims document: {}", e)))?;
    Ok(batch.claims)
}

/// Load a claims document from a file.
pub fn load_claims(path: &Path) -> Result<Vec<RawClaimRecord>> {
    let raw = std::fs::read_to_string(path)?;
    parse_claims(&raw)
}
