/// Stable JSON report schema for triage consumers
///
/// This schema is frozen and backward compatible: downstream renderers and
/// automation key off it. The report carries no run-scoped identifiers or
/// wall-clock fields, so scoring the same batch twice under the same policy
/// produces byte-identical output.
use crate::config::presets::RiskPolicy;
use crate::config::types::{RiskBucket, ScoredClaim, UnscoreableClaim};
use crate::score::TriageOutcome;
use serde::Serialize;

/// Schema version (always "1.0" for v1)
pub const SCHEMA_VERSION: &str = "1.0";

/// Stable report schema for triage consumers (v1)
#[derive(Debug, Serialize)]
pub struct TriageReportV1 {
    pub schema_version: String,

    /// Active policy profile name
    pub policy: String,

    /// Total records in the input batch
    pub claim_count: usize,

    /// Claims that were scored
    pub scored_count: usize,

    /// Scored claims in high/medium buckets
    pub flagged_count: usize,

    /// Scored claims, sorted by score descending then claim_id
    pub results: Vec<ScoredClaim>,

    /// Claims excluded for schema violations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unscoreable: Vec<UnscoreableClaim>,
}

/// Build the frozen report from a run outcome.
pub fn build_report(policy: &RiskPolicy, outcome: TriageOutcome) -> TriageReportV1 {
    let flagged_count = outcome
        .results
        .iter()
        .filter(|r| r.bucket != RiskBucket::Low)
        .count();
    TriageReportV1 {
        schema_version: SCHEMA_VERSION.to_string(),
        policy: policy.name.clone(),
        claim_count: outcome.results.len() + outcome.unscoreable.len(),
        scored_count: outcome.results.len(),
        flagged_count,
        results: outcome.results,
        unscoreable: outcome.unscoreable,
    }
}
