//! Per-claim aggregation.
//!
//! Runs every registered evaluator against one claim, then folds the
//! triggered signals into a score, a bucket, and an ordered reason list
//! under the active policy. The score is the raw weighted sum; no
//! normalization or cap is applied.

use crate::config::presets::RiskPolicy;
use crate::config::types::{ClaimRecord, Evaluation, RiskBucket, ScoredClaim};
use crate::heuristics::{evaluate_isolated, registry};
use crate::index::BatchIndex;
use crate::score::action;

/// Bucket assignment from the aggregate score.
pub fn bucket_for(score: u32, policy: &RiskPolicy) -> RiskBucket {
    if score >= policy.high_cut {
        RiskBucket::High
    } else if score >= policy.medium_cut {
        RiskBucket::Medium
    } else {
        RiskBucket::Low
    }
}

/// Score one claim against the immutable batch snapshot.
pub fn score_one(claim: &ClaimRecord, index: &BatchIndex, policy: &RiskPolicy) -> ScoredClaim {
    let mut signals = Vec::new();
    let mut abstentions = Vec::new();

    for heuristic in registry() {
        match evaluate_isolated(*heuristic, claim, index, policy) {
            Evaluation::Trigger(signal) => signals.push(signal),
            Evaluation::Abstain { code, .. } => abstentions.push(code),
            Evaluation::Clear => {}
        }
    }

    // Descending contribution; equal weights keep evaluator declaration order.
    signals.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then_with(|| a.code.rank().cmp(&b.code.rank()))
    });

    let score: u32 = signals.iter().map(|s| s.weight).sum();
    let bucket = bucket_for(score, policy);
    let codes: Vec<_> = signals.iter().map(|s| s.code).collect();
    let reasons: Vec<_> = signals.into_iter().map(|s| s.reason).collect();
    let action = action::recommend(bucket, &codes, &abstentions, claim, policy);

    ScoredClaim {
        claim_id: claim.claim_id.clone(),
        user: claim.user.clone(),
        issue_ref: claim.issue_ref.clone(),
        score,
        bucket,
        reasons,
        codes,
        abstentions,
        action,
        claim_age_hours: claim.claim_age_hours,
        silence_hours: claim.silence_hours,
        linked_pr_state: claim.linked_pr_state.clone(),
    }
}
