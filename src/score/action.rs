//! Maintainer action recommendation.
//!
//! A small state machine over (bucket, liveness signals, linked-PR state).
//! Precedence when several conditions hold:
//! `release_claim` > `prioritize` > `watch` > `request_details`.
//! A clean low-risk claim maps to no action at all.

use crate::config::presets::RiskPolicy;
use crate::config::types::{ClaimRecord, HeuristicCode, MaintainerAction, RiskBucket};

/// Recommend at most one maintainer action for a scored claim.
pub fn recommend(
    bucket: RiskBucket,
    triggered: &[HeuristicCode],
    abstentions: &[HeuristicCode],
    claim: &ClaimRecord,
    policy: &RiskPolicy,
) -> Option<MaintainerAction> {
    let stale = triggered.contains(&HeuristicCode::StaleSession72h);
    let no_linked_pr = claim.linked_pr_url.is_none();
    let aged = claim
        .claim_age_hours
        .is_some_and(|h| h >= policy.no_pr_after_hours);

    // Abandoned: high risk, gone quiet, nothing in review. Recommend
    // reopening the claim to other contributors.
    if bucket == RiskBucket::High && stale && no_linked_pr {
        return Some(MaintainerAction::ReleaseClaim);
    }

    // Needs attention now: high risk with no PR despite a mature claim.
    if bucket == RiskBucket::High && no_linked_pr && aged {
        return Some(MaintainerAction::Prioritize);
    }

    // Monitor without interrupting: medium risk, or high risk where a PR is
    // actively open.
    if bucket == RiskBucket::Medium || (bucket == RiskBucket::High && claim.has_open_pr()) {
        return Some(MaintainerAction::Watch);
    }

    // Scoring could not see key fields; ask the claimant rather than guess.
    if bucket != RiskBucket::High && !abstentions.is_empty() {
        return Some(MaintainerAction::RequestDetails);
    }

    None
}
