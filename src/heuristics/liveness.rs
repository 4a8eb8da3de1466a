//! Claim liveness detectors.
//!
//! These read only the claim's own timing fields. A claim sitting without a
//! linked PR past the policy deadline, or idle past the stale threshold with
//! no fresh PR activity, signals a parked or abandoned claim.

use crate::config::presets::RiskPolicy;
use crate::config::types::{ClaimRecord, Evaluation, HeuristicCode, RiskSignal};
use crate::heuristics::Heuristic;
use crate::index::BatchIndex;

/// Claim has been open past the policy deadline with no linked PR.
pub struct NoLinkedPr;

impl Heuristic for NoLinkedPr {
    fn code(&self) -> HeuristicCode {
        HeuristicCode::NoLinkedPr24h
    }

    fn evaluate(&self, claim: &ClaimRecord, _: &BatchIndex, policy: &RiskPolicy) -> Evaluation {
        let Some(age_hours) = claim.claim_age_hours else {
            return Evaluation::Abstain {
                code: self.code(),
                reason: "claim_age_hours unknown".to_string(),
            };
        };

        if age_hours >= policy.no_pr_after_hours && claim.linked_pr_url.is_none() {
            return Evaluation::Trigger(RiskSignal {
                code: self.code(),
                weight: policy.no_linked_pr_weight,
                reason: format!("no linked PR after {}h", age_hours.round() as i64),
            });
        }
        Evaluation::Clear
    }
}

/// Claim idle past the stale threshold with no linked-PR activity inside
/// that window.
pub struct StaleSession;

impl StaleSession {
    /// Hours since the linked PR was opened, when both anchors are known.
    fn linked_pr_age_hours(claim: &ClaimRecord) -> Option<f64> {
        let pr_created = claim.linked_pr_created_at?;
        let claim_age = claim.claim_age_hours?;
        let delay_hours =
            pr_created.signed_duration_since(claim.created_at).num_seconds() as f64 / 3600.0;
        Some((claim_age - delay_hours.max(0.0)).max(0.0))
    }
}

impl Heuristic for StaleSession {
    fn code(&self) -> HeuristicCode {
        HeuristicCode::StaleSession72h
    }

    fn evaluate(&self, claim: &ClaimRecord, _: &BatchIndex, policy: &RiskPolicy) -> Evaluation {
        let Some(silence_hours) = claim.silence_hours else {
            return Evaluation::Abstain {
                code: self.code(),
                reason: "silence_hours unknown".to_string(),
            };
        };

        if silence_hours < policy.stale_after_hours {
            return Evaluation::Clear;
        }

        // A PR opened inside the stale window counts as fresh activity. A PR
        // whose age cannot be established is given the benefit of the doubt.
        match Self::linked_pr_age_hours(claim) {
            Some(pr_age) if pr_age < policy.stale_after_hours => return Evaluation::Clear,
            Some(_) => {}
            None if claim.linked_pr_url.is_some() => return Evaluation::Clear,
            None => {}
        }

        Evaluation::Trigger(RiskSignal {
            code: self.code(),
            weight: policy.stale_session_weight,
            reason: format!(
                "idle for {}h with no fresh PR activity",
                silence_hours.round() as i64
            ),
        })
    }
}
