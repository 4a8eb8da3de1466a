//! Heuristic evaluators.
//!
//! Each detector is a pure function of (claim, batch index, policy) and is
//! registered here rather than hard-coded in the aggregator, so detectors
//! can be tested in isolation and added without touching scoring. Evaluators
//! are independent and order-insensitive; the registry order only breaks
//! ties when two signals contribute equal weight.

pub mod account;
pub mod liveness;
pub mod similarity;
pub mod sybil;

use crate::config::presets::RiskPolicy;
use crate::config::types::{ClaimRecord, Evaluation, HeuristicCode};
use crate::index::BatchIndex;
use log::error;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// One pluggable risk detector.
pub trait Heuristic: Sync {
    fn code(&self) -> HeuristicCode;

    /// Evaluate one claim against the immutable batch snapshot. Must not
    /// mutate shared state; missing input is an abstention, never an error.
    fn evaluate(&self, claim: &ClaimRecord, index: &BatchIndex, policy: &RiskPolicy)
        -> Evaluation;
}

/// Evaluator registry, in declaration order (matches `HeuristicCode::ALL`).
pub fn registry() -> &'static [&'static dyn Heuristic] {
    static REGISTRY: [&dyn Heuristic; 9] = [
        &account::AccountAge,
        &liveness::NoLinkedPr,
        &liveness::StaleSession,
        &sybil::ClaimVelocity,
        &sybil::RepoSpread,
        &sybil::WalletReuse,
        &sybil::ProofDuplicate,
        &similarity::TextSimilarity,
        &similarity::SelfTemplateReuse,
    ];
    &REGISTRY
}

/// Run one evaluator with fault isolation.
///
/// An evaluator fault must never abort sibling evaluators or the batch: it
/// is caught, logged, and recorded as an abstention with a diagnostic reason.
pub fn evaluate_isolated(
    heuristic: &dyn Heuristic,
    claim: &ClaimRecord,
    index: &BatchIndex,
    policy: &RiskPolicy,
) -> Evaluation {
    match catch_unwind(AssertUnwindSafe(|| heuristic.evaluate(claim, index, policy))) {
        Ok(evaluation) => evaluation,
        Err(payload) => {
            let detail = panic_detail(payload.as_ref());
            let code = heuristic.code();
            error!(
                "evaluator {} faulted on claim {}: {}",
                code, claim.claim_id, detail
            );
            crate::observability::audit::evaluator_fault(&claim.claim_id, code, &detail);
            Evaluation::Abstain {
                code,
                reason: format!("evaluator fault: {}", detail),
            }
        }
    }
}

fn panic_detail(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
