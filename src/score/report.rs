//! Report assembly.
//!
//! The assembler owns the output ordering contract: scored claims sorted by
//! score descending, ties broken by claim_id ascending. Rendering is a
//! downstream concern; this module only produces the ordered structure.

use crate::config::types::{ScoredClaim, UnscoreableClaim};

/// Ordered result of one scoring run.
#[derive(Debug)]
pub struct TriageOutcome {
    pub results: Vec<ScoredClaim>,
    pub unscoreable: Vec<UnscoreableClaim>,
}

/// Sort scored claims into the output order and package them with the
/// unscoreable rejects.
pub fn assemble(mut results: Vec<ScoredClaim>, unscoreable: Vec<UnscoreableClaim>) -> TriageOutcome {
    results.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.claim_id.cmp(&b.claim_id))
    });
    TriageOutcome {
        results,
        unscoreable,
    }
}
