//! Two-phase batch runner.
//!
//! Phase 1 normalizes the batch and builds the cross-claim index; it must
//! complete before phase 2 starts, because the sybil detectors need the full
//! batch view. Phase 2 evaluates claims independently against the immutable
//! index and policy, so large batches fan out across a worker pool; the
//! output is position-indexed and byte-identical to the sequential path.

use crate::config::presets::RiskPolicy;
use crate::config::types::{ClaimRecord, RawClaimRecord, RiskBucket, ScoredClaim};
use crate::index::BatchIndex;
use crate::normalize::record::normalize_batch;
use crate::observability::audit;
use crate::score::report::{assemble, TriageOutcome};
use crate::score::aggregate;
use std::thread;
use uuid::Uuid;

/// Batches below this size are scored on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 64;

/// Score a raw batch under the given policy.
pub fn run(raws: &[RawClaimRecord], policy: &RiskPolicy) -> TriageOutcome {
    let run_id = Uuid::new_v4().to_string();
    audit::run_start(&run_id, &policy.name, raws.len());

    let (claims, unscoreable) = normalize_batch(raws);
    for reject in &unscoreable {
        audit::claim_rejected(&run_id, reject.claim_id.as_deref(), &reject.error.to_string());
    }

    // Phase 1 must finish before any claim is evaluated; partial indexes
    // would silently under-count the cross-claim signals.
    let index = BatchIndex::build(&claims);

    let scored = if claims.len() >= PARALLEL_THRESHOLD {
        score_parallel(&claims, &index, policy)
    } else {
        claims
            .iter()
            .map(|claim| aggregate::score_one(claim, &index, policy))
            .collect()
    };

    let outcome = assemble(scored, unscoreable);
    let high = bucket_count(&outcome.results, RiskBucket::High);
    let medium = bucket_count(&outcome.results, RiskBucket::Medium);
    audit::run_end(
        &run_id,
        &policy.name,
        outcome.results.len(),
        outcome.unscoreable.len(),
        high,
        medium,
    );
    outcome
}

fn bucket_count(results: &[ScoredClaim], bucket: RiskBucket) -> usize {
    results.iter().filter(|r| r.bucket == bucket).count()
}

/// Fan claim evaluation out across a worker pool.
///
/// Workers read only the immutable index and policy; results return tagged
/// with their batch position, so scheduling order cannot leak into output.
fn score_parallel(
    claims: &[ClaimRecord],
    index: &BatchIndex,
    policy: &RiskPolicy,
) -> Vec<ScoredClaim> {
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .clamp(1, claims.len());

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, ScoredClaim)>();
    for position in 0..claims.len() {
        let _ = job_tx.send(position);
    }
    drop(job_tx);

    let mut slots: Vec<Option<ScoredClaim>> = vec![None; claims.len()];

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                while let Ok(position) = job_rx.recv() {
                    let scored = aggregate::score_one(&claims[position], index, policy);
                    if result_tx.send((position, scored)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        while let Ok((position, scored)) = result_rx.recv() {
            slots[position] = Some(scored);
        }
    });

    // A slot can only be empty if a worker died mid-claim; score the claim
    // inline rather than dropping it from the report.
    slots
        .into_iter()
        .enumerate()
        .map(|(position, slot)| {
            slot.unwrap_or_else(|| aggregate::score_one(&claims[position], index, policy))
        })
        .collect()
}
