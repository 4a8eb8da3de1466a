//! Sybil and collusion detectors.
//!
//! These are the cross-claim signals: none of them can be computed from a
//! single record, so they all consult the batch index. Wallet and proof
//! reuse are symmetric by construction; every claim in a colluding group
//! receives the same signal.

use crate::config::presets::RiskPolicy;
use crate::config::types::{ClaimRecord, Evaluation, HeuristicCode, RiskSignal};
use crate::heuristics::Heuristic;
use crate::index::BatchIndex;

/// Burst of claims by one user inside the policy's sliding window.
pub struct ClaimVelocity;

impl Heuristic for ClaimVelocity {
    fn code(&self) -> HeuristicCode {
        HeuristicCode::ClaimVelocity
    }

    fn evaluate(&self, claim: &ClaimRecord, index: &BatchIndex, policy: &RiskPolicy) -> Evaluation {
        let count = index.claims_within(
            &claim.user,
            claim.created_at,
            policy.velocity_window_hours,
        );

        let weight = if count >= policy.high_velocity_claims {
            policy.high_velocity_weight
        } else if count >= policy.medium_velocity_claims {
            policy.medium_velocity_weight
        } else {
            return Evaluation::Clear;
        };

        Evaluation::Trigger(RiskSignal {
            code: self.code(),
            weight,
            reason: format!(
                "{} claims in {}h window",
                count,
                policy.velocity_window_hours.round() as i64
            ),
        })
    }
}

/// One user claiming across many distinct repos.
pub struct RepoSpread;

impl Heuristic for RepoSpread {
    fn code(&self) -> HeuristicCode {
        HeuristicCode::RepoSpread
    }

    fn evaluate(&self, claim: &ClaimRecord, index: &BatchIndex, policy: &RiskPolicy) -> Evaluation {
        let spread = index.repo_spread(&claim.user);

        if spread >= policy.high_repo_spread {
            return Evaluation::Trigger(RiskSignal {
                code: self.code(),
                weight: policy.high_spread_weight,
                reason: format!("claims span {} repos", spread),
            });
        }
        // Moderate spread only matters when paired with real claim volume.
        if spread >= policy.medium_repo_spread
            && index.claim_count(&claim.user) >= policy.medium_velocity_claims
        {
            return Evaluation::Trigger(RiskSignal {
                code: self.code(),
                weight: policy.medium_spread_weight,
                reason: format!("claims span {} repos", spread),
            });
        }
        Evaluation::Clear
    }
}

/// One wallet named by several distinct claimants.
pub struct WalletReuse;

impl Heuristic for WalletReuse {
    fn code(&self) -> HeuristicCode {
        HeuristicCode::WalletReuse
    }

    fn evaluate(&self, claim: &ClaimRecord, index: &BatchIndex, policy: &RiskPolicy) -> Evaluation {
        let Some(wallet) = &claim.wallet else {
            return Evaluation::Clear;
        };

        let user_count = index.wallet_users(wallet).map_or(0, |users| users.len());
        let weight = if user_count >= 3 {
            policy.wallet_ring_weight
        } else if user_count >= 2 {
            policy.wallet_pair_weight
        } else {
            return Evaluation::Clear;
        };

        Evaluation::Trigger(RiskSignal {
            code: self.code(),
            weight,
            reason: format!("wallet reused by {} accounts", user_count),
        })
    }
}

/// Identical proof link cited by several distinct claimants.
pub struct ProofDuplicate;

impl Heuristic for ProofDuplicate {
    fn code(&self) -> HeuristicCode {
        HeuristicCode::ProofDuplicate
    }

    fn evaluate(&self, claim: &ClaimRecord, index: &BatchIndex, policy: &RiskPolicy) -> Evaluation {
        let mut duplicate_links = 0usize;
        let mut strongest_overlap = 0usize;
        for link in &claim.proof_links {
            let overlap = index.proof_link_users(link).map_or(0, |users| users.len());
            if overlap >= 2 {
                duplicate_links += 1;
                strongest_overlap = strongest_overlap.max(overlap);
            }
        }

        if duplicate_links == 0 {
            return Evaluation::Clear;
        }

        let weight = if strongest_overlap >= 3 {
            policy.proof_ring_weight
        } else {
            policy.proof_pair_weight
        };

        Evaluation::Trigger(RiskSignal {
            code: self.code(),
            weight,
            reason: format!("{} proof link(s) reused across claims", duplicate_links),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::RawClaimRecord;
    use crate::normalize::record::normalize;

    fn claim(id: &str, user: &str, issue_ref: &str, created_at: &str) -> ClaimRecord {
        normalize(&RawClaimRecord {
            claim_id: id.to_string(),
            user: user.to_string(),
            issue_ref: issue_ref.to_string(),
            created_at: created_at.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn burst_triggers_velocity_for_every_claim_in_it() {
        let claims: Vec<ClaimRecord> = (0..5)
            .map(|i| {
                claim(
                    &format!("c{}", i),
                    "alice",
                    &format!("o/r#{}", i),
                    &format!("2025-06-01T10:0{}:00Z", i * 2),
                )
            })
            .collect();
        let index = BatchIndex::build(&claims);
        let policy = RiskPolicy::default();

        for c in &claims {
            match ClaimVelocity.evaluate(c, &index, &policy) {
                Evaluation::Trigger(signal) => {
                    assert_eq!(signal.weight, policy.high_velocity_weight);
                    assert!(signal.reason.starts_with("5 claims"));
                }
                other => panic!("expected trigger for {}, got {:?}", c.claim_id, other),
            }
        }
    }

    #[test]
    fn single_claim_has_no_velocity() {
        let c = claim("c1", "alice", "o/r#1", "2025-06-01T10:00:00Z");
        let index = BatchIndex::build(std::slice::from_ref(&c));
        assert!(matches!(
            ClaimVelocity.evaluate(&c, &index, &RiskPolicy::default()),
            Evaluation::Clear
        ));
    }

    #[test]
    fn high_spread_triggers_unconditionally() {
        let claims = vec![
            claim("c1", "alice", "o/alpha#1", "2025-06-01T10:00:00Z"),
            claim("c2", "alice", "o/beta#1", "2025-06-01T11:00:00Z"),
            claim("c3", "alice", "o/gamma#1", "2025-06-01T12:00:00Z"),
        ];
        let index = BatchIndex::build(&claims);
        match RepoSpread.evaluate(&claims[0], &index, &RiskPolicy::default()) {
            Evaluation::Trigger(signal) => {
                assert_eq!(signal.weight, RiskPolicy::default().high_spread_weight)
            }
            other => panic!("expected trigger, got {:?}", other),
        }
    }

    #[test]
    fn shared_wallet_flags_both_users_and_unique_wallet_never_flags() {
        let mut a = claim("c1", "alice", "o/r#1", "2025-06-01T10:00:00Z");
        a.wallet = Some("rtc_shared".to_string());
        let mut b = claim("c2", "bob", "o/r#2", "2025-06-01T11:00:00Z");
        b.wallet = Some("rtc_shared".to_string());
        let mut c = claim("c3", "carol", "o/r#3", "2025-06-01T12:00:00Z");
        c.wallet = Some("rtc_unique".to_string());

        let claims = vec![a, b, c];
        let index = BatchIndex::build(&claims);
        let policy = RiskPolicy::default();

        for shared in &claims[..2] {
            match WalletReuse.evaluate(shared, &index, &policy) {
                Evaluation::Trigger(signal) => {
                    assert_eq!(signal.weight, policy.wallet_pair_weight);
                    assert!(signal.reason.contains("2 accounts"));
                }
                other => panic!("expected trigger, got {:?}", other),
            }
        }
        assert!(matches!(
            WalletReuse.evaluate(&claims[2], &index, &policy),
            Evaluation::Clear
        ));
    }

    #[test]
    fn wallet_ring_gets_higher_tier() {
        let mut claims = Vec::new();
        for (i, user) in ["alice", "bob", "carol"].iter().enumerate() {
            let mut c = claim(
                &format!("c{}", i),
                user,
                &format!("o/r#{}", i),
                "2025-06-01T10:00:00Z",
            );
            c.wallet = Some("rtc_ring".to_string());
            claims.push(c);
        }
        let index = BatchIndex::build(&claims);
        let policy = RiskPolicy::default();
        match WalletReuse.evaluate(&claims[0], &index, &policy) {
            Evaluation::Trigger(signal) => assert_eq!(signal.weight, policy.wallet_ring_weight),
            other => panic!("expected trigger, got {:?}", other),
        }
    }

    #[test]
    fn duplicated_proof_link_flags_both_claimants() {
        let mut a = claim("c1", "alice", "o/r#1", "2025-06-01T10:00:00Z");
        a.proof_links = vec!["https://example.com/demo".to_string()];
        let mut b = claim("c2", "bob", "o/r#2", "2025-06-01T11:00:00Z");
        b.proof_links = vec!["https://example.com/demo".to_string()];

        let claims = vec![a, b];
        let index = BatchIndex::build(&claims);
        let policy = RiskPolicy::default();
        for c in &claims {
            match ProofDuplicate.evaluate(c, &index, &policy) {
                Evaluation::Trigger(signal) => {
                    assert_eq!(signal.weight, policy.proof_pair_weight)
                }
                other => panic!("expected trigger, got {:?}", other),
            }
        }
    }

    #[test]
    fn same_user_repeating_own_link_is_clear() {
        let mut a = claim("c1", "alice", "o/r#1", "2025-06-01T10:00:00Z");
        a.proof_links = vec!["https://example.com/demo".to_string()];
        let mut b = claim("c2", "alice", "o/r#2", "2025-06-01T11:00:00Z");
        b.proof_links = vec!["https://example.com/demo".to_string()];

        let claims = vec![a, b];
        let index = BatchIndex::build(&claims);
        assert!(matches!(
            ProofDuplicate.evaluate(&claims[0], &index, &RiskPolicy::default()),
            Evaluation::Clear
        ));
    }
}
