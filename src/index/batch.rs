//! Cross-claim batch index.
//!
//! Built once per batch in a single pass, then read-only. Every heuristic
//! that needs batch-wide visibility (velocity, spread, wallet reuse, proof
//! duplication, text similarity) consults this snapshot; nothing mutates it
//! during evaluation, which keeps per-claim scoring safe to parallelize.

use crate::config::types::ClaimRecord;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Normalized body text of one claim, with enough identity to scope
/// same-user vs cross-user comparisons.
#[derive(Clone, Debug)]
pub struct IndexedText {
    pub claim_id: String,
    pub user: String,
    pub issue_ref: String,
    pub text: String,
}

/// Immutable cross-claim groupings for one batch.
#[derive(Debug, Default)]
pub struct BatchIndex {
    /// Per-user claim timestamps, sorted ascending
    user_claim_times: HashMap<String, Vec<DateTime<Utc>>>,
    /// Per-user distinct repo namespaces claimed
    user_repos: HashMap<String, HashSet<String>>,
    /// Wallet value to the distinct users naming it
    wallet_users: HashMap<String, BTreeSet<String>>,
    /// Canonical proof link to the distinct users citing it
    proof_users: HashMap<String, BTreeSet<String>>,
    /// Normalized body texts in batch order
    texts: Vec<IndexedText>,
}

impl BatchIndex {
    /// Build the index in one pass over the normalized batch.
    pub fn build(claims: &[ClaimRecord]) -> Self {
        let mut index = BatchIndex::default();

        for claim in claims {
            index
                .user_claim_times
                .entry(claim.user.clone())
                .or_default()
                .push(claim.created_at);
            index
                .user_repos
                .entry(claim.user.clone())
                .or_default()
                .insert(Self::repo_namespace(&claim.issue_ref).to_string());
            if let Some(wallet) = &claim.wallet {
                index
                    .wallet_users
                    .entry(wallet.clone())
                    .or_default()
                    .insert(claim.user.clone());
            }
            for link in &claim.proof_links {
                index
                    .proof_users
                    .entry(link.clone())
                    .or_default()
                    .insert(claim.user.clone());
            }
            index.texts.push(IndexedText {
                claim_id: claim.claim_id.clone(),
                user: claim.user.clone(),
                issue_ref: claim.issue_ref.clone(),
                text: claim.normalized_body.clone(),
            });
        }

        for times in index.user_claim_times.values_mut() {
            times.sort_unstable();
        }

        index
    }

    /// Repo component of an issue reference: "owner/repo#12" yields "repo".
    pub fn repo_namespace(issue_ref: &str) -> &str {
        let owner_repo = issue_ref.split('#').next().unwrap_or(issue_ref);
        match owner_repo.split_once('/') {
            Some((_owner, repo)) if !repo.is_empty() => repo,
            _ => owner_repo,
        }
    }

    /// Number of claims this user filed within `window_hours` of `at`,
    /// counted symmetrically so every claim in a burst sees the full burst.
    pub fn claims_within(&self, user: &str, at: DateTime<Utc>, window_hours: f64) -> usize {
        let Some(times) = self.user_claim_times.get(user) else {
            return 0;
        };
        let window = Duration::seconds((window_hours * 3600.0) as i64);
        let lo = at - window;
        let hi = at + window;
        let start = times.partition_point(|t| *t < lo);
        let end = times.partition_point(|t| *t <= hi);
        end.saturating_sub(start)
    }

    /// Total claims by this user in the batch.
    pub fn claim_count(&self, user: &str) -> usize {
        self.user_claim_times.get(user).map_or(0, Vec::len)
    }

    /// Distinct repo namespaces this user claimed across.
    pub fn repo_spread(&self, user: &str) -> usize {
        self.user_repos.get(user).map_or(0, HashSet::len)
    }

    /// Distinct users naming this wallet.
    pub fn wallet_users(&self, wallet: &str) -> Option<&BTreeSet<String>> {
        self.wallet_users.get(wallet)
    }

    /// Distinct users citing this canonical proof link.
    pub fn proof_link_users(&self, link: &str) -> Option<&BTreeSet<String>> {
        self.proof_users.get(link)
    }

    /// All normalized claim texts, in batch order.
    pub fn texts(&self) -> &[IndexedText] {
        &self.texts
    }
}
