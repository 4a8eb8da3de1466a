/// Risk policy profiles
///
/// Policies are explicit, immutable, named presets. Each profile fixes the
/// heuristic weights, the bucket cutoffs, and the detector parameters for
/// one scoring run. Exactly one profile is active per run.
use crate::config::types::HeuristicCode;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Environment override for policy selection.
pub const POLICY_ENV: &str = "TRIAGE_RISK_POLICY";

/// Profile used when nothing was requested or the request was unrecognized.
pub const DEFAULT_POLICY: &str = "balanced";

/// Similarity metric used by the text-matching detectors.
///
/// The metric is a policy parameter, not a fixed algorithm: profiles may
/// select token-set overlap, character-bigram overlap, or the max of both.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SimilarityMetric {
    #[serde(rename = "token_jaccard")]
    TokenJaccard,
    #[serde(rename = "char_bigram_dice")]
    CharBigramDice,
    #[default]
    #[serde(rename = "max_of_both")]
    MaxOfBoth,
}

/// Named weighting/threshold configuration. Immutable once loaded.
///
/// `strict` carries lower bucket cutoffs and higher weights than `relaxed`;
/// `balanced` sits between the two and is the default.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    pub name: String,

    /// Scores at or above this land in the medium bucket
    pub medium_cut: u32,
    /// Scores at or above this land in the high bucket
    pub high_cut: u32,

    // ACCOUNT_AGE
    pub new_account_days: i64,
    pub young_account_days: i64,
    pub account_age_new_weight: u32,
    pub account_age_young_weight: u32,

    // NO_LINKED_PR_24H
    pub no_pr_after_hours: f64,
    pub no_linked_pr_weight: u32,

    // STALE_SESSION_72H
    pub stale_after_hours: f64,
    pub stale_session_weight: u32,

    // CLAIM_VELOCITY
    pub velocity_window_hours: f64,
    pub medium_velocity_claims: usize,
    pub high_velocity_claims: usize,
    pub medium_velocity_weight: u32,
    pub high_velocity_weight: u32,

    // REPO_SPREAD
    pub medium_repo_spread: usize,
    pub high_repo_spread: usize,
    pub medium_spread_weight: u32,
    pub high_spread_weight: u32,

    // WALLET_REUSE: pair = 2 users, ring = 3+
    pub wallet_pair_weight: u32,
    pub wallet_ring_weight: u32,

    // PROOF_DUPLICATE
    pub proof_pair_weight: u32,
    pub proof_ring_weight: u32,

    // TEXT_SIMILARITY / SELF_TEMPLATE_REUSE
    pub similarity_metric: SimilarityMetric,
    pub medium_similarity: f64,
    pub high_similarity: f64,
    pub medium_similarity_weight: u32,
    pub high_similarity_weight: u32,
    pub self_template_similarity: f64,
    pub self_template_weight: u32,
}

impl RiskPolicy {
    /// Largest weight the given detector can contribute under this policy.
    /// Used for sanity checks, not for scoring.
    pub fn max_weight(&self, code: HeuristicCode) -> u32 {
        match code {
            HeuristicCode::AccountAge => self.account_age_new_weight,
            HeuristicCode::NoLinkedPr24h => self.no_linked_pr_weight,
            HeuristicCode::StaleSession72h => self.stale_session_weight,
            HeuristicCode::ClaimVelocity => self.high_velocity_weight,
            HeuristicCode::RepoSpread => self.high_spread_weight,
            HeuristicCode::WalletReuse => self.wallet_ring_weight,
            HeuristicCode::ProofDuplicate => self.proof_ring_weight,
            HeuristicCode::TextSimilarity => self.high_similarity_weight,
            HeuristicCode::SelfTemplateReuse => self.self_template_weight,
        }
    }
}

impl Default for RiskPolicy {
    fn default() -> Self {
        balanced()
    }
}

fn relaxed() -> RiskPolicy {
    RiskPolicy {
        name: "relaxed".to_string(),
        medium_cut: 38,
        high_cut: 68,
        new_account_days: 7,
        young_account_days: 30,
        account_age_new_weight: 20,
        account_age_young_weight: 10,
        no_pr_after_hours: 24.0,
        no_linked_pr_weight: 8,
        stale_after_hours: 72.0,
        stale_session_weight: 10,
        velocity_window_hours: 24.0,
        medium_velocity_claims: 2,
        high_velocity_claims: 4,
        medium_velocity_weight: 6,
        high_velocity_weight: 14,
        medium_repo_spread: 2,
        high_repo_spread: 3,
        medium_spread_weight: 4,
        high_spread_weight: 8,
        wallet_pair_weight: 12,
        wallet_ring_weight: 20,
        proof_pair_weight: 10,
        proof_ring_weight: 16,
        similarity_metric: SimilarityMetric::MaxOfBoth,
        medium_similarity: 0.82,
        high_similarity: 0.92,
        medium_similarity_weight: 8,
        high_similarity_weight: 16,
        self_template_similarity: 0.92,
        self_template_weight: 5,
    }
}

fn balanced() -> RiskPolicy {
    RiskPolicy {
        name: "balanced".to_string(),
        medium_cut: 32,
        high_cut: 60,
        new_account_days: 7,
        young_account_days: 30,
        account_age_new_weight: 24,
        account_age_young_weight: 12,
        no_pr_after_hours: 24.0,
        no_linked_pr_weight: 10,
        stale_after_hours: 72.0,
        stale_session_weight: 12,
        velocity_window_hours: 24.0,
        medium_velocity_claims: 2,
        high_velocity_claims: 4,
        medium_velocity_weight: 8,
        high_velocity_weight: 18,
        medium_repo_spread: 2,
        high_repo_spread: 3,
        medium_spread_weight: 5,
        high_spread_weight: 10,
        wallet_pair_weight: 14,
        wallet_ring_weight: 24,
        proof_pair_weight: 12,
        proof_ring_weight: 20,
        similarity_metric: SimilarityMetric::MaxOfBoth,
        medium_similarity: 0.78,
        high_similarity: 0.88,
        medium_similarity_weight: 10,
        high_similarity_weight: 20,
        self_template_similarity: 0.90,
        self_template_weight: 6,
    }
}

fn strict() -> RiskPolicy {
    RiskPolicy {
        name: "strict".to_string(),
        medium_cut: 25,
        high_cut: 50,
        new_account_days: 7,
        young_account_days: 30,
        account_age_new_weight: 28,
        account_age_young_weight: 16,
        no_pr_after_hours: 24.0,
        no_linked_pr_weight: 14,
        stale_after_hours: 72.0,
        stale_session_weight: 16,
        velocity_window_hours: 24.0,
        medium_velocity_claims: 2,
        high_velocity_claims: 4,
        medium_velocity_weight: 12,
        high_velocity_weight: 22,
        medium_repo_spread: 2,
        high_repo_spread: 3,
        medium_spread_weight: 8,
        high_spread_weight: 14,
        wallet_pair_weight: 18,
        wallet_ring_weight: 28,
        proof_pair_weight: 16,
        proof_ring_weight: 24,
        similarity_metric: SimilarityMetric::MaxOfBoth,
        medium_similarity: 0.74,
        high_similarity: 0.84,
        medium_similarity_weight: 14,
        high_similarity_weight: 24,
        self_template_similarity: 0.86,
        self_template_weight: 8,
    }
}

/// Policy preset registry
pub struct PolicyPresets {
    profiles: HashMap<String, RiskPolicy>,
}

impl PolicyPresets {
    pub fn new() -> Self {
        let mut presets = Self {
            profiles: HashMap::new(),
        };
        presets.register(relaxed());
        presets.register(balanced());
        presets.register(strict());
        presets
    }

    fn register(&mut self, policy: RiskPolicy) {
        self.profiles.insert(policy.name.clone(), policy);
    }

    pub fn get(&self, name: &str) -> Option<&RiskPolicy> {
        self.profiles.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Preset names, sorted for stable display.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PolicyPresets {
    fn default() -> Self {
        Self::new()
    }
}

/// Get global policy preset registry
pub fn presets() -> &'static PolicyPresets {
    use std::sync::OnceLock;
    static PRESETS: OnceLock<PolicyPresets> = OnceLock::new();
    PRESETS.get_or_init(PolicyPresets::new)
}

/// Resolve the active policy for a run.
///
/// Precedence: explicit request, then the `TRIAGE_RISK_POLICY` environment
/// override, then the default. Unrecognized names fail soft to the default
/// with a warning rather than erroring.
pub fn resolve(explicit: Option<&str>) -> RiskPolicy {
    let env_value = std::env::var(POLICY_ENV).ok();
    let requested = explicit.or(env_value.as_deref());

    match requested {
        None => presets()
            .get(DEFAULT_POLICY)
            .cloned()
            .unwrap_or_default(),
        Some(name) => match presets().get(name) {
            Some(policy) => policy.clone(),
            None => {
                warn!(
                    "unrecognized risk policy '{}', falling back to '{}'",
                    name, DEFAULT_POLICY
                );
                crate::observability::audit::policy_fallback(name, DEFAULT_POLICY);
                presets().get(DEFAULT_POLICY).cloned().unwrap_or_default()
            }
        },
    }
}
