//! Claim text similarity detectors.
//!
//! Two detectors share one similarity machinery: `TEXT_SIMILARITY` compares
//! a claim against other users' claims (cross-user templating), while
//! `SELF_TEMPLATE_REUSE` compares it against the same user's claims on other
//! issues. The split is what separates a farming ring pasting one template
//! across accounts from one person who always phrases claims the same way.

use crate::config::presets::{RiskPolicy, SimilarityMetric};
use crate::config::types::{ClaimRecord, Evaluation, HeuristicCode, RiskSignal};
use crate::heuristics::Heuristic;
use crate::index::BatchIndex;
use std::collections::{BTreeSet, HashSet};

const SIMILARITY_EPSILON: f64 = 1e-9;

/// Token-set Jaccard overlap of two normalized texts.
fn token_jaccard(a: &str, b: &str) -> f64 {
    let a_tokens: HashSet<&str> = a.split_whitespace().collect();
    let b_tokens: HashSet<&str> = b.split_whitespace().collect();
    if a_tokens.is_empty() || b_tokens.is_empty() {
        return 0.0;
    }
    let intersection = a_tokens.intersection(&b_tokens).count();
    let union = a_tokens.union(&b_tokens).count();
    intersection as f64 / union as f64
}

/// Sørensen-Dice overlap of character bigrams, sensitive to phrasing order
/// where token overlap is not.
fn char_bigram_dice(a: &str, b: &str) -> f64 {
    let bigrams = |s: &str| -> HashSet<(char, char)> {
        let chars: Vec<char> = s.chars().collect();
        chars.windows(2).map(|w| (w[0], w[1])).collect()
    };
    let a_grams = bigrams(a);
    let b_grams = bigrams(b);
    if a_grams.is_empty() || b_grams.is_empty() {
        // Degenerate single-character texts: fall back to equality.
        return if !a.is_empty() && a == b { 1.0 } else { 0.0 };
    }
    let intersection = a_grams.intersection(&b_grams).count();
    2.0 * intersection as f64 / (a_grams.len() + b_grams.len()) as f64
}

/// Similarity of two normalized texts under the policy's metric.
pub fn similarity(metric: SimilarityMetric, a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    match metric {
        SimilarityMetric::TokenJaccard => token_jaccard(a, b),
        SimilarityMetric::CharBigramDice => char_bigram_dice(a, b),
        SimilarityMetric::MaxOfBoth => token_jaccard(a, b).max(char_bigram_dice(a, b)),
    }
}

/// Best match over a filtered set of indexed texts: the highest similarity
/// plus the users tied at that similarity.
fn best_match<'a, F>(
    claim: &ClaimRecord,
    index: &'a BatchIndex,
    metric: SimilarityMetric,
    mut include: F,
) -> (f64, BTreeSet<&'a str>)
where
    F: FnMut(&crate::index::batch::IndexedText) -> bool,
{
    let mut best = 0.0f64;
    let mut best_users: BTreeSet<&str> = BTreeSet::new();

    if claim.normalized_body.is_empty() {
        return (best, best_users);
    }

    for other in index.texts() {
        if other.claim_id == claim.claim_id || !include(other) {
            continue;
        }
        let sim = similarity(metric, &claim.normalized_body, &other.text);
        if sim > best + SIMILARITY_EPSILON {
            best = sim;
            best_users.clear();
            best_users.insert(other.user.as_str());
        } else if (sim - best).abs() <= SIMILARITY_EPSILON && sim > 0.0 {
            best_users.insert(other.user.as_str());
        }
    }

    (best, best_users)
}

fn peer_list(users: &BTreeSet<&str>) -> String {
    users.iter().take(2).copied().collect::<Vec<_>>().join(", ")
}

/// Claim body matches another user's claim at template level.
pub struct TextSimilarity;

impl Heuristic for TextSimilarity {
    fn code(&self) -> HeuristicCode {
        HeuristicCode::TextSimilarity
    }

    fn evaluate(&self, claim: &ClaimRecord, index: &BatchIndex, policy: &RiskPolicy) -> Evaluation {
        let (best, peers) = best_match(claim, index, policy.similarity_metric, |other| {
            other.user != claim.user
        });

        if best >= policy.high_similarity {
            return Evaluation::Trigger(RiskSignal {
                code: self.code(),
                weight: policy.high_similarity_weight,
                reason: format!(
                    "template-level similarity {:.2} with {}",
                    best,
                    peer_list(&peers)
                ),
            });
        }
        if best >= policy.medium_similarity {
            return Evaluation::Trigger(RiskSignal {
                code: self.code(),
                weight: policy.medium_similarity_weight,
                reason: format!("similar claim text {:.2} with {}", best, peer_list(&peers)),
            });
        }
        Evaluation::Clear
    }
}

/// Claimant reuses their own claim text across different issues.
pub struct SelfTemplateReuse;

impl Heuristic for SelfTemplateReuse {
    fn code(&self) -> HeuristicCode {
        HeuristicCode::SelfTemplateReuse
    }

    fn evaluate(&self, claim: &ClaimRecord, index: &BatchIndex, policy: &RiskPolicy) -> Evaluation {
        let (best, _) = best_match(claim, index, policy.similarity_metric, |other| {
            other.user == claim.user && other.issue_ref != claim.issue_ref
        });

        if best >= policy.self_template_similarity {
            return Evaluation::Trigger(RiskSignal {
                code: self.code(),
                weight: policy.self_template_weight,
                reason: format!("reuses own claim text across issues ({:.2})", best),
            });
        }
        Evaluation::Clear
    }
}
