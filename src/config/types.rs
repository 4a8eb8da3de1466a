/// Core types and structures for the triagebox system
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw bounty-claim record as it arrives in the input document.
///
/// Only the identity fields are mandatory; everything else is optional and
/// degrades to "unknown" during normalization.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawClaimRecord {
    /// Unique claim identifier within a batch
    #[serde(default)]
    pub claim_id: String,
    /// Claimant handle
    #[serde(default)]
    pub user: String,
    /// Target identifier, e.g. "owner/repo#123"
    #[serde(default)]
    pub issue_ref: String,
    /// RFC 3339 timestamp of the claim
    #[serde(default)]
    pub created_at: String,
    /// Free-text claim body
    #[serde(default)]
    pub body: String,
    /// Claimant account age in days
    pub account_age_days: Option<i64>,
    /// Hours since the claim was opened
    pub claim_age_hours: Option<f64>,
    /// Hours since the last claim activity
    pub silence_hours: Option<f64>,
    /// Payout wallet named in the claim
    pub wallet: Option<String>,
    /// Proof-of-work links named in the claim
    pub proof_links: Option<Vec<String>>,
    /// Linked pull request metadata, if one was found upstream
    pub linked_pr_url: Option<String>,
    pub linked_pr_state: Option<String>,
    pub linked_pr_draft: Option<bool>,
    pub linked_pr_created_at: Option<String>,
}

/// Normalized claim record, read-only input for one scoring run.
#[derive(Clone, Debug)]
pub struct ClaimRecord {
    pub claim_id: String,
    pub user: String,
    pub issue_ref: String,
    pub created_at: DateTime<Utc>,
    pub body: String,
    /// Body text pre-normalized for similarity matching
    pub normalized_body: String,
    pub account_age_days: Option<i64>,
    pub claim_age_hours: Option<f64>,
    pub silence_hours: Option<f64>,
    pub wallet: Option<String>,
    /// Canonicalized, deduplicated, sorted proof links
    pub proof_links: Vec<String>,
    pub linked_pr_url: Option<String>,
    pub linked_pr_state: Option<String>,
    pub linked_pr_draft: Option<bool>,
    pub linked_pr_created_at: Option<DateTime<Utc>>,
}

impl ClaimRecord {
    /// True when a linked pull request is known and currently open.
    pub fn has_open_pr(&self) -> bool {
        self.linked_pr_url.is_some() && self.linked_pr_state.as_deref() == Some("open")
    }
}

/// Heuristic detector codes - STABLE TAXONOMY (v1 frozen)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HeuristicCode {
    #[serde(rename = "ACCOUNT_AGE")]
    AccountAge,
    #[serde(rename = "NO_LINKED_PR_24H")]
    NoLinkedPr24h,
    #[serde(rename = "STALE_SESSION_72H")]
    StaleSession72h,
    #[serde(rename = "CLAIM_VELOCITY")]
    ClaimVelocity,
    #[serde(rename = "REPO_SPREAD")]
    RepoSpread,
    #[serde(rename = "WALLET_REUSE")]
    WalletReuse,
    #[serde(rename = "PROOF_DUPLICATE")]
    ProofDuplicate,
    #[serde(rename = "TEXT_SIMILARITY")]
    TextSimilarity,
    #[serde(rename = "SELF_TEMPLATE_REUSE")]
    SelfTemplateReuse,
}

impl HeuristicCode {
    /// All codes in declaration order. This order is the reason-list
    /// tie-break and must stay aligned with the evaluator registry.
    pub const ALL: [HeuristicCode; 9] = [
        HeuristicCode::AccountAge,
        HeuristicCode::NoLinkedPr24h,
        HeuristicCode::StaleSession72h,
        HeuristicCode::ClaimVelocity,
        HeuristicCode::RepoSpread,
        HeuristicCode::WalletReuse,
        HeuristicCode::ProofDuplicate,
        HeuristicCode::TextSimilarity,
        HeuristicCode::SelfTemplateReuse,
    ];

    /// Position in declaration order.
    pub fn rank(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(usize::MAX)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeuristicCode::AccountAge => "ACCOUNT_AGE",
            HeuristicCode::NoLinkedPr24h => "NO_LINKED_PR_24H",
            HeuristicCode::StaleSession72h => "STALE_SESSION_72H",
            HeuristicCode::ClaimVelocity => "CLAIM_VELOCITY",
            HeuristicCode::RepoSpread => "REPO_SPREAD",
            HeuristicCode::WalletReuse => "WALLET_REUSE",
            HeuristicCode::ProofDuplicate => "PROOF_DUPLICATE",
            HeuristicCode::TextSimilarity => "TEXT_SIMILARITY",
            HeuristicCode::SelfTemplateReuse => "SELF_TEMPLATE_REUSE",
        }
    }
}

impl std::fmt::Display for HeuristicCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One triggered risk signal for a (claim, heuristic) pair.
/// Produced once, never mutated.
#[derive(Clone, Debug, Serialize)]
pub struct RiskSignal {
    pub code: HeuristicCode,
    /// Weight contribution toward the claim score
    pub weight: u32,
    /// Human-readable reason
    pub reason: String,
}

/// Explicit evaluator outcome.
///
/// `Abstain` is the graceful-degradation contract: unknown input is a
/// distinct state from a zero-risk finding, so sparse claims are never
/// silently scored as clean or as risky.
#[derive(Clone, Debug)]
pub enum Evaluation {
    /// The detector fired with a weighted signal
    Trigger(RiskSignal),
    /// Required input was missing or the evaluator faulted; no contribution
    Abstain { code: HeuristicCode, reason: String },
    /// The detector ran on full data and found nothing
    Clear,
}

/// Coarse risk classification derived from the aggregate score.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskBucket {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
}

impl std::fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskBucket::Low => write!(f, "low"),
            RiskBucket::Medium => write!(f, "medium"),
            RiskBucket::High => write!(f, "high"),
        }
    }
}

/// Maintainer action recommendation tags.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MaintainerAction {
    #[serde(rename = "prioritize")]
    Prioritize,
    #[serde(rename = "watch")]
    Watch,
    #[serde(rename = "request_details")]
    RequestDetails,
    #[serde(rename = "release_claim")]
    ReleaseClaim,
}

/// Scored claim - derived output, recomputed fully on every run.
#[derive(Clone, Debug, Serialize)]
pub struct ScoredClaim {
    pub claim_id: String,
    pub user: String,
    pub issue_ref: String,
    /// Raw weighted sum of triggered signals
    pub score: u32,
    pub bucket: RiskBucket,
    /// Reasons ordered by descending contribution, ties by code declaration order
    pub reasons: Vec<String>,
    /// Triggered codes, same order as `reasons`
    pub codes: Vec<HeuristicCode>,
    /// Codes that abstained for missing data or evaluator faults
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub abstentions: Vec<HeuristicCode>,
    /// Recommended maintainer action; absent for clean low-risk claims
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<MaintainerAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_age_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silence_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_pr_state: Option<String>,
}

/// Claim excluded from scoring because its identity fields failed validation.
#[derive(Clone, Debug, Serialize)]
pub struct UnscoreableClaim {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub error: SchemaError,
}

/// Per-claim schema violation. Fatal for the single claim, never for the batch.
#[derive(Error, Clone, Debug, Serialize, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing mandatory field `{field}`")]
    MissingField { field: &'static str },

    #[error("malformed field `{field}`: {detail}")]
    MalformedField { field: &'static str, detail: String },

    #[error("duplicate claim_id `{claim_id}` in batch")]
    DuplicateClaimId { claim_id: String },
}

/// Run-fatal error types for triagebox
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),
}

/// Result type alias for triagebox operations
pub type Result<T> = std::result::Result<T, TriageError>;
