//! Claim record normalization.
//!
//! The normalizer is the only place a claim can fail: missing or malformed
//! identity fields produce a `SchemaError` for that single claim. Every
//! optional field degrades to "unknown" instead, so downstream evaluators
//! never see a panic-worthy record.

use crate::config::types::{ClaimRecord, RawClaimRecord, SchemaError, UnscoreableClaim};
use crate::normalize::text;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashSet;

fn mandatory<'a>(
    value: &'a str,
    field: &'static str,
) -> std::result::Result<&'a str, SchemaError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SchemaError::MissingField { field });
    }
    Ok(trimmed)
}

fn parse_created_at(value: &str) -> std::result::Result<DateTime<Utc>, SchemaError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SchemaError::MissingField { field: "created_at" });
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SchemaError::MalformedField {
            field: "created_at",
            detail: e.to_string(),
        })
}

/// Negative durations and ages are upstream artifacts; treat them as unknown
/// rather than letting them skew window arithmetic.
fn non_negative_hours(claim_id: &str, field: &str, value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Some(v),
        Some(v) => {
            debug!("claim {}: ignoring {} value {}", claim_id, field, v);
            None
        }
        None => None,
    }
}

/// Normalize one raw claim record.
pub fn normalize(raw: &RawClaimRecord) -> std::result::Result<ClaimRecord, SchemaError> {
    let claim_id = mandatory(&raw.claim_id, "claim_id")?.to_string();
    let user = mandatory(&raw.user, "user")?.to_string();
    let issue_ref = mandatory(&raw.issue_ref, "issue_ref")?.to_string();
    let created_at = parse_created_at(&raw.created_at)?;

    let account_age_days = match raw.account_age_days {
        Some(days) if days >= 0 => Some(days),
        Some(days) => {
            debug!("claim {}: ignoring account_age_days {}", claim_id, days);
            None
        }
        None => None,
    };

    let wallet = raw
        .wallet
        .as_deref()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string);

    let proof_links = raw
        .proof_links
        .as_deref()
        .map(text::canonicalize_links)
        .unwrap_or_default();

    let linked_pr_created_at = raw
        .linked_pr_created_at
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Ok(ClaimRecord {
        normalized_body: text::normalize_body(&raw.body),
        claim_age_hours: non_negative_hours(&claim_id, "claim_age_hours", raw.claim_age_hours),
        silence_hours: non_negative_hours(&claim_id, "silence_hours", raw.silence_hours),
        claim_id,
        user,
        issue_ref,
        created_at,
        body: raw.body.clone(),
        account_age_days,
        wallet,
        proof_links,
        linked_pr_url: raw.linked_pr_url.clone().filter(|u| !u.trim().is_empty()),
        linked_pr_state: raw.linked_pr_state.clone().filter(|s| !s.trim().is_empty()),
        linked_pr_draft: raw.linked_pr_draft,
        linked_pr_created_at,
    })
}

/// Normalize a whole batch, splitting it into scoreable records and
/// unscoreable rejects. Duplicate `claim_id` values keep the first record
/// and reject the later ones.
pub fn normalize_batch(raws: &[RawClaimRecord]) -> (Vec<ClaimRecord>, Vec<UnscoreableClaim>) {
    let mut claims = Vec::with_capacity(raws.len());
    let mut unscoreable = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::with_capacity(raws.len());

    for raw in raws {
        match normalize(raw) {
            Ok(claim) => {
                if !seen_ids.insert(claim.claim_id.clone()) {
                    unscoreable.push(UnscoreableClaim {
                        claim_id: Some(claim.claim_id.clone()),
                        user: Some(claim.user.clone()),
                        error: SchemaError::DuplicateClaimId {
                            claim_id: claim.claim_id,
                        },
                    });
                    continue;
                }
                claims.push(claim);
            }
            Err(error) => {
                unscoreable.push(UnscoreableClaim {
                    claim_id: Some(raw.claim_id.trim().to_string()).filter(|s| !s.is_empty()),
                    user: Some(raw.user.trim().to_string()).filter(|s| !s.is_empty()),
                    error,
                });
            }
        }
    }

    (claims, unscoreable)
}
