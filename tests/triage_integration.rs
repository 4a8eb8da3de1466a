//! End-to-end scoring tests.
//!
//! These drive the full pipeline (normalize -> index -> evaluate -> score ->
//! report) through the public API the CLI uses.

use triagebox::config::presets::{presets, RiskPolicy};
use triagebox::config::types::{
    HeuristicCode, MaintainerAction, RawClaimRecord, RiskBucket, SchemaError,
};
use triagebox::score::runner;
use triagebox::utils::json_schema;

fn record(claim_id: &str, user: &str, issue_ref: &str, created_at: &str) -> RawClaimRecord {
    RawClaimRecord {
        claim_id: claim_id.to_string(),
        user: user.to_string(),
        issue_ref: issue_ref.to_string(),
        created_at: created_at.to_string(),
        ..Default::default()
    }
}

/// Mixed batch: a young account without a PR, two wallets colluding, and a
/// fully clean claimant.
fn scenario_batch() -> Vec<RawClaimRecord> {
    let mut alice = record("claim-alice", "alice", "acme/widgets#10", "2025-06-01T08:00:00Z");
    alice.account_age_days = Some(2);
    alice.claim_age_hours = Some(30.0);
    alice.body = "Hi, I just started learning and would love to try this task".to_string();

    let mut bob = record("claim-bob", "bob", "acme/widgets#11", "2025-06-01T09:00:00Z");
    bob.account_age_days = Some(200);
    bob.claim_age_hours = Some(10.0);
    bob.silence_hours = Some(5.0);
    bob.wallet = Some("rtc_payout_shared".to_string());
    bob.body = "Taking a look at the widget renderer crash this afternoon".to_string();

    let mut dave = record("claim-dave", "dave", "acme/gadgets#4", "2025-06-01T09:30:00Z");
    dave.account_age_days = Some(150);
    dave.claim_age_hours = Some(8.0);
    dave.silence_hours = Some(2.0);
    dave.wallet = Some("rtc_payout_shared".to_string());
    dave.body = "I can reproduce the gadget timeout locally, investigating".to_string();

    let mut carol = record("claim-carol", "carol", "acme/widgets#12", "2025-06-01T10:00:00Z");
    carol.account_age_days = Some(400);
    carol.claim_age_hours = Some(12.0);
    carol.silence_hours = Some(1.0);
    carol.wallet = Some("rtc_carol_only".to_string());
    carol.proof_links = Some(vec!["https://example.com/carol-demo".to_string()]);
    carol.linked_pr_url = Some("https://github.com/acme/widgets/pull/99".to_string());
    carol.linked_pr_state = Some("open".to_string());
    carol.linked_pr_created_at = Some("2025-06-01T14:00:00Z".to_string());
    carol.body = "Draft up at the linked PR, feedback welcome on the parser tests".to_string();

    vec![alice, bob, dave, carol]
}

#[test]
fn end_to_end_three_way_scenario() {
    let policy = presets().get("balanced").unwrap();
    let outcome = runner::run(&scenario_batch(), policy);
    assert_eq!(outcome.results.len(), 4);
    assert!(outcome.unscoreable.is_empty());

    let by_id = |id: &str| {
        outcome
            .results
            .iter()
            .find(|r| r.claim_id == id)
            .unwrap_or_else(|| panic!("missing {}", id))
    };

    // Young account with a 30h-old claim and no PR.
    let alice = by_id("claim-alice");
    assert!(alice.codes.contains(&HeuristicCode::AccountAge));
    assert!(alice.codes.contains(&HeuristicCode::NoLinkedPr24h));
    assert_eq!(alice.bucket, RiskBucket::Medium);
    assert_eq!(alice.action, Some(MaintainerAction::Watch));

    // Shared wallet flags both sides of the pair, and only them.
    let bob = by_id("claim-bob");
    let dave = by_id("claim-dave");
    assert!(bob.codes.contains(&HeuristicCode::WalletReuse));
    assert!(dave.codes.contains(&HeuristicCode::WalletReuse));

    // Clean claim: zero score, low bucket, no action assigned.
    let carol = by_id("claim-carol");
    assert_eq!(carol.score, 0);
    assert_eq!(carol.bucket, RiskBucket::Low);
    assert!(carol.reasons.is_empty());
    assert!(!carol.codes.contains(&HeuristicCode::WalletReuse));
    assert_eq!(carol.action, None);
}

#[test]
fn velocity_burst_flags_every_claim_once_threshold_is_met() {
    let mut policy = presets().get("balanced").unwrap().clone();
    policy.medium_velocity_claims = 3;
    policy.high_velocity_claims = 6;

    // Five claims by one user inside ten minutes.
    let raws: Vec<RawClaimRecord> = (0..5)
        .map(|i| {
            let mut r = record(
                &format!("burst-{}", i),
                "alice",
                &format!("acme/widgets#{}", 20 + i),
                &format!("2025-06-01T10:0{}:00Z", i * 2),
            );
            r.body = format!("claim number {}", i);
            r
        })
        .collect();

    let outcome = runner::run(&raws, &policy);
    for result in &outcome.results {
        assert!(
            result.codes.contains(&HeuristicCode::ClaimVelocity),
            "velocity missing for {}",
            result.claim_id
        );
    }
}

#[test]
fn malformed_claims_are_excluded_but_reported() {
    let mut raws = scenario_batch();
    raws.push(record("", "eve", "acme/widgets#13", "2025-06-01T11:00:00Z"));
    raws.push(record("claim-frank", "frank", "acme/widgets#14", "last tuesday"));
    // Duplicate of an existing id.
    raws.push(record("claim-bob", "mallory", "acme/widgets#15", "2025-06-01T11:30:00Z"));

    let policy = presets().get("balanced").unwrap();
    let outcome = runner::run(&raws, policy);
    assert_eq!(outcome.results.len(), 4);
    assert_eq!(outcome.unscoreable.len(), 3);

    let errors: Vec<&SchemaError> = outcome.unscoreable.iter().map(|u| &u.error).collect();
    assert!(errors
        .iter()
        .any(|e| matches!(e, SchemaError::MissingField { field: "claim_id" })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, SchemaError::MalformedField { field: "created_at", .. })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, SchemaError::DuplicateClaimId { .. })));
}

#[test]
fn report_is_sorted_and_byte_identical_across_runs() {
    let policy = presets().get("balanced").unwrap();
    let render = || {
        let report = json_schema::build_report(policy, runner::run(&scenario_batch(), policy));
        serde_json::to_string(&report).unwrap()
    };
    let first = render();
    let second = render();
    assert_eq!(first, second);

    let outcome = runner::run(&scenario_batch(), policy);
    for pair in outcome.results.windows(2) {
        assert!(
            pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].claim_id < pair[1].claim_id),
            "unsorted: {} before {}",
            pair[0].claim_id,
            pair[1].claim_id
        );
    }
}

#[test]
fn zero_flag_batch_completes_cleanly() {
    let bodies = [
        "Refactoring the cache eviction logic tonight, branch pushed soon",
        "Investigating the websocket reconnect loop seen on mobile clients",
        "Overhauling the install guide with updated screenshots throughout",
    ];
    let mut raws = Vec::new();
    for (i, user) in ["ursa", "vic", "wen"].iter().enumerate() {
        let mut r = record(
            &format!("clean-{}", i),
            user,
            &format!("acme/widgets#{}", 30 + i),
            &format!("2025-06-0{}T10:00:00Z", i + 1),
        );
        r.account_age_days = Some(500 + i as i64);
        r.claim_age_hours = Some(4.0);
        r.silence_hours = Some(1.0);
        r.wallet = Some(format!("rtc_{}", user));
        r.body = bodies[i].to_string();
        raws.push(r);
    }

    let policy = presets().get("balanced").unwrap();
    let report = json_schema::build_report(policy, runner::run(&raws, policy));
    assert_eq!(report.scored_count, 3);
    assert_eq!(report.flagged_count, 0);
    assert!(report
        .results
        .iter()
        .all(|r| r.bucket == RiskBucket::Low && r.score == 0));
}

#[test]
fn sparse_low_risk_claim_requests_details() {
    let raws = vec![record(
        "sparse-1",
        "zoe",
        "acme/widgets#40",
        "2025-06-01T10:00:00Z",
    )];
    let policy = presets().get("balanced").unwrap();
    let outcome = runner::run(&raws, policy);
    let claim = &outcome.results[0];
    assert_eq!(claim.score, 0);
    assert_eq!(claim.bucket, RiskBucket::Low);
    assert!(!claim.abstentions.is_empty());
    assert_eq!(claim.action, Some(MaintainerAction::RequestDetails));
}

#[test]
fn custom_policy_still_validates_and_scores() {
    let mut policy = RiskPolicy::default();
    policy.name = "custom".to_string();
    policy.medium_cut = 20;
    policy.high_cut = 40;
    triagebox::config::validator::validate_policy(&policy).unwrap();

    let outcome = runner::run(&scenario_batch(), &policy);
    // Alice lands at 34: 24 (account age) + 10 (no linked PR).
    let alice = outcome
        .results
        .iter()
        .find(|r| r.claim_id == "claim-alice")
        .unwrap();
    assert_eq!(alice.bucket, RiskBucket::Medium);
    assert!(alice.score >= policy.medium_cut);
}
