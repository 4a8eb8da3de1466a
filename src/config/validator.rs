// Policy validation
// Externally loaded policies must be validated at startup and fail fast
// with actionable errors; a malformed policy file is fatal for the run.

use crate::config::presets::RiskPolicy;
use crate::config::types::{HeuristicCode, Result, TriageError};
use std::path::Path;

/// Validation result with detailed errors
#[derive(Debug)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a policy profile before it drives a scoring run.
pub fn validate_policy(policy: &RiskPolicy) -> Result<ValidationResult> {
    let mut result = ValidationResult::new();

    validate_cutoffs(policy, &mut result);
    validate_parameters(policy, &mut result);
    validate_weights(policy, &mut result);

    if !result.is_valid() {
        return Err(TriageError::Config(format!(
            "policy '{}' failed validation:\n{}",
            policy.name,
            result.errors.join("\n")
        )));
    }

    Ok(result)
}

fn validate_cutoffs(policy: &RiskPolicy, result: &mut ValidationResult) {
    if policy.medium_cut == 0 {
        result.add_error("medium_cut cannot be zero".to_string());
    }
    if policy.high_cut <= policy.medium_cut {
        result.add_error(format!(
            "high_cut {} must exceed medium_cut {}",
            policy.high_cut, policy.medium_cut
        ));
    }
}

fn validate_parameters(policy: &RiskPolicy, result: &mut ValidationResult) {
    if policy.name.trim().is_empty() {
        result.add_error("policy name cannot be empty".to_string());
    }
    if policy.new_account_days <= 0 || policy.young_account_days <= 0 {
        result.add_error("account age thresholds must be positive".to_string());
    }
    if policy.young_account_days < policy.new_account_days {
        result.add_error(format!(
            "young_account_days {} is below new_account_days {}",
            policy.young_account_days, policy.new_account_days
        ));
    }
    if !(policy.velocity_window_hours > 0.0) {
        result.add_error("velocity_window_hours must be positive".to_string());
    }
    if policy.velocity_window_hours > 24.0 * 30.0 {
        result.add_warning(format!(
            "velocity window {}h spans more than 30 days",
            policy.velocity_window_hours
        ));
    }
    if policy.medium_velocity_claims < 2 {
        result.add_error("medium_velocity_claims must be at least 2".to_string());
    }
    if policy.high_velocity_claims < policy.medium_velocity_claims {
        result.add_error(format!(
            "high_velocity_claims {} is below medium_velocity_claims {}",
            policy.high_velocity_claims, policy.medium_velocity_claims
        ));
    }
    if policy.medium_repo_spread < 2 {
        result.add_error("medium_repo_spread must be at least 2".to_string());
    }
    if policy.high_repo_spread < policy.medium_repo_spread {
        result.add_error(format!(
            "high_repo_spread {} is below medium_repo_spread {}",
            policy.high_repo_spread, policy.medium_repo_spread
        ));
    }
    if !(policy.no_pr_after_hours > 0.0) || !(policy.stale_after_hours > 0.0) {
        result.add_error("liveness hour thresholds must be positive".to_string());
    }

    for (label, value) in [
        ("medium_similarity", policy.medium_similarity),
        ("high_similarity", policy.high_similarity),
        ("self_template_similarity", policy.self_template_similarity),
    ] {
        if !(value > 0.0 && value <= 1.0) {
            result.add_error(format!("{} {} must be within (0, 1]", label, value));
        }
    }
    if policy.high_similarity < policy.medium_similarity {
        result.add_error(format!(
            "high_similarity {} is below medium_similarity {}",
            policy.high_similarity, policy.medium_similarity
        ));
    }
}

fn validate_weights(policy: &RiskPolicy, result: &mut ValidationResult) {
    let all_zero = HeuristicCode::ALL
        .iter()
        .all(|code| policy.max_weight(*code) == 0);
    if all_zero {
        result.add_warning("every heuristic weight is zero; all claims will score 0".to_string());
    }

    if policy.account_age_young_weight > policy.account_age_new_weight {
        result.add_error("account_age_young_weight exceeds account_age_new_weight".to_string());
    }
    if policy.medium_velocity_weight > policy.high_velocity_weight {
        result.add_error("medium_velocity_weight exceeds high_velocity_weight".to_string());
    }
    if policy.medium_spread_weight > policy.high_spread_weight {
        result.add_error("medium_spread_weight exceeds high_spread_weight".to_string());
    }
    if policy.wallet_pair_weight > policy.wallet_ring_weight {
        result.add_error("wallet_pair_weight exceeds wallet_ring_weight".to_string());
    }
    if policy.proof_pair_weight > policy.proof_ring_weight {
        result.add_error("proof_pair_weight exceeds proof_ring_weight".to_string());
    }
    if policy.medium_similarity_weight > policy.high_similarity_weight {
        result.add_error("medium_similarity_weight exceeds high_similarity_weight".to_string());
    }
}

/// Load and validate a policy profile from a JSON file.
///
/// A file that does not parse into a profile is a configuration error and
/// aborts the whole run; there is no partial fallback for explicit files.
pub fn load_policy_file(path: &Path) -> Result<RiskPolicy> {
    let raw = std::fs::read_to_string(path)?;
    let policy: RiskPolicy = serde_json::from_str(&raw).map_err(|e| {
        TriageError::Config(format!("malformed policy file {}: {}", path.display(), e))
    })?;
    validate_policy(&policy)?;
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets::presets;

    #[test]
    fn builtin_presets_pass_validation() {
        for name in presets().names() {
            let policy = presets().get(name).unwrap();
            let result = validate_policy(policy).unwrap();
            assert!(result.is_valid(), "{} should validate", name);
            assert!(result.errors.is_empty());
        }
    }

    #[test]
    fn inverted_cutoffs_are_rejected() {
        let mut policy = RiskPolicy::default();
        policy.high_cut = policy.medium_cut;
        assert!(validate_policy(&policy).is_err());
    }

    #[test]
    fn similarity_threshold_above_one_is_rejected() {
        let mut policy = RiskPolicy::default();
        policy.high_similarity = 1.2;
        assert!(validate_policy(&policy).is_err());
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut policy = RiskPolicy::default();
        policy.velocity_window_hours = 0.0;
        assert!(validate_policy(&policy).is_err());
    }

    #[test]
    fn all_zero_weights_only_warn() {
        let mut policy = RiskPolicy::default();
        policy.account_age_new_weight = 0;
        policy.account_age_young_weight = 0;
        policy.no_linked_pr_weight = 0;
        policy.stale_session_weight = 0;
        policy.medium_velocity_weight = 0;
        policy.high_velocity_weight = 0;
        policy.medium_spread_weight = 0;
        policy.high_spread_weight = 0;
        policy.wallet_pair_weight = 0;
        policy.wallet_ring_weight = 0;
        policy.proof_pair_weight = 0;
        policy.proof_ring_weight = 0;
        policy.medium_similarity_weight = 0;
        policy.high_similarity_weight = 0;
        policy.self_template_weight = 0;
        let result = validate_policy(&policy).unwrap();
        assert!(result.is_valid());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn malformed_policy_file_is_config_error() {
        let dir = std::env::temp_dir().join("triagebox-validator-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_policy_file(&path).unwrap_err();
        assert!(matches!(err, TriageError::Config(_)));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn partial_policy_file_fills_defaults() {
        let dir = std::env::temp_dir().join("triagebox-validator-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("partial.json");
        std::fs::write(&path, r#"{"name":"custom","medium_cut":20,"high_cut":40}"#).unwrap();

        let policy = load_policy_file(&path).unwrap();
        assert_eq!(policy.name, "custom");
        assert_eq!(policy.medium_cut, 20);
        // Unspecified fields come from the balanced defaults.
        assert_eq!(policy.new_account_days, 7);

        let _ = std::fs::remove_file(path);
    }
}
