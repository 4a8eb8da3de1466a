//! Claimant account-age detector.

use crate::config::presets::RiskPolicy;
use crate::config::types::{ClaimRecord, Evaluation, HeuristicCode, RiskSignal};
use crate::heuristics::Heuristic;
use crate::index::BatchIndex;

/// Flags claims from recently created accounts, with a higher tier for
/// accounts younger than the policy's "new" threshold.
pub struct AccountAge;

impl Heuristic for AccountAge {
    fn code(&self) -> HeuristicCode {
        HeuristicCode::AccountAge
    }

    fn evaluate(&self, claim: &ClaimRecord, _: &BatchIndex, policy: &RiskPolicy) -> Evaluation {
        let Some(age_days) = claim.account_age_days else {
            return Evaluation::Abstain {
                code: self.code(),
                reason: "account_age_days unknown".to_string(),
            };
        };

        let weight = if age_days < policy.new_account_days {
            policy.account_age_new_weight
        } else if age_days < policy.young_account_days {
            policy.account_age_young_weight
        } else {
            return Evaluation::Clear;
        };

        Evaluation::Trigger(RiskSignal {
            code: self.code(),
            weight,
            reason: format!("account age {}d", age_days),
        })
    }
}
