mod criteria;
mod status;

pub use criteria::CriterionKind;
pub use status::{CandidateGroup, EligibilityStatus};

use super::domain::{MemberMetrics, MentorshipOverride};
use super::policy::MentorshipPolicy;
use criteria::assess;
use serde::{Deserialize, Serialize};
use status::{decide_status, OVERRIDE_APPROVED_REASON, OVERRIDE_BLOCKED_REASON};

/// Clamped metric values the evaluator compares against the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityInputs {
    pub speeches_completed: u32,
    pub months_since_join: u32,
    pub attendance_pct_90: u32,
    pub roles_in_90: u32,
}

impl EligibilityInputs {
    /// Clamp stored metrics into range. Tenure comes from the caller, never from storage.
    pub fn from_metrics(metrics: &MemberMetrics, months_since_join: u32) -> Self {
        Self {
            speeches_completed: clamp_count(metrics.speeches_completed),
            months_since_join,
            attendance_pct_90: clamp_count(metrics.attendance_pct_90).min(100),
            roles_in_90: clamp_count(metrics.roles_in_90),
        }
    }
}

fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Status plus the ordered reasons shown to officers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub status: EligibilityStatus,
    pub reasons: Vec<String>,
}

/// Classify a member. Pure: identical inputs always give identical results.
///
/// An override short-circuits the policy entirely; metric predicates are not consulted.
pub fn evaluate(
    inputs: &EligibilityInputs,
    policy: &MentorshipPolicy,
    override_decision: Option<&MentorshipOverride>,
) -> EligibilityResult {
    if let Some(decision) = override_decision {
        let (status, reason) = if decision.eligible {
            (EligibilityStatus::OverrideEligible, OVERRIDE_APPROVED_REASON)
        } else {
            (EligibilityStatus::OverrideBlocked, OVERRIDE_BLOCKED_REASON)
        };
        return EligibilityResult {
            status,
            reasons: vec![reason.to_string()],
        };
    }

    let signals = assess(inputs, policy);
    let (status, reasons) = decide_status(&signals, policy);

    EligibilityResult { status, reasons }
}
