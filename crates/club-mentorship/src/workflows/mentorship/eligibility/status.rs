use serde::{Deserialize, Serialize};

use super::super::policy::MentorshipPolicy;
use super::criteria::{CriteriaSignals, CriterionKind};

/// Classification returned by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityStatus {
    Eligible,
    NeedsReview,
    NotEligible,
    OverrideEligible,
    OverrideBlocked,
}

impl EligibilityStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EligibilityStatus::Eligible => "eligible",
            EligibilityStatus::NeedsReview => "needs_review",
            EligibilityStatus::NotEligible => "not_eligible",
            EligibilityStatus::OverrideEligible => "override_eligible",
            EligibilityStatus::OverrideBlocked => "override_blocked",
        }
    }

    /// Text shown on the officer's candidate badge.
    pub const fn badge(self) -> &'static str {
        match self {
            EligibilityStatus::Eligible => "Eligible to Mentor",
            EligibilityStatus::NeedsReview => "Needs VPE Review",
            EligibilityStatus::NotEligible => "Not Yet Eligible",
            EligibilityStatus::OverrideEligible => "Eligible",
            EligibilityStatus::OverrideBlocked => "Blocked",
        }
    }

    /// Whether the member may currently be chosen as a mentor.
    pub const fn is_mentor_ready(self) -> bool {
        matches!(
            self,
            EligibilityStatus::Eligible | EligibilityStatus::OverrideEligible
        )
    }

    pub const fn is_override(self) -> bool {
        matches!(
            self,
            EligibilityStatus::OverrideEligible | EligibilityStatus::OverrideBlocked
        )
    }

    pub const fn group(self) -> CandidateGroup {
        match self {
            EligibilityStatus::Eligible | EligibilityStatus::OverrideEligible => {
                CandidateGroup::Ready
            }
            EligibilityStatus::NeedsReview => CandidateGroup::Review,
            EligibilityStatus::NotEligible | EligibilityStatus::OverrideBlocked => {
                CandidateGroup::NotReady
            }
        }
    }
}

/// Buckets used by the candidate review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateGroup {
    Ready,
    Review,
    NotReady,
}

pub(crate) const OVERRIDE_APPROVED_REASON: &str = "VPE approved via override.";
pub(crate) const OVERRIDE_BLOCKED_REASON: &str = "VPE blocked via override.";
pub(crate) const MEETS_ALL_REASON: &str = "Meets all club mentorship criteria.";

pub(crate) fn decide_status(
    signals: &CriteriaSignals,
    policy: &MentorshipPolicy,
) -> (EligibilityStatus, Vec<String>) {
    if signals.all_passed() {
        return (EligibilityStatus::Eligible, vec![MEETS_ALL_REASON.to_string()]);
    }

    // Close call: only attendance and roles may be lenient.
    if signals.pass_count() >= 3 && signals.hard_gates_passed() {
        let reasons = signals
            .failed()
            .filter(|kind| !kind.is_hard_gate())
            .map(|kind| kind.failure_reason(policy))
            .collect();
        return (EligibilityStatus::NeedsReview, reasons);
    }

    let reasons = signals
        .failed()
        .map(|kind: CriterionKind| kind.failure_reason(policy))
        .collect();
    (EligibilityStatus::NotEligible, reasons)
}
