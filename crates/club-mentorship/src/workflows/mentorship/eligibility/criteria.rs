use serde::{Deserialize, Serialize};

use super::super::policy::MentorshipPolicy;
use super::EligibilityInputs;

/// The four participation criteria, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    Speeches,
    Months,
    Attendance,
    Roles,
}

impl CriterionKind {
    /// Speeches and tenure must pass before a member can be a close call.
    pub const fn is_hard_gate(self) -> bool {
        matches!(self, CriterionKind::Speeches | CriterionKind::Months)
    }

    pub(crate) fn failure_reason(self, policy: &MentorshipPolicy) -> String {
        match self {
            CriterionKind::Speeches => format!(
                "Fewer than {} Pathways speeches completed.",
                policy.min_speeches
            ),
            CriterionKind::Months => format!("Member < {} months.", policy.min_months),
            CriterionKind::Attendance => "Attendance below target.".to_string(),
            CriterionKind::Roles => "Too few recent roles.".to_string(),
        }
    }
}

/// Outcome of a single `>=` comparison against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CriterionCheck {
    pub kind: CriterionKind,
    pub passed: bool,
}

/// Predicate results for one member, always in `CriterionKind` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CriteriaSignals {
    pub checks: [CriterionCheck; 4],
}

impl CriteriaSignals {
    pub fn pass_count(&self) -> usize {
        self.checks.iter().filter(|check| check.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn hard_gates_passed(&self) -> bool {
        self.checks
            .iter()
            .filter(|check| check.kind.is_hard_gate())
            .all(|check| check.passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = CriterionKind> + '_ {
        self.checks
            .iter()
            .filter(|check| !check.passed)
            .map(|check| check.kind)
    }
}

pub(crate) fn assess(inputs: &EligibilityInputs, policy: &MentorshipPolicy) -> CriteriaSignals {
    let check = |kind, value: u32, minimum: u32| CriterionCheck {
        kind,
        passed: value >= minimum,
    };

    CriteriaSignals {
        checks: [
            check(
                CriterionKind::Speeches,
                inputs.speeches_completed,
                policy.min_speeches,
            ),
            check(
                CriterionKind::Months,
                inputs.months_since_join,
                policy.min_months,
            ),
            check(
                CriterionKind::Attendance,
                inputs.attendance_pct_90,
                policy.min_attendance_pct_90,
            ),
            check(CriterionKind::Roles, inputs.roles_in_90, policy.min_roles_90),
        ],
    }
}
