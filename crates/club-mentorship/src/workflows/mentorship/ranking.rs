use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::eligibility::EligibilityStatus;
use super::roster::EvaluatedMember;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Two fixed orderings offered by the status column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusOrder {
    /// not eligible, blocked, needs review, then eligible/approved.
    #[default]
    Ascending,
    /// blocked, eligible/approved, not eligible, then needs review.
    BlockedFirst,
}

impl StatusOrder {
    fn rank(self, status: EligibilityStatus) -> u8 {
        match (self, status) {
            (StatusOrder::Ascending, EligibilityStatus::NotEligible) => 0,
            (StatusOrder::Ascending, EligibilityStatus::OverrideBlocked) => 1,
            (StatusOrder::Ascending, EligibilityStatus::NeedsReview) => 2,
            (
                StatusOrder::Ascending,
                EligibilityStatus::Eligible | EligibilityStatus::OverrideEligible,
            ) => 3,
            (StatusOrder::BlockedFirst, EligibilityStatus::OverrideBlocked) => 0,
            (
                StatusOrder::BlockedFirst,
                EligibilityStatus::Eligible | EligibilityStatus::OverrideEligible,
            ) => 1,
            (StatusOrder::BlockedFirst, EligibilityStatus::NotEligible) => 2,
            (StatusOrder::BlockedFirst, EligibilityStatus::NeedsReview) => 3,
        }
    }
}

/// The single active sort key of the roster table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", rename_all = "snake_case")]
pub enum SortSpec {
    Name { direction: SortDirection },
    Status { order: StatusOrder },
    Metrics { direction: SortDirection },
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec::Name {
            direction: SortDirection::Asc,
        }
    }
}

/// Stable, total ordering of an evaluated roster.
pub fn rank(entries: &[EvaluatedMember], spec: SortSpec) -> Vec<EvaluatedMember> {
    let mut ordered = entries.to_vec();
    ordered.sort_by(|left, right| compare(left, right, spec));
    ordered
}

pub fn compare(left: &EvaluatedMember, right: &EvaluatedMember, spec: SortSpec) -> Ordering {
    let primary = match spec {
        SortSpec::Name { direction } => direction.apply(compare_names(left, right)),
        SortSpec::Status { order } => order
            .rank(left.status())
            .cmp(&order.rank(right.status()))
            .then_with(|| compare_names(left, right)),
        SortSpec::Metrics { direction } => direction
            .apply(
                left.inputs
                    .attendance_pct_90
                    .cmp(&right.inputs.attendance_pct_90)
                    .then_with(|| {
                        left.inputs
                            .speeches_completed
                            .cmp(&right.inputs.speeches_completed)
                    }),
            )
            .then_with(|| compare_names(left, right)),
    };

    primary.then_with(|| left.member.id.cmp(&right.member.id))
}

fn compare_names(left: &EvaluatedMember, right: &EvaluatedMember) -> Ordering {
    left.member
        .name
        .to_lowercase()
        .cmp(&right.member.name.to_lowercase())
        .then_with(|| left.member.name.cmp(&right.member.name))
}
