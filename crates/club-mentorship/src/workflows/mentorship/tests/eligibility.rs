use super::common::*;
use proptest::prelude::*;

use crate::workflows::mentorship::domain::MemberMetrics;
use crate::workflows::mentorship::eligibility::{
    evaluate, CandidateGroup, EligibilityInputs, EligibilityStatus,
};
use crate::workflows::mentorship::policy::MentorshipPolicy;

#[test]
fn member_meeting_every_threshold_is_eligible() {
    let result = evaluate(&inputs(5, 12, 80, 3), &policy(), None);

    assert_eq!(result.status, EligibilityStatus::Eligible);
    assert_eq!(result.reasons, vec!["Meets all club mentorship criteria."]);
    assert_eq!(result.status.badge(), "Eligible to Mentor");
}

#[test]
fn two_soft_failures_are_not_a_close_call() {
    let result = evaluate(&inputs(3, 6, 40, 1), &policy(), None);

    assert_eq!(result.status, EligibilityStatus::NotEligible);
    assert_eq!(
        result.reasons,
        vec!["Attendance below target.", "Too few recent roles."]
    );
}

#[test]
fn low_attendance_alone_is_a_close_call() {
    let result = evaluate(&inputs(3, 6, 40, 2), &policy(), None);

    assert_eq!(result.status, EligibilityStatus::NeedsReview);
    assert_eq!(result.reasons, vec!["Attendance below target."]);
}

#[test]
fn one_soft_failure_is_a_close_call() {
    let result = evaluate(&inputs(3, 6, 50, 1), &policy(), None);

    assert_eq!(result.status, EligibilityStatus::NeedsReview);
    assert_eq!(result.reasons, vec!["Too few recent roles."]);
}

#[test]
fn failing_speeches_is_never_a_close_call() {
    let result = evaluate(&inputs(2, 24, 90, 5), &policy(), None);

    assert_eq!(result.status, EligibilityStatus::NotEligible);
    assert_eq!(
        result.reasons,
        vec!["Fewer than 3 Pathways speeches completed."]
    );
}

#[test]
fn failing_tenure_is_never_a_close_call() {
    let result = evaluate(&inputs(6, 5, 90, 5), &policy(), None);

    assert_eq!(result.status, EligibilityStatus::NotEligible);
    assert_eq!(result.reasons, vec!["Member < 6 months."]);
}

#[test]
fn not_eligible_reasons_follow_criterion_order() {
    let result = evaluate(&inputs(0, 0, 0, 0), &policy(), None);

    assert_eq!(
        result.reasons,
        vec![
            "Fewer than 3 Pathways speeches completed.",
            "Member < 6 months.",
            "Attendance below target.",
            "Too few recent roles.",
        ]
    );
}

#[test]
fn reasons_quote_the_live_thresholds() {
    let policy = MentorshipPolicy {
        min_speeches: 5,
        min_months: 9,
        ..MentorshipPolicy::default()
    };

    let result = evaluate(&inputs(4, 8, 80, 3), &policy, None);

    assert_eq!(
        result.reasons,
        vec![
            "Fewer than 5 Pathways speeches completed.",
            "Member < 9 months.",
        ]
    );
}

#[test]
fn blocking_override_beats_perfect_metrics() {
    let decision = override_decision(false, "Stepping back this term");

    let result = evaluate(&inputs(10, 36, 100, 8), &policy(), Some(&decision));

    assert_eq!(result.status, EligibilityStatus::OverrideBlocked);
    assert_eq!(result.reasons, vec!["VPE blocked via override."]);
    assert_eq!(result.status.badge(), "Blocked");
    assert_eq!(result.status.group(), CandidateGroup::NotReady);
}

#[test]
fn approving_override_beats_empty_metrics() {
    let decision = override_decision(true, "Former district officer");

    let result = evaluate(&EligibilityInputs::default(), &policy(), Some(&decision));

    assert_eq!(result.status, EligibilityStatus::OverrideEligible);
    assert_eq!(result.reasons, vec!["VPE approved via override."]);
    assert!(result.status.is_mentor_ready());
}

#[test]
fn stored_metrics_are_clamped_before_comparison() {
    let stored = MemberMetrics {
        speeches_completed: -4,
        attendance_pct_90: 140,
        roles_in_90: -1,
        last_updated: None,
    };

    let clamped = EligibilityInputs::from_metrics(&stored, 7);

    assert_eq!(clamped, inputs(0, 7, 100, 0));
}

#[test]
fn missing_metrics_default_to_zero() {
    let clamped = EligibilityInputs::from_metrics(&MemberMetrics::default(), 12);
    let result = evaluate(&clamped, &policy(), None);

    assert_eq!(result.status, EligibilityStatus::NotEligible);
    assert_eq!(result.reasons.len(), 3);
}

#[test]
fn zero_thresholds_make_everyone_eligible() {
    let policy = MentorshipPolicy {
        min_speeches: 0,
        min_months: 0,
        min_attendance_pct_90: 0,
        min_roles_90: 0,
    };

    let result = evaluate(&EligibilityInputs::default(), &policy, None);

    assert_eq!(result.status, EligibilityStatus::Eligible);
}

fn any_inputs() -> impl Strategy<Value = EligibilityInputs> {
    (0u32..12, 0u32..48, 0u32..=100, 0u32..8).prop_map(|(speeches, months, attendance, roles)| {
        inputs(speeches, months, attendance, roles)
    })
}

fn any_policy() -> impl Strategy<Value = MentorshipPolicy> {
    (0u32..8, 0u32..24, 0u32..=100, 0u32..6).prop_map(|(speeches, months, attendance, roles)| {
        MentorshipPolicy {
            min_speeches: speeches,
            min_months: months,
            min_attendance_pct_90: attendance,
            min_roles_90: roles,
        }
    })
}

proptest! {
    #[test]
    fn hard_gate_failure_is_never_reviewable(
        inputs in any_inputs(),
        policy in any_policy(),
    ) {
        let result = evaluate(&inputs, &policy, None);
        let gates_pass = inputs.speeches_completed >= policy.min_speeches
            && inputs.months_since_join >= policy.min_months;

        if !gates_pass {
            prop_assert_eq!(result.status, EligibilityStatus::NotEligible);
        }
        prop_assert!(!result.status.is_override());
        prop_assert!(!result.reasons.is_empty());
    }

    #[test]
    fn override_always_wins(
        inputs in any_inputs(),
        policy in any_policy(),
        eligible in any::<bool>(),
    ) {
        let decision = override_decision(eligible, "officer call");
        let result = evaluate(&inputs, &policy, Some(&decision));
        let expected = if eligible {
            EligibilityStatus::OverrideEligible
        } else {
            EligibilityStatus::OverrideBlocked
        };

        prop_assert_eq!(result.status, expected);
        prop_assert_eq!(result.reasons.len(), 1);
    }

    #[test]
    fn evaluation_is_repeatable(inputs in any_inputs(), policy in any_policy()) {
        prop_assert_eq!(
            evaluate(&inputs, &policy, None),
            evaluate(&inputs, &policy, None)
        );
    }
}
