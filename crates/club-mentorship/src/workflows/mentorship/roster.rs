use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Member, MemberId, MemberMetrics, MentorshipOverride, MentorshipPair};
use super::eligibility::{
    evaluate, CandidateGroup, EligibilityInputs, EligibilityResult, EligibilityStatus,
};
use super::policy::MentorshipPolicy;
use super::readiness::ReadinessAssessment;

/// A roster member together with the inputs and result of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedMember {
    pub member: Member,
    pub inputs: EligibilityInputs,
    pub eligibility: EligibilityResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_decision: Option<MentorshipOverride>,
}

impl EvaluatedMember {
    pub fn evaluate(
        member: Member,
        metrics: &MemberMetrics,
        months_since_join: u32,
        policy: &MentorshipPolicy,
        override_decision: Option<MentorshipOverride>,
    ) -> Self {
        let inputs = EligibilityInputs::from_metrics(metrics, months_since_join);
        let eligibility = evaluate(&inputs, policy, override_decision.as_ref());
        Self {
            member,
            inputs,
            eligibility,
            override_decision,
        }
    }

    pub fn status(&self) -> EligibilityStatus {
        self.eligibility.status
    }

    pub fn id(&self) -> &MemberId {
        &self.member.id
    }

    pub fn view(&self) -> CandidateView {
        CandidateView {
            member_id: self.member.id.clone(),
            name: self.member.name.clone(),
            status: self.status().label(),
            badge: self.status().badge(),
            reasons: self.eligibility.reasons.clone(),
            speeches_completed: self.inputs.speeches_completed,
            months_since_join: self.inputs.months_since_join,
            attendance_pct_90: self.inputs.attendance_pct_90,
            roles_in_90: self.inputs.roles_in_90,
            override_reason: self
                .override_decision
                .as_ref()
                .map(|decision| decision.reason.clone()),
        }
    }
}

/// Flattened row rendered by the candidate table.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub member_id: MemberId,
    pub name: String,
    pub status: &'static str,
    pub badge: &'static str,
    pub reasons: Vec<String>,
    pub speeches_completed: u32,
    pub months_since_join: u32,
    pub attendance_pct_90: u32,
    pub roles_in_90: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
}

/// Output of a bulk evaluation: resolved entries plus members whose fetches failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationPass {
    pub resolved: Vec<EvaluatedMember>,
    pub unresolved: Vec<MemberId>,
}

impl EvaluationPass {
    pub fn in_group(&self, group: CandidateGroup) -> Vec<&EvaluatedMember> {
        self.resolved
            .iter()
            .filter(|entry| entry.status().group() == group)
            .collect()
    }

    /// Members whose status is currently decided by an override.
    pub fn overrides_in_force(&self) -> Vec<&EvaluatedMember> {
        self.resolved
            .iter()
            .filter(|entry| entry.override_decision.is_some())
            .collect()
    }

    pub fn find(&self, member: &MemberId) -> Option<&EvaluatedMember> {
        self.resolved.iter().find(|entry| entry.id() == member)
    }
}

/// Everything the officer surface renders after one recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub policy: MentorshipPolicy,
    pub pass: EvaluationPass,
    pub pairs: Vec<MentorshipPair>,
    pub ratio: u32,
    pub readiness: ReadinessAssessment,
    pub computed_at: DateTime<Utc>,
}
