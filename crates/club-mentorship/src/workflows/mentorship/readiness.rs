use serde::{Deserialize, Serialize};

use super::domain::MentorshipPair;
use super::eligibility::EligibilityStatus;
use super::roster::EvaluatedMember;

/// Which half of the officer workflow the surface should open on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    ReviewCandidates,
    CreatePairings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessAssessment {
    pub all_statused: bool,
    pub all_eligible_paired: bool,
    pub phase: WorkflowPhase,
}

/// Derive the default phase from an evaluated roster and the current pairs.
///
/// Archived members are ignored; inactive pairs do not count as paired.
pub fn compute_readiness_phase(
    evaluated: &[EvaluatedMember],
    pairs: &[MentorshipPair],
) -> ReadinessAssessment {
    let candidates = || evaluated.iter().filter(|entry| !entry.member.is_archived());

    let all_statused = candidates().all(|entry| entry.status() != EligibilityStatus::NeedsReview);

    let all_eligible_paired = candidates()
        .filter(|entry| entry.status().is_mentor_ready())
        .all(|entry| {
            pairs
                .iter()
                .any(|pair| pair.active && pair.involves(entry.id()))
        });

    let phase = if all_statused && !all_eligible_paired {
        WorkflowPhase::CreatePairings
    } else {
        WorkflowPhase::ReviewCandidates
    };

    ReadinessAssessment {
        all_statused,
        all_eligible_paired,
        phase,
    }
}

/// Holds the phase decided on the first computation after a load.
///
/// Later assessments in the same session never move the officer away from where they are.
#[derive(Debug, Clone, Default)]
pub struct ReadinessLatch {
    latched: Option<WorkflowPhase>,
}

impl ReadinessLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, assessment: &ReadinessAssessment) -> WorkflowPhase {
        *self.latched.get_or_insert(assessment.phase)
    }

    /// Manual navigation; wins over any later assessment.
    pub fn select(&mut self, phase: WorkflowPhase) {
        self.latched = Some(phase);
    }

    /// Start of a fresh data load.
    pub fn reset(&mut self) {
        self.latched = None;
    }

    pub fn current(&self) -> Option<WorkflowPhase> {
        self.latched
    }
}
