//! Mentor eligibility, override, and pairing engine.
//!
//! The evaluator, registry rules, readiness gate, and ranker are synchronous and pure. Storage
//! sits behind [`MentorshipRepository`]; [`MentorshipService`] composes the two and funnels every
//! mutation into a single `recompute_all` pass whose snapshot is published to subscribers.

pub mod domain;
pub mod eligibility;
pub mod notes;
pub mod policy;
pub mod ranking;
pub mod readiness;
mod recompute;
pub mod registry;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    months_since_join, Member, MemberId, MemberMetrics, MemberStatus, MentorshipOverride,
    MentorshipPair, PairingId,
};
pub use eligibility::{
    evaluate, CandidateGroup, CriterionKind, EligibilityInputs, EligibilityResult,
    EligibilityStatus,
};
pub use notes::{GoalStatus, MentorshipNote, NoteDraft, NoteId, NoteType, NoteViewer, NoteVisibility};
pub use policy::{MentorshipPolicy, PolicyUpdate, ValidationError};
pub use ranking::{rank, SortDirection, SortSpec, StatusOrder};
pub use readiness::{compute_readiness_phase, ReadinessAssessment, ReadinessLatch, WorkflowPhase};
pub use registry::{compute_ratio, validate_pairing};
pub use repository::{InMemoryMentorshipRepository, MentorshipRepository, RepositoryError};
pub use roster::{EvaluatedMember, EvaluationPass, RosterSnapshot};
pub use router::mentorship_router;
pub use service::{
    Clock, MentorshipEvent, MentorshipService, MentorshipServiceError, SystemClock,
};
