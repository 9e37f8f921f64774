use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::mentorship::domain::{
    Member, MemberId, MemberMetrics, MemberStatus, MentorshipOverride, MentorshipPair, PairingId,
};
use crate::workflows::mentorship::eligibility::{
    EligibilityInputs, EligibilityResult, EligibilityStatus,
};
use crate::workflows::mentorship::notes::{MentorshipNote, NoteId};
use crate::workflows::mentorship::policy::MentorshipPolicy;
use crate::workflows::mentorship::repository::{
    InMemoryMentorshipRepository, MentorshipRepository, RepositoryError,
};
use crate::workflows::mentorship::roster::EvaluatedMember;
use crate::workflows::mentorship::service::{Clock, MentorshipService};

pub(super) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 15, 19, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn id(value: &str) -> MemberId {
    MemberId::new(value)
}

pub(super) fn member(member_id: &str, name: &str, joined: (i32, u32)) -> Member {
    Member {
        id: id(member_id),
        name: name.to_string(),
        joined_date: Some(NaiveDate::from_ymd_opt(joined.0, joined.1, 10).expect("valid date")),
        status: MemberStatus::Active,
    }
}

pub(super) fn metrics(speeches: i64, attendance: i64, roles: i64) -> MemberMetrics {
    MemberMetrics {
        speeches_completed: speeches,
        attendance_pct_90: attendance,
        roles_in_90: roles,
        last_updated: Some(now()),
    }
}

pub(super) fn inputs(speeches: u32, months: u32, attendance: u32, roles: u32) -> EligibilityInputs {
    EligibilityInputs {
        speeches_completed: speeches,
        months_since_join: months,
        attendance_pct_90: attendance,
        roles_in_90: roles,
    }
}

pub(super) fn policy() -> MentorshipPolicy {
    MentorshipPolicy::default()
}

pub(super) fn override_decision(eligible: bool, reason: &str) -> MentorshipOverride {
    MentorshipOverride {
        eligible,
        reason: reason.to_string(),
        set_by_uid: "vpe-uid".to_string(),
    }
}

/// Evaluated entry with a forced status, for ranker and gate tests.
pub(super) fn evaluated(
    member_id: &str,
    name: &str,
    status: EligibilityStatus,
    attendance: u32,
    speeches: u32,
) -> EvaluatedMember {
    EvaluatedMember {
        member: member(member_id, name, (2024, 1)),
        inputs: inputs(speeches, 12, attendance, 2),
        eligibility: EligibilityResult {
            status,
            reasons: Vec::new(),
        },
        override_decision: None,
    }
}

pub(super) fn pair(mentor: &str, mentee: &str, active: bool) -> MentorshipPair {
    let mut pair = MentorshipPair::new(id(mentor), id(mentee), now());
    pair.active = active;
    pair
}

/// Club evaluated on 2025-10-15 with the default policy:
/// ava and dev eligible, ben needs review (attendance), cara and fay not eligible,
/// eli archived.
pub(super) fn seeded_repository() -> InMemoryMentorshipRepository {
    let repository = InMemoryMentorshipRepository::new();
    let roster = [
        (member("ava", "Ava Chen", (2024, 1)), Some(metrics(5, 80, 4))),
        (member("ben", "Ben Ortiz", (2024, 9)), Some(metrics(4, 40, 3))),
        (member("cara", "cara Singh", (2025, 7)), Some(metrics(1, 90, 1))),
        (member("dev", "Dev Patel", (2023, 5)), Some(metrics(8, 70, 5))),
        (
            Member {
                status: MemberStatus::Archived,
                ..member("eli", "Eli Park", (2020, 1))
            },
            Some(metrics(12, 95, 6)),
        ),
        (member("fay", "Fay Morgan", (2025, 9)), None),
    ];

    for (entry, stored) in roster {
        if let Some(stored) = stored {
            repository
                .put_metrics(&entry.id, stored)
                .expect("seed metrics");
        }
        repository.put_member(entry).expect("seed member");
    }

    repository
}

pub(super) fn service_with<R>(repository: Arc<R>) -> MentorshipService<R>
where
    R: MentorshipRepository + 'static,
{
    MentorshipService::with_clock(repository, Arc::new(FixedClock(now())))
        .with_recompute_concurrency(2)
}

pub(super) fn seeded_service() -> (
    Arc<InMemoryMentorshipRepository>,
    MentorshipService<InMemoryMentorshipRepository>,
) {
    let repository = Arc::new(seeded_repository());
    let service = service_with(repository.clone());
    (repository, service)
}

/// Delegating repository that fails selected calls with `Unavailable`.
#[derive(Default)]
pub(super) struct FlakyRepository {
    pub inner: InMemoryMentorshipRepository,
    pub failing_metrics: BTreeSet<MemberId>,
    pub failing_overrides: BTreeSet<MemberId>,
    pub fail_roster: bool,
    pub fail_policy: bool,
}

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("document store offline".to_string())
}

#[async_trait]
impl MentorshipRepository for FlakyRepository {
    async fn roster(&self) -> Result<Vec<Member>, RepositoryError> {
        if self.fail_roster {
            return Err(offline());
        }
        self.inner.roster().await
    }

    async fn metrics(&self, member: &MemberId) -> Result<Option<MemberMetrics>, RepositoryError> {
        if self.failing_metrics.contains(member) {
            return Err(offline());
        }
        self.inner.metrics(member).await
    }

    async fn override_for(
        &self,
        member: &MemberId,
    ) -> Result<Option<MentorshipOverride>, RepositoryError> {
        if self.failing_overrides.contains(member) {
            return Err(offline());
        }
        self.inner.override_for(member).await
    }

    async fn policy(&self) -> Result<Option<MentorshipPolicy>, RepositoryError> {
        if self.fail_policy {
            return Err(offline());
        }
        self.inner.policy().await
    }

    async fn save_policy(&self, policy: MentorshipPolicy) -> Result<(), RepositoryError> {
        self.inner.save_policy(policy).await
    }

    async fn save_override(
        &self,
        member: &MemberId,
        decision: MentorshipOverride,
    ) -> Result<(), RepositoryError> {
        self.inner.save_override(member, decision).await
    }

    async fn delete_override(&self, member: &MemberId) -> Result<(), RepositoryError> {
        self.inner.delete_override(member).await
    }

    async fn save_review(
        &self,
        member: &MemberId,
        metrics: MemberMetrics,
        decision: Option<MentorshipOverride>,
    ) -> Result<(), RepositoryError> {
        self.inner.save_review(member, metrics, decision).await
    }

    async fn upsert_pair(&self, pair: MentorshipPair) -> Result<(), RepositoryError> {
        self.inner.upsert_pair(pair).await
    }

    async fn pair(&self, id: &PairingId) -> Result<Option<MentorshipPair>, RepositoryError> {
        self.inner.pair(id).await
    }

    async fn pairs(&self) -> Result<Vec<MentorshipPair>, RepositoryError> {
        self.inner.pairs().await
    }

    async fn delete_pair(&self, id: &PairingId) -> Result<(), RepositoryError> {
        self.inner.delete_pair(id).await
    }

    async fn allocate_note_id(&self) -> Result<NoteId, RepositoryError> {
        self.inner.allocate_note_id().await
    }

    async fn insert_note(&self, note: MentorshipNote) -> Result<(), RepositoryError> {
        self.inner.insert_note(note).await
    }

    async fn notes(&self, pairing: &PairingId) -> Result<Vec<MentorshipNote>, RepositoryError> {
        self.inner.notes(pairing).await
    }

    async fn delete_note(
        &self,
        pairing: &PairingId,
        note: &NoteId,
    ) -> Result<(), RepositoryError> {
        self.inner.delete_note(pairing, note).await
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
