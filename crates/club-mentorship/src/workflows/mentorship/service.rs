use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::domain::{
    months_since_join, Member, MemberId, MemberMetrics, MentorshipOverride, MentorshipPair,
    PairingId,
};
use super::notes::{visible_notes, MentorshipNote, NoteDraft, NoteId, NoteViewer};
use super::policy::{MentorshipPolicy, PolicyUpdate, ValidationError};
use super::readiness::compute_readiness_phase;
use super::recompute::evaluate_members;
use super::registry::{self, validate_pairing, validate_participants};
use super::repository::{MentorshipRepository, RepositoryError};
use super::roster::{EvaluatedMember, EvaluationPass, RosterSnapshot};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const DEFAULT_RECOMPUTE_CONCURRENCY: usize = 8;

/// Time source so passes and timestamps can be pinned in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Notifications for views that need to refresh after another view mutates shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MentorshipEvent {
    PolicyUpdated,
    OverrideSet { member_id: MemberId },
    OverrideRemoved { member_id: MemberId },
    ReviewApplied { member_id: MemberId },
    PairingCreated { pairing_id: PairingId },
    PairingDeactivated { pairing_id: PairingId },
    PairingRemoved { pairing_id: PairingId },
    NoteAdded { pairing_id: PairingId, note_id: NoteId },
    NoteDeleted { pairing_id: PairingId, note_id: NoteId },
    RosterRecomputed { resolved: usize, unresolved: usize },
}

/// Error raised by the mentorship service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MentorshipServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("storage request failed: {0}")]
    TransientIo(String),
}

impl From<RepositoryError> for MentorshipServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepositoryError::Unavailable(detail) => Self::TransientIo(detail),
        }
    }
}

/// Service composing the evaluator, pairing registry, and readiness gate over a repository.
pub struct MentorshipService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    recompute_concurrency: usize,
    events: broadcast::Sender<MentorshipEvent>,
    snapshot: watch::Sender<Option<Arc<RosterSnapshot>>>,
}

impl<R> MentorshipService<R>
where
    R: MentorshipRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock))
    }

    pub fn with_clock(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (snapshot, _) = watch::channel(None);
        Self {
            repository,
            clock,
            recompute_concurrency: DEFAULT_RECOMPUTE_CONCURRENCY,
            events,
            snapshot,
        }
    }

    pub fn with_recompute_concurrency(mut self, concurrency: usize) -> Self {
        self.recompute_concurrency = concurrency.max(1);
        self
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<MentorshipEvent> {
        self.events.subscribe()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Option<Arc<RosterSnapshot>>> {
        self.snapshot.subscribe()
    }

    /// Snapshot from whichever recompute resolved last.
    pub fn latest_snapshot(&self) -> Option<Arc<RosterSnapshot>> {
        self.snapshot.borrow().clone()
    }

    /// Live policy, falling back to the club defaults.
    pub async fn policy(&self) -> Result<MentorshipPolicy, MentorshipServiceError> {
        Ok(self.repository.policy().await?.unwrap_or_default())
    }

    /// Evaluate a caller-supplied roster against the current policy.
    pub async fn evaluate_all(
        &self,
        roster: Vec<Member>,
    ) -> Result<EvaluationPass, MentorshipServiceError> {
        let policy = self.policy().await?;
        Ok(self.evaluate_with(roster, policy).await)
    }

    async fn evaluate_with(&self, roster: Vec<Member>, policy: MentorshipPolicy) -> EvaluationPass {
        evaluate_members(
            Arc::clone(&self.repository),
            roster,
            policy,
            self.clock.today(),
            self.recompute_concurrency,
        )
        .await
    }

    /// Re-fetch everything, re-evaluate every member, and publish a new snapshot.
    pub async fn recompute_all(&self) -> Result<Arc<RosterSnapshot>, MentorshipServiceError> {
        let policy = self.policy().await?;
        let roster = self.repository.roster().await?;
        let pass = self.evaluate_with(roster.clone(), policy).await;
        let pairs = self.repository.pairs().await?;

        let ratio = registry::compute_ratio(&roster, &pairs);
        let readiness = compute_readiness_phase(&pass.resolved, &pairs);

        let snapshot = Arc::new(RosterSnapshot {
            policy,
            pass,
            pairs,
            ratio,
            readiness,
            computed_at: self.clock.now(),
        });

        info!(
            resolved = snapshot.pass.resolved.len(),
            unresolved = snapshot.pass.unresolved.len(),
            ratio = snapshot.ratio,
            phase = ?snapshot.readiness.phase,
            "mentorship roster recomputed"
        );

        self.snapshot.send_replace(Some(Arc::clone(&snapshot)));
        self.publish(MentorshipEvent::RosterRecomputed {
            resolved: snapshot.pass.resolved.len(),
            unresolved: snapshot.pass.unresolved.len(),
        });

        Ok(snapshot)
    }

    /// Evaluate one member from freshly fetched data.
    pub async fn evaluate_member(
        &self,
        member_id: &MemberId,
    ) -> Result<EvaluatedMember, MentorshipServiceError> {
        let member = self.roster_member(member_id).await?;
        self.evaluate_loaded(member).await
    }

    async fn evaluate_loaded(&self, member: Member) -> Result<EvaluatedMember, MentorshipServiceError> {
        let policy = self.policy().await?;
        let metrics = self.repository.metrics(&member.id).await?.unwrap_or_default();
        let decision = self.repository.override_for(&member.id).await?;
        let months = months_since_join(member.joined_date, self.clock.today());

        Ok(EvaluatedMember::evaluate(
            member, &metrics, months, &policy, decision,
        ))
    }

    pub async fn set_policy(
        &self,
        update: PolicyUpdate,
    ) -> Result<MentorshipPolicy, MentorshipServiceError> {
        let policy = update.validate()?;
        self.repository.save_policy(policy).await?;
        info!(?policy, "mentorship policy updated");

        self.refresh_after(MentorshipEvent::PolicyUpdated).await;
        Ok(policy)
    }

    /// Replace any existing override for the member.
    pub async fn set_override(
        &self,
        member_id: &MemberId,
        eligible: bool,
        reason: impl Into<String>,
        set_by_uid: impl Into<String>,
    ) -> Result<(), MentorshipServiceError> {
        self.roster_member(member_id).await?;
        let decision = MentorshipOverride {
            eligible,
            reason: reason.into(),
            set_by_uid: set_by_uid.into(),
        };
        self.repository.save_override(member_id, decision).await?;
        info!(member_id = %member_id, eligible, "mentorship override set");

        self.refresh_after(MentorshipEvent::OverrideSet {
            member_id: member_id.clone(),
        })
        .await;
        Ok(())
    }

    pub async fn remove_override(&self, member_id: &MemberId) -> Result<(), MentorshipServiceError> {
        self.repository.delete_override(member_id).await?;
        info!(member_id = %member_id, "mentorship override removed");

        self.refresh_after(MentorshipEvent::OverrideRemoved {
            member_id: member_id.clone(),
        })
        .await;
        Ok(())
    }

    /// Update metrics and the override together so no pass sees one without the other.
    pub async fn apply_review(
        &self,
        member_id: &MemberId,
        metrics: MemberMetrics,
        decision: Option<MentorshipOverride>,
    ) -> Result<(), MentorshipServiceError> {
        self.roster_member(member_id).await?;
        let metrics = MemberMetrics {
            last_updated: Some(metrics.last_updated.unwrap_or_else(|| self.clock.now())),
            ..metrics
        };
        let has_override = decision.is_some();
        self.repository
            .save_review(member_id, metrics, decision)
            .await?;
        info!(member_id = %member_id, has_override, "mentorship review applied");

        self.refresh_after(MentorshipEvent::ReviewApplied {
            member_id: member_id.clone(),
        })
        .await;
        Ok(())
    }

    /// Create or reactivate the pair keyed `{mentor}_{mentee}`.
    pub async fn create_pairing(
        &self,
        mentor_id: &MemberId,
        mentee_id: &MemberId,
    ) -> Result<MentorshipPair, MentorshipServiceError> {
        if mentor_id == mentee_id {
            return Err(ValidationError::SelfPairing(mentor_id.0.clone()).into());
        }

        let roster = self.repository.roster().await?;
        let mentor = find_member(&roster, mentor_id)?;
        let mentee = find_member(&roster, mentee_id)?;
        validate_participants(&mentor, &mentee)?;
        // Checked once here; later status changes never revisit existing pairs.
        let mentor = self.evaluate_loaded(mentor).await?;
        validate_pairing(&mentor.member, &mentee, mentor.status())?;

        let pair = MentorshipPair::new(mentor_id.clone(), mentee_id.clone(), self.clock.now());
        self.repository.upsert_pair(pair.clone()).await?;
        info!(pairing_id = %pair.id, "mentorship pairing created");

        self.refresh_after(MentorshipEvent::PairingCreated {
            pairing_id: pair.id.clone(),
        })
        .await;
        Ok(pair)
    }

    pub async fn deactivate_pairing(
        &self,
        pairing_id: &PairingId,
    ) -> Result<MentorshipPair, MentorshipServiceError> {
        let mut pair = self.existing_pair(pairing_id).await?;
        pair.active = false;
        self.repository.upsert_pair(pair.clone()).await?;
        info!(pairing_id = %pairing_id, "mentorship pairing deactivated");

        self.refresh_after(MentorshipEvent::PairingDeactivated {
            pairing_id: pairing_id.clone(),
        })
        .await;
        Ok(pair)
    }

    pub async fn remove_pairing(&self, pairing_id: &PairingId) -> Result<(), MentorshipServiceError> {
        self.repository.delete_pair(pairing_id).await?;
        info!(pairing_id = %pairing_id, "mentorship pairing removed");

        self.refresh_after(MentorshipEvent::PairingRemoved {
            pairing_id: pairing_id.clone(),
        })
        .await;
        Ok(())
    }

    pub async fn list_active_pairs(&self) -> Result<Vec<MentorshipPair>, MentorshipServiceError> {
        let pairs = self.repository.pairs().await?;
        Ok(registry::active_pairs(&pairs))
    }

    pub async fn pairs_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<MentorshipPair>, MentorshipServiceError> {
        let pairs = self.repository.pairs().await?;
        Ok(registry::pairs_for_member(&pairs, member_id))
    }

    pub async fn add_note(
        &self,
        pairing_id: &PairingId,
        draft: NoteDraft,
    ) -> Result<MentorshipNote, MentorshipServiceError> {
        self.existing_pair(pairing_id).await?;
        let draft = draft.normalize()?;
        let note_id = self.repository.allocate_note_id().await?;
        let note = draft.into_note(note_id, pairing_id.clone(), self.clock.now());
        self.repository.insert_note(note.clone()).await?;
        info!(pairing_id = %pairing_id, note_id = %note.id.0, "mentorship note added");

        self.publish(MentorshipEvent::NoteAdded {
            pairing_id: pairing_id.clone(),
            note_id: note.id.clone(),
        });
        Ok(note)
    }

    /// Notes the viewer may read, newest first.
    pub async fn notes_for(
        &self,
        pairing_id: &PairingId,
        viewer: &NoteViewer,
    ) -> Result<Vec<MentorshipNote>, MentorshipServiceError> {
        let pair = self.existing_pair(pairing_id).await?;
        let notes = self.repository.notes(pairing_id).await?;
        Ok(visible_notes(notes, viewer, &pair))
    }

    pub async fn delete_note(
        &self,
        pairing_id: &PairingId,
        note_id: &NoteId,
    ) -> Result<(), MentorshipServiceError> {
        self.repository.delete_note(pairing_id, note_id).await?;
        info!(pairing_id = %pairing_id, note_id = %note_id.0, "mentorship note deleted");

        self.publish(MentorshipEvent::NoteDeleted {
            pairing_id: pairing_id.clone(),
            note_id: note_id.clone(),
        });
        Ok(())
    }

    async fn roster_member(&self, member_id: &MemberId) -> Result<Member, MentorshipServiceError> {
        let roster = self.repository.roster().await?;
        find_member(&roster, member_id)
    }

    async fn existing_pair(
        &self,
        pairing_id: &PairingId,
    ) -> Result<MentorshipPair, MentorshipServiceError> {
        self.repository
            .pair(pairing_id)
            .await?
            .ok_or_else(|| MentorshipServiceError::NotFound {
                entity: "pairing",
                id: pairing_id.0.clone(),
            })
    }

    fn publish(&self, event: MentorshipEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    /// Every mutation funnels into the same recompute. The write already succeeded, so a failed
    /// refresh is only logged.
    async fn refresh_after(&self, event: MentorshipEvent) {
        self.publish(event);
        if let Err(error) = self.recompute_all().await {
            warn!(%error, "roster recompute after mutation failed");
        }
    }
}

fn find_member(roster: &[Member], member_id: &MemberId) -> Result<Member, MentorshipServiceError> {
    roster
        .iter()
        .find(|member| &member.id == member_id)
        .cloned()
        .ok_or_else(|| MentorshipServiceError::NotFound {
            entity: "member",
            id: member_id.0.clone(),
        })
}
