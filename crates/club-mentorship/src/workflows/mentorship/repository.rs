use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::domain::{
    Member, MemberId, MemberMetrics, MentorshipOverride, MentorshipPair, PairingId,
};
use super::notes::{MentorshipNote, NoteId};
use super::policy::MentorshipPolicy;

/// Asynchronous document-store abstraction. Every call is an atomic request/response unit.
#[async_trait]
pub trait MentorshipRepository: Send + Sync {
    async fn roster(&self) -> Result<Vec<Member>, RepositoryError>;
    async fn metrics(&self, member: &MemberId) -> Result<Option<MemberMetrics>, RepositoryError>;
    async fn override_for(
        &self,
        member: &MemberId,
    ) -> Result<Option<MentorshipOverride>, RepositoryError>;
    async fn policy(&self) -> Result<Option<MentorshipPolicy>, RepositoryError>;

    async fn save_policy(&self, policy: MentorshipPolicy) -> Result<(), RepositoryError>;
    async fn save_override(
        &self,
        member: &MemberId,
        decision: MentorshipOverride,
    ) -> Result<(), RepositoryError>;
    async fn delete_override(&self, member: &MemberId) -> Result<(), RepositoryError>;
    /// Write metrics and the override (or its removal) as one unit.
    async fn save_review(
        &self,
        member: &MemberId,
        metrics: MemberMetrics,
        decision: Option<MentorshipOverride>,
    ) -> Result<(), RepositoryError>;

    async fn upsert_pair(&self, pair: MentorshipPair) -> Result<(), RepositoryError>;
    async fn pair(&self, id: &PairingId) -> Result<Option<MentorshipPair>, RepositoryError>;
    async fn pairs(&self) -> Result<Vec<MentorshipPair>, RepositoryError>;
    /// Hard delete; notes attached to the pairing go with it.
    async fn delete_pair(&self, id: &PairingId) -> Result<(), RepositoryError>;

    /// Store-wide unique note id, so writers sharing a store never collide.
    async fn allocate_note_id(&self) -> Result<NoteId, RepositoryError>;
    async fn insert_note(&self, note: MentorshipNote) -> Result<(), RepositoryError>;
    async fn notes(&self, pairing: &PairingId) -> Result<Vec<MentorshipNote>, RepositoryError>;
    async fn delete_note(&self, pairing: &PairingId, note: &NoteId)
        -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

#[derive(Debug, Default)]
struct ClubDocuments {
    roster: BTreeMap<MemberId, Member>,
    metrics: HashMap<MemberId, MemberMetrics>,
    overrides: HashMap<MemberId, MentorshipOverride>,
    policy: Option<MentorshipPolicy>,
    pairs: BTreeMap<PairingId, MentorshipPair>,
    notes: BTreeMap<PairingId, Vec<MentorshipNote>>,
    note_sequence: u64,
}

/// Process-local repository used by the host service and the test suites.
///
/// All documents sit behind one lock, so `save_review` is atomic by construction.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMentorshipRepository {
    documents: Arc<Mutex<ClubDocuments>>,
}

impl InMemoryMentorshipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> Result<MutexGuard<'_, ClubDocuments>, RepositoryError> {
        self.documents
            .lock()
            .map_err(|_| RepositoryError::Unavailable("document lock poisoned".to_string()))
    }

    /// Seed or replace a roster entry (roster CRUD lives outside the engine).
    pub fn put_member(&self, member: Member) -> Result<(), RepositoryError> {
        self.documents()?.roster.insert(member.id.clone(), member);
        Ok(())
    }

    /// Seed metrics as the attendance tracker would.
    pub fn put_metrics(
        &self,
        member: &MemberId,
        metrics: MemberMetrics,
    ) -> Result<(), RepositoryError> {
        self.documents()?.metrics.insert(member.clone(), metrics);
        Ok(())
    }
}

#[async_trait]
impl MentorshipRepository for InMemoryMentorshipRepository {
    async fn roster(&self) -> Result<Vec<Member>, RepositoryError> {
        Ok(self.documents()?.roster.values().cloned().collect())
    }

    async fn metrics(&self, member: &MemberId) -> Result<Option<MemberMetrics>, RepositoryError> {
        Ok(self.documents()?.metrics.get(member).cloned())
    }

    async fn override_for(
        &self,
        member: &MemberId,
    ) -> Result<Option<MentorshipOverride>, RepositoryError> {
        Ok(self.documents()?.overrides.get(member).cloned())
    }

    async fn policy(&self) -> Result<Option<MentorshipPolicy>, RepositoryError> {
        Ok(self.documents()?.policy)
    }

    async fn save_policy(&self, policy: MentorshipPolicy) -> Result<(), RepositoryError> {
        self.documents()?.policy = Some(policy);
        Ok(())
    }

    async fn save_override(
        &self,
        member: &MemberId,
        decision: MentorshipOverride,
    ) -> Result<(), RepositoryError> {
        self.documents()?.overrides.insert(member.clone(), decision);
        Ok(())
    }

    async fn delete_override(&self, member: &MemberId) -> Result<(), RepositoryError> {
        self.documents()?
            .overrides
            .remove(member)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("override", member.as_str()))
    }

    async fn save_review(
        &self,
        member: &MemberId,
        metrics: MemberMetrics,
        decision: Option<MentorshipOverride>,
    ) -> Result<(), RepositoryError> {
        let mut documents = self.documents()?;
        documents.metrics.insert(member.clone(), metrics);
        match decision {
            Some(decision) => {
                documents.overrides.insert(member.clone(), decision);
            }
            None => {
                documents.overrides.remove(member);
            }
        }
        Ok(())
    }

    async fn upsert_pair(&self, pair: MentorshipPair) -> Result<(), RepositoryError> {
        self.documents()?.pairs.insert(pair.id.clone(), pair);
        Ok(())
    }

    async fn pair(&self, id: &PairingId) -> Result<Option<MentorshipPair>, RepositoryError> {
        Ok(self.documents()?.pairs.get(id).cloned())
    }

    async fn pairs(&self) -> Result<Vec<MentorshipPair>, RepositoryError> {
        Ok(self.documents()?.pairs.values().cloned().collect())
    }

    async fn delete_pair(&self, id: &PairingId) -> Result<(), RepositoryError> {
        let mut documents = self.documents()?;
        documents
            .pairs
            .remove(id)
            .ok_or_else(|| RepositoryError::not_found("pairing", id.0.as_str()))?;
        documents.notes.remove(id);
        Ok(())
    }

    async fn allocate_note_id(&self) -> Result<NoteId, RepositoryError> {
        let mut documents = self.documents()?;
        documents.note_sequence += 1;
        Ok(NoteId(format!("note-{:06}", documents.note_sequence)))
    }

    async fn insert_note(&self, note: MentorshipNote) -> Result<(), RepositoryError> {
        self.documents()?
            .notes
            .entry(note.pairing_id.clone())
            .or_default()
            .push(note);
        Ok(())
    }

    async fn notes(&self, pairing: &PairingId) -> Result<Vec<MentorshipNote>, RepositoryError> {
        Ok(self
            .documents()?
            .notes
            .get(pairing)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_note(
        &self,
        pairing: &PairingId,
        note: &NoteId,
    ) -> Result<(), RepositoryError> {
        let mut documents = self.documents()?;
        let notes = documents
            .notes
            .get_mut(pairing)
            .ok_or_else(|| RepositoryError::not_found("note", note.0.as_str()))?;
        let position = notes
            .iter()
            .position(|existing| &existing.id == note)
            .ok_or_else(|| RepositoryError::not_found("note", note.0.as_str()))?;
        notes.remove(position);
        Ok(())
    }
}
