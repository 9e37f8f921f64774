use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{MemberId, MemberMetrics, MentorshipOverride, MentorshipPair, PairingId};
use super::notes::{MentorshipNote, NoteDraft, NoteId, NoteViewer};
use super::policy::{MentorshipPolicy, PolicyUpdate};
use super::ranking::{rank, SortDirection, SortSpec, StatusOrder};
use super::readiness::ReadinessAssessment;
use super::repository::MentorshipRepository;
use super::roster::{CandidateView, RosterSnapshot};
use super::service::MentorshipService;
use crate::error::AppError;

/// Router builder exposing the officer-facing mentorship endpoints.
pub fn mentorship_router<R>(service: Arc<MentorshipService<R>>) -> Router
where
    R: MentorshipRepository + 'static,
{
    Router::new()
        .route("/api/v1/mentorship/roster", get(roster_handler::<R>))
        .route("/api/v1/mentorship/recompute", post(recompute_handler::<R>))
        .route(
            "/api/v1/mentorship/policy",
            get(policy_handler::<R>).put(update_policy_handler::<R>),
        )
        .route(
            "/api/v1/mentorship/overrides/:member_id",
            put(set_override_handler::<R>).delete(remove_override_handler::<R>),
        )
        .route(
            "/api/v1/mentorship/reviews/:member_id",
            put(review_handler::<R>),
        )
        .route(
            "/api/v1/mentorship/pairings",
            get(active_pairs_handler::<R>).post(create_pairing_handler::<R>),
        )
        .route(
            "/api/v1/mentorship/pairings/:pairing_id",
            delete(remove_pairing_handler::<R>),
        )
        .route(
            "/api/v1/mentorship/pairings/:pairing_id/deactivate",
            post(deactivate_pairing_handler::<R>),
        )
        .route(
            "/api/v1/mentorship/pairings/:pairing_id/notes",
            get(notes_handler::<R>).post(add_note_handler::<R>),
        )
        .route(
            "/api/v1/mentorship/pairings/:pairing_id/notes/:note_id",
            delete(delete_note_handler::<R>),
        )
        .route(
            "/api/v1/mentorship/members/:member_id/pairings",
            get(member_pairs_handler::<R>),
        )
        .route("/api/v1/mentorship/readiness", get(readiness_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RosterSortKey {
    #[default]
    Name,
    Status,
    Metrics,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RosterQuery {
    #[serde(default)]
    sort: RosterSortKey,
    #[serde(default)]
    direction: SortDirection,
    #[serde(default)]
    order: StatusOrder,
}

impl RosterQuery {
    fn spec(&self) -> SortSpec {
        match self.sort {
            RosterSortKey::Name => SortSpec::Name {
                direction: self.direction,
            },
            RosterSortKey::Status => SortSpec::Status { order: self.order },
            RosterSortKey::Metrics => SortSpec::Metrics {
                direction: self.direction,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RosterResponse {
    policy: MentorshipPolicy,
    members: Vec<CandidateView>,
    unresolved: Vec<MemberId>,
    ratio: u32,
    readiness: ReadinessAssessment,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecomputeSummary {
    resolved: usize,
    unresolved: Vec<MemberId>,
    ratio: u32,
    readiness: ReadinessAssessment,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReadinessResponse {
    #[serde(flatten)]
    readiness: ReadinessAssessment,
    ratio: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverrideRequest {
    eligible: bool,
    reason: String,
    set_by_uid: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRequest {
    #[serde(default)]
    metrics: MemberMetrics,
    #[serde(default, rename = "override")]
    override_decision: Option<MentorshipOverride>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PairingRequest {
    mentor_id: MemberId,
    mentee_id: MemberId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotesQuery {
    viewer: String,
    #[serde(default)]
    admin: bool,
}

async fn current_snapshot<R>(
    service: &MentorshipService<R>,
) -> Result<Arc<RosterSnapshot>, AppError>
where
    R: MentorshipRepository + 'static,
{
    match service.latest_snapshot() {
        Some(snapshot) => Ok(snapshot),
        None => Ok(service.recompute_all().await?),
    }
}

pub(crate) async fn roster_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Query(query): Query<RosterQuery>,
) -> Result<Json<RosterResponse>, AppError>
where
    R: MentorshipRepository + 'static,
{
    let snapshot = current_snapshot(&service).await?;
    let members = rank(&snapshot.pass.resolved, query.spec())
        .iter()
        .map(|entry| entry.view())
        .collect();

    Ok(Json(RosterResponse {
        policy: snapshot.policy,
        members,
        unresolved: snapshot.pass.unresolved.clone(),
        ratio: snapshot.ratio,
        readiness: snapshot.readiness,
    }))
}

pub(crate) async fn recompute_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
) -> Result<Json<RecomputeSummary>, AppError>
where
    R: MentorshipRepository + 'static,
{
    let snapshot = service.recompute_all().await?;
    Ok(Json(RecomputeSummary {
        resolved: snapshot.pass.resolved.len(),
        unresolved: snapshot.pass.unresolved.clone(),
        ratio: snapshot.ratio,
        readiness: snapshot.readiness,
    }))
}

pub(crate) async fn policy_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
) -> Result<Json<MentorshipPolicy>, AppError>
where
    R: MentorshipRepository + 'static,
{
    Ok(Json(service.policy().await?))
}

pub(crate) async fn update_policy_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Json(update): Json<PolicyUpdate>,
) -> Result<Json<MentorshipPolicy>, AppError>
where
    R: MentorshipRepository + 'static,
{
    Ok(Json(service.set_policy(update).await?))
}

pub(crate) async fn set_override_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Path(member_id): Path<String>,
    Json(request): Json<OverrideRequest>,
) -> Result<StatusCode, AppError>
where
    R: MentorshipRepository + 'static,
{
    service
        .set_override(
            &MemberId(member_id),
            request.eligible,
            request.reason,
            request.set_by_uid,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn remove_override_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Path(member_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    R: MentorshipRepository + 'static,
{
    service.remove_override(&MemberId(member_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn review_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Path(member_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<StatusCode, AppError>
where
    R: MentorshipRepository + 'static,
{
    service
        .apply_review(
            &MemberId(member_id),
            request.metrics,
            request.override_decision,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn active_pairs_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
) -> Result<Json<Vec<MentorshipPair>>, AppError>
where
    R: MentorshipRepository + 'static,
{
    Ok(Json(service.list_active_pairs().await?))
}

pub(crate) async fn create_pairing_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Json(request): Json<PairingRequest>,
) -> Result<Response, AppError>
where
    R: MentorshipRepository + 'static,
{
    let pair = service
        .create_pairing(&request.mentor_id, &request.mentee_id)
        .await?;
    Ok((StatusCode::CREATED, Json(pair)).into_response())
}

pub(crate) async fn remove_pairing_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Path(pairing_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    R: MentorshipRepository + 'static,
{
    service.remove_pairing(&PairingId(pairing_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn deactivate_pairing_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Path(pairing_id): Path<String>,
) -> Result<Json<MentorshipPair>, AppError>
where
    R: MentorshipRepository + 'static,
{
    Ok(Json(service.deactivate_pairing(&PairingId(pairing_id)).await?))
}

pub(crate) async fn member_pairs_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Path(member_id): Path<String>,
) -> Result<Json<Vec<MentorshipPair>>, AppError>
where
    R: MentorshipRepository + 'static,
{
    Ok(Json(service.pairs_for_member(&MemberId(member_id)).await?))
}

pub(crate) async fn readiness_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
) -> Result<Json<ReadinessResponse>, AppError>
where
    R: MentorshipRepository + 'static,
{
    let snapshot = current_snapshot(&service).await?;
    Ok(Json(ReadinessResponse {
        readiness: snapshot.readiness,
        ratio: snapshot.ratio,
    }))
}

pub(crate) async fn notes_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Path(pairing_id): Path<String>,
    Query(query): Query<NotesQuery>,
) -> Result<Json<Vec<MentorshipNote>>, AppError>
where
    R: MentorshipRepository + 'static,
{
    let viewer = NoteViewer {
        member_id: MemberId(query.viewer),
        is_admin: query.admin,
    };
    Ok(Json(
        service.notes_for(&PairingId(pairing_id), &viewer).await?,
    ))
}

pub(crate) async fn add_note_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Path(pairing_id): Path<String>,
    Json(draft): Json<NoteDraft>,
) -> Result<Response, AppError>
where
    R: MentorshipRepository + 'static,
{
    let note = service.add_note(&PairingId(pairing_id), draft).await?;
    Ok((StatusCode::CREATED, Json(note)).into_response())
}

pub(crate) async fn delete_note_handler<R>(
    State(service): State<Arc<MentorshipService<R>>>,
    Path((pairing_id, note_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError>
where
    R: MentorshipRepository + 'static,
{
    service
        .delete_note(&PairingId(pairing_id), &NoteId(note_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
