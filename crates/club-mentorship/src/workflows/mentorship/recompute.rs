use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::domain::{months_since_join, Member, MemberId};
use super::policy::MentorshipPolicy;
use super::repository::{MentorshipRepository, RepositoryError};
use super::roster::{EvaluatedMember, EvaluationPass};

/// Evaluate non-archived members with at most `concurrency` members in flight.
///
/// Each member's metrics and override are fetched independently. Any fetch failure puts the
/// member in `unresolved` without affecting the rest of the pass.
pub(crate) async fn evaluate_members<R>(
    repository: Arc<R>,
    roster: Vec<Member>,
    policy: MentorshipPolicy,
    today: NaiveDate,
    concurrency: usize,
) -> EvaluationPass
where
    R: MentorshipRepository + 'static,
{
    let candidates: Vec<Member> = roster
        .into_iter()
        .filter(|member| !member.is_archived())
        .collect();
    let expected: BTreeSet<MemberId> = candidates.iter().map(|member| member.id.clone()).collect();

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for member in candidates {
        let repository = Arc::clone(&repository);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return Err((
                    member.id,
                    RepositoryError::Unavailable("recompute cancelled".to_string()),
                ));
            };

            let (metrics, decision) = tokio::join!(
                repository.metrics(&member.id),
                repository.override_for(&member.id)
            );

            match (metrics, decision) {
                (Ok(metrics), Ok(decision)) => {
                    let months = months_since_join(member.joined_date, today);
                    Ok(EvaluatedMember::evaluate(
                        member,
                        &metrics.unwrap_or_default(),
                        months,
                        &policy,
                        decision,
                    ))
                }
                (Err(error), _) | (_, Err(error)) => Err((member.id, error)),
            }
        });
    }

    let mut pass = EvaluationPass::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(entry)) => pass.resolved.push(entry),
            Ok(Err((member_id, error))) => {
                warn!(member_id = %member_id, %error, "member excluded from evaluation pass");
                pass.unresolved.push(member_id);
            }
            Err(error) => warn!(%error, "evaluation task aborted"),
        }
    }

    // Aborted tasks never report their member; account for them here.
    let accounted: BTreeSet<&MemberId> = pass
        .resolved
        .iter()
        .map(|entry| entry.id())
        .chain(pass.unresolved.iter())
        .collect();
    let missing: Vec<MemberId> = expected
        .iter()
        .filter(|id| !accounted.contains(id))
        .cloned()
        .collect();
    pass.unresolved.extend(missing);

    pass.resolved.sort_by(|left, right| {
        left.member
            .name
            .to_lowercase()
            .cmp(&right.member.name.to_lowercase())
            .then_with(|| left.id().cmp(right.id()))
    });
    pass.unresolved.sort();

    debug!(
        resolved = pass.resolved.len(),
        unresolved = pass.unresolved.len(),
        "evaluation pass complete"
    );
    pass
}
