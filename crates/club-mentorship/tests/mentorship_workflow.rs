use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use club_mentorship::workflows::mentorship::{
    rank, Clock, EligibilityStatus, InMemoryMentorshipRepository, Member, MemberId,
    MemberMetrics, MemberStatus, MentorshipService, PolicyUpdate, ReadinessLatch, SortSpec,
    StatusOrder, WorkflowPhase,
};

struct TermClock;

impl Clock for TermClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 18, 30, 0)
            .single()
            .expect("valid timestamp")
    }
}

fn member(id: &str, name: &str, joined: (i32, u32, u32), status: MemberStatus) -> Member {
    Member {
        id: MemberId::new(id),
        name: name.to_string(),
        joined_date: NaiveDate::from_ymd_opt(joined.0, joined.1, joined.2),
        status,
    }
}

fn metrics(speeches: i64, attendance: i64, roles: i64) -> MemberMetrics {
    MemberMetrics {
        speeches_completed: speeches,
        attendance_pct_90: attendance,
        roles_in_90: roles,
        last_updated: None,
    }
}

fn spring_term_club() -> InMemoryMentorshipRepository {
    let repository = InMemoryMentorshipRepository::new();
    let roster = [
        (
            member("m-01", "Priya Raman", (2023, 2, 14), MemberStatus::Active),
            metrics(9, 85, 5),
        ),
        (
            member("m-02", "Tom Becker", (2025, 4, 1), MemberStatus::Active),
            metrics(3, 45, 2),
        ),
        (
            member("m-03", "Lena Ortiz", (2025, 12, 3), MemberStatus::Possible),
            metrics(0, 100, 1),
        ),
        (
            member("m-04", "Omar Haddad", (2024, 6, 20), MemberStatus::Unavailable),
            metrics(4, 55, 2),
        ),
        (
            member("m-05", "June Park", (2018, 9, 9), MemberStatus::Archived),
            metrics(30, 95, 9),
        ),
    ];

    for (entry, stored) in roster {
        repository
            .put_metrics(&entry.id, stored)
            .expect("seed metrics");
        repository.put_member(entry).expect("seed member");
    }

    repository
}

#[tokio::test]
async fn officer_reviews_candidates_then_pairs_the_club() {
    let repository = Arc::new(spring_term_club());
    let service = MentorshipService::with_clock(repository, Arc::new(TermClock));
    let mut latch = ReadinessLatch::new();

    let opening = service.recompute_all().await.expect("initial pass");
    assert_eq!(opening.pass.resolved.len(), 4, "archived members are skipped");
    assert_eq!(
        latch.observe(&opening.readiness),
        WorkflowPhase::ReviewCandidates,
        "tom is a close call so the officer starts on candidates"
    );

    let tom = opening
        .pass
        .find(&MemberId::new("m-02"))
        .expect("tom evaluated");
    assert_eq!(tom.status(), EligibilityStatus::NeedsReview);
    assert_eq!(tom.eligibility.reasons, vec!["Attendance below target."]);

    service
        .set_override(&MemberId::new("m-02"), true, "Chaired the fall contest", "vpe-01")
        .await
        .expect("approve tom");

    let reviewed = service.latest_snapshot().expect("snapshot published");
    assert_eq!(reviewed.readiness.phase, WorkflowPhase::CreatePairings);
    assert_eq!(
        latch.observe(&reviewed.readiness),
        WorkflowPhase::ReviewCandidates,
        "the session keeps its opening phase"
    );

    let ordered = rank(
        &reviewed.pass.resolved,
        SortSpec::Status {
            order: StatusOrder::BlockedFirst,
        },
    );
    let names: Vec<_> = ordered
        .iter()
        .map(|entry| entry.member.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Omar Haddad", "Priya Raman", "Tom Becker", "Lena Ortiz"]
    );

    service
        .create_pairing(&MemberId::new("m-01"), &MemberId::new("m-03"))
        .await
        .expect("priya mentors lena");
    service
        .create_pairing(&MemberId::new("m-02"), &MemberId::new("m-04"))
        .await
        .expect("tom mentors omar");

    let paired = service.latest_snapshot().expect("snapshot published");
    assert_eq!(paired.ratio, 50);
    assert!(paired.readiness.all_eligible_paired);
    assert_eq!(paired.readiness.phase, WorkflowPhase::ReviewCandidates);

    latch.reset();
    assert_eq!(
        latch.observe(&paired.readiness),
        WorkflowPhase::ReviewCandidates
    );
}

#[tokio::test]
async fn tightening_policy_does_not_unpair_existing_mentors() {
    let repository = Arc::new(spring_term_club());
    let service = MentorshipService::with_clock(repository, Arc::new(TermClock));

    service
        .create_pairing(&MemberId::new("m-01"), &MemberId::new("m-02"))
        .await
        .expect("pairing");

    service
        .set_policy(PolicyUpdate {
            min_speeches: 12,
            min_months: 6,
            min_attendance_pct_90: 50,
            min_roles_90: 2,
        })
        .await
        .expect("stricter policy");

    let snapshot = service.latest_snapshot().expect("snapshot");
    let priya = snapshot
        .pass
        .find(&MemberId::new("m-01"))
        .expect("priya evaluated");
    assert_eq!(priya.status(), EligibilityStatus::NotEligible);
    assert_eq!(
        priya.eligibility.reasons,
        vec!["Fewer than 12 Pathways speeches completed."]
    );

    let active = service.list_active_pairs().await.expect("pairs");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].mentor_id, MemberId::new("m-01"));
}
