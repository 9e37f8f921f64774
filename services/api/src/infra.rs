use chrono::NaiveDate;
use club_mentorship::workflows::mentorship::{
    InMemoryMentorshipRepository, Member, MemberId, MemberMetrics, MemberStatus,
    RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

struct SampleMember {
    id: &'static str,
    name: &'static str,
    joined: (i32, u32, u32),
    status: MemberStatus,
    metrics: Option<(i64, i64, i64)>,
}

const SAMPLE_CLUB: [SampleMember; 7] = [
    SampleMember {
        id: "m-100",
        name: "Alicia Moreno",
        joined: (2022, 3, 8),
        status: MemberStatus::Active,
        metrics: Some((11, 88, 6)),
    },
    SampleMember {
        id: "m-101",
        name: "Brandon Lee",
        joined: (2024, 5, 14),
        status: MemberStatus::Active,
        metrics: Some((4, 42, 3)),
    },
    SampleMember {
        id: "m-102",
        name: "chioma Obi",
        joined: (2025, 8, 19),
        status: MemberStatus::Active,
        metrics: Some((1, 92, 1)),
    },
    SampleMember {
        id: "m-103",
        name: "Dmitri Volkov",
        joined: (2023, 11, 1),
        status: MemberStatus::Active,
        metrics: Some((7, 71, 4)),
    },
    SampleMember {
        id: "m-104",
        name: "Elena Rossi",
        joined: (2024, 1, 23),
        status: MemberStatus::Unavailable,
        metrics: Some((2, 63, 2)),
    },
    SampleMember {
        id: "m-105",
        name: "Farid Nasser",
        joined: (2019, 6, 2),
        status: MemberStatus::Archived,
        metrics: Some((25, 90, 8)),
    },
    SampleMember {
        id: "m-106",
        name: "Grace Whitfield",
        joined: (2025, 12, 5),
        status: MemberStatus::Possible,
        metrics: None,
    },
];

/// In-memory store loaded with a small club for demos and local runs.
pub(crate) fn sample_club() -> Result<InMemoryMentorshipRepository, RepositoryError> {
    let repository = InMemoryMentorshipRepository::new();

    for sample in &SAMPLE_CLUB {
        let id = MemberId::new(sample.id);
        if let Some((speeches, attendance, roles)) = sample.metrics {
            repository.put_metrics(
                &id,
                MemberMetrics {
                    speeches_completed: speeches,
                    attendance_pct_90: attendance,
                    roles_in_90: roles,
                    last_updated: None,
                },
            )?;
        }
        repository.put_member(Member {
            id,
            name: sample.name.to_string(),
            joined_date: NaiveDate::from_ymd_opt(sample.joined.0, sample.joined.1, sample.joined.2),
            status: sample.status,
        })?;
    }

    Ok(repository)
}
