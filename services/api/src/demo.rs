use crate::infra::sample_club;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use clap::{Args, ValueEnum};
use club_mentorship::error::AppError;
use club_mentorship::workflows::mentorship::{
    rank, CandidateGroup, Clock, EvaluatedMember, MentorshipService, RosterSnapshot,
    SortDirection, SortSpec, StatusOrder, WorkflowPhase,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum DemoSort {
    #[default]
    Name,
    Status,
    Metrics,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Column used to order the printed roster
    #[arg(long, value_enum, default_value_t = DemoSort::Name)]
    pub(crate) sort: DemoSort,
    /// Order statuses blocked, eligible, not eligible, needs review (implies --sort status)
    #[arg(long)]
    pub(crate) blocked_first: bool,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

impl DemoArgs {
    fn sort_spec(&self) -> SortSpec {
        if self.blocked_first {
            return SortSpec::Status {
                order: StatusOrder::BlockedFirst,
            };
        }

        match self.sort {
            DemoSort::Name => SortSpec::Name {
                direction: SortDirection::Asc,
            },
            DemoSort::Status => SortSpec::Status {
                order: StatusOrder::Ascending,
            },
            DemoSort::Metrics => SortSpec::Metrics {
                direction: SortDirection::Desc,
            },
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

struct DemoClock(DateTime<Utc>);

impl Clock for DemoClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let clock = DemoClock(today.and_time(NaiveTime::MIN).and_utc());
    let service = MentorshipService::with_clock(Arc::new(sample_club()?), Arc::new(clock));

    println!("Club mentorship demo ({today})");
    let snapshot = service.recompute_all().await?;
    render_snapshot(&snapshot, args.sort_spec());

    let Some((mentor, mentee)) = demo_pairing(&snapshot) else {
        println!("\nNo mentor-ready member and not-ready mentee available; skipping pairing.");
        return Ok(());
    };

    let pair = service
        .create_pairing(mentor.id(), mentee.id())
        .await?;
    println!(
        "\nPaired {} (mentor) with {} (mentee) as {}",
        mentor.member.name, mentee.member.name, pair.id
    );

    let updated = service
        .latest_snapshot()
        .unwrap_or_else(|| Arc::clone(&snapshot));
    println!(
        "Mentorship ratio now {}% | phase {}",
        updated.ratio,
        phase_label(updated.readiness.phase)
    );

    Ok(())
}

fn render_snapshot(snapshot: &RosterSnapshot, spec: SortSpec) {
    let policy = snapshot.policy;
    println!(
        "Policy: {} speeches | {} months | {}% attendance | {} roles in 90 days",
        policy.min_speeches,
        policy.min_months,
        policy.min_attendance_pct_90,
        policy.min_roles_90
    );

    println!("\nRoster");
    for entry in rank(&snapshot.pass.resolved, spec) {
        println!(
            "- {:<18} {:<20} {}",
            entry.member.name,
            entry.status().badge(),
            entry.eligibility.reasons.join(" ")
        );
    }
    for member_id in &snapshot.pass.unresolved {
        println!("- {:<18} (metrics unavailable)", member_id.as_str());
    }

    println!(
        "\nReady {} | review {} | not ready {}",
        snapshot.pass.in_group(CandidateGroup::Ready).len(),
        snapshot.pass.in_group(CandidateGroup::Review).len(),
        snapshot.pass.in_group(CandidateGroup::NotReady).len()
    );
    println!(
        "Mentorship ratio {}% | phase {}",
        snapshot.ratio,
        phase_label(snapshot.readiness.phase)
    );
}

/// First mentor-ready member paired with the first member who is not ready, by name.
fn demo_pairing(snapshot: &RosterSnapshot) -> Option<(&EvaluatedMember, &EvaluatedMember)> {
    let mentor = snapshot
        .pass
        .resolved
        .iter()
        .find(|entry| entry.status().is_mentor_ready())?;
    let mentee = snapshot
        .pass
        .resolved
        .iter()
        .find(|entry| entry.status().group() == CandidateGroup::NotReady)?;
    Some((mentor, mentee))
}

fn phase_label(phase: WorkflowPhase) -> &'static str {
    match phase {
        WorkflowPhase::ReviewCandidates => "review candidates",
        WorkflowPhase::CreatePairings => "create pairings",
    }
}
