use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for club roster members.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Roster membership state. Archived members never take part in evaluation or pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    Possible,
    Unavailable,
    Archived,
}

impl MemberStatus {
    pub const fn is_archived(self) -> bool {
        matches!(self, MemberStatus::Archived)
    }
}

/// Roster entry as supplied by the member directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default)]
    pub joined_date: Option<NaiveDate>,
    pub status: MemberStatus,
}

impl Member {
    pub fn is_archived(&self) -> bool {
        self.status.is_archived()
    }
}

/// Raw participation metrics as persisted by the attendance tracker.
///
/// Values are signed because the store does not enforce ranges; the evaluator clamps them.
/// Tenure is not stored here; it is always derived from the join date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberMetrics {
    pub speeches_completed: i64,
    pub attendance_pct_90: i64,
    pub roles_in_90: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Administrative decision that supersedes the policy for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorshipOverride {
    pub eligible: bool,
    pub reason: String,
    pub set_by_uid: String,
}

/// Composite key `{mentor}_{mentee}` that makes pairing writes idempotent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairingId(pub String);

impl PairingId {
    pub fn for_members(mentor: &MemberId, mentee: &MemberId) -> Self {
        Self(format!("{}_{}", mentor.0, mentee.0))
    }
}

impl fmt::Display for PairingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mentor/mentee relationship record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorshipPair {
    pub id: PairingId,
    pub mentor_id: MemberId,
    pub mentee_id: MemberId,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl MentorshipPair {
    pub fn new(mentor_id: MemberId, mentee_id: MemberId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: PairingId::for_members(&mentor_id, &mentee_id),
            mentor_id,
            mentee_id,
            active: true,
            created_at,
        }
    }

    pub fn involves(&self, member: &MemberId) -> bool {
        &self.mentor_id == member || &self.mentee_id == member
    }
}

/// Whole calendar months between the join date and `today`, ignoring the day of month.
///
/// Missing or future join dates count as zero months.
pub fn months_since_join(joined: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(joined) = joined else {
        return 0;
    };

    let years = i64::from(today.year()) - i64::from(joined.year());
    let months = i64::from(today.month()) - i64::from(joined.month());
    let total = years * 12 + months;

    u32::try_from(total.max(0)).unwrap_or(u32::MAX)
}
