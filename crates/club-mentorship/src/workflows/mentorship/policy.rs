use serde::{Deserialize, Serialize};

const DEFAULT_MIN_SPEECHES: u32 = 3;
const DEFAULT_MIN_MONTHS: u32 = 6;
const DEFAULT_MIN_ATTENDANCE_PCT_90: u32 = 50;
const DEFAULT_MIN_ROLES_90: u32 = 2;

/// Club-wide thresholds for unconditional mentor eligibility.
///
/// One live record per club. Edits only affect the next evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorshipPolicy {
    pub min_speeches: u32,
    pub min_months: u32,
    pub min_attendance_pct_90: u32,
    pub min_roles_90: u32,
}

impl Default for MentorshipPolicy {
    fn default() -> Self {
        Self {
            min_speeches: DEFAULT_MIN_SPEECHES,
            min_months: DEFAULT_MIN_MONTHS,
            min_attendance_pct_90: DEFAULT_MIN_ATTENDANCE_PCT_90,
            min_roles_90: DEFAULT_MIN_ROLES_90,
        }
    }
}

/// Unvalidated policy values as submitted by the officer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyUpdate {
    pub min_speeches: i64,
    pub min_months: i64,
    pub min_attendance_pct_90: i64,
    pub min_roles_90: i64,
}

impl From<MentorshipPolicy> for PolicyUpdate {
    fn from(policy: MentorshipPolicy) -> Self {
        Self {
            min_speeches: i64::from(policy.min_speeches),
            min_months: i64::from(policy.min_months),
            min_attendance_pct_90: i64::from(policy.min_attendance_pct_90),
            min_roles_90: i64::from(policy.min_roles_90),
        }
    }
}

/// Rejections raised before any administrative write is attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("policy field {field} must be {expected} (found {value})")]
    PolicyField {
        field: &'static str,
        expected: &'static str,
        value: i64,
    },
    #[error("a member cannot be paired with themselves ({0})")]
    SelfPairing(String),
    #[error("archived member {0} cannot take part in a pairing")]
    ArchivedParticipant(String),
    #[error("member {member_id} is not eligible to mentor (status {status})")]
    MentorNotEligible {
        member_id: String,
        status: &'static str,
    },
    #[error("note text must not be empty")]
    EmptyNote,
    #[error("goal status is only valid on goal notes")]
    GoalStatusOnNonGoal,
}

impl PolicyUpdate {
    /// Validate every field in declaration order, returning the first violation.
    pub fn validate(self) -> Result<MentorshipPolicy, ValidationError> {
        let min_speeches = non_negative("min_speeches", self.min_speeches)?;
        let min_months = non_negative("min_months", self.min_months)?;
        let min_attendance_pct_90 = percentage("min_attendance_pct_90", self.min_attendance_pct_90)?;
        let min_roles_90 = non_negative("min_roles_90", self.min_roles_90)?;

        Ok(MentorshipPolicy {
            min_speeches,
            min_months,
            min_attendance_pct_90,
            min_roles_90,
        })
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| ValidationError::PolicyField {
        field,
        expected: "a non-negative integer",
        value,
    })
}

fn percentage(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    match u32::try_from(value) {
        Ok(pct) if pct <= 100 => Ok(pct),
        _ => Err(ValidationError::PolicyField {
            field,
            expected: "between 0 and 100",
            value,
        }),
    }
}
