//! Pairing rules that do not depend on storage: keys, creation checks, filtering, and the
//! club-wide mentorship ratio.

use super::domain::{Member, MemberId, MentorshipPair};
use super::eligibility::EligibilityStatus;
use super::policy::ValidationError;

/// Reject a pairing before anything is written.
///
/// The mentor's status is checked once, here. Existing pairs are never re-validated when the
/// mentor's status later changes.
pub fn validate_pairing(
    mentor: &Member,
    mentee: &Member,
    mentor_status: EligibilityStatus,
) -> Result<(), ValidationError> {
    validate_participants(mentor, mentee)?;

    if !mentor_status.is_mentor_ready() {
        return Err(ValidationError::MentorNotEligible {
            member_id: mentor.id.0.clone(),
            status: mentor_status.label(),
        });
    }

    Ok(())
}

/// Checks that need no evaluation: distinct members, neither archived.
pub fn validate_participants(mentor: &Member, mentee: &Member) -> Result<(), ValidationError> {
    if mentor.id == mentee.id {
        return Err(ValidationError::SelfPairing(mentor.id.0.clone()));
    }

    for participant in [mentor, mentee] {
        if participant.is_archived() {
            return Err(ValidationError::ArchivedParticipant(participant.id.0.clone()));
        }
    }

    Ok(())
}

pub fn active_pairs(pairs: &[MentorshipPair]) -> Vec<MentorshipPair> {
    pairs.iter().filter(|pair| pair.active).cloned().collect()
}

/// Active pairs where the member is either mentor or mentee.
pub fn pairs_for_member(pairs: &[MentorshipPair], member: &MemberId) -> Vec<MentorshipPair> {
    pairs
        .iter()
        .filter(|pair| pair.active && pair.involves(member))
        .cloned()
        .collect()
}

/// Active pairs as a rounded percentage of the non-archived roster; zero for an empty roster.
pub fn compute_ratio(members: &[Member], pairs: &[MentorshipPair]) -> u32 {
    let population = members.iter().filter(|member| !member.is_archived()).count() as u64;
    if population == 0 {
        return 0;
    }

    let active = pairs.iter().filter(|pair| pair.active).count() as u64;
    // Integer half-up rounding of active * 100 / population.
    let rounded = (active * 200 + population) / (population * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
