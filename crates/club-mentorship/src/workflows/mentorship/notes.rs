use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{MemberId, MentorshipPair, PairingId};
use super::policy::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NoteId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    Session,
    Goal,
    Feedback,
    Milestone,
    General,
}

/// Audience allowed to read a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteVisibility {
    Mentor,
    Mentee,
    #[default]
    Both,
    Officers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Open,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorshipNote {
    pub id: NoteId,
    pub pairing_id: PairingId,
    pub author_id: MemberId,
    pub text: String,
    pub note_type: NoteType,
    pub visibility: NoteVisibility,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_status: Option<GoalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_role: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Note content as entered in the notes panel, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub author_id: MemberId,
    pub text: String,
    pub note_type: NoteType,
    #[serde(default)]
    pub visibility: NoteVisibility,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub goal_status: Option<GoalStatus>,
    #[serde(default)]
    pub meeting_date: Option<NaiveDate>,
    #[serde(default)]
    pub linked_role: Option<String>,
}

impl NoteDraft {
    /// Trim and check the draft. Runs before the store assigns an id.
    pub(crate) fn normalize(self) -> Result<Self, ValidationError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::EmptyNote);
        }

        let goal_status = match (self.note_type, self.goal_status) {
            (NoteType::Goal, status) => Some(status.unwrap_or(GoalStatus::Open)),
            (_, Some(_)) => return Err(ValidationError::GoalStatusOnNonGoal),
            (_, None) => None,
        };

        let mut goals: Vec<String> = Vec::with_capacity(self.goals.len());
        for goal in self.goals {
            let goal = goal.trim();
            if !goal.is_empty() && !goals.iter().any(|existing| existing == goal) {
                goals.push(goal.to_string());
            }
        }

        let linked_role = self
            .linked_role
            .map(|role| role.trim().to_string())
            .filter(|role| !role.is_empty());

        Ok(Self {
            text,
            goals,
            goal_status,
            linked_role,
            ..self
        })
    }

    pub(crate) fn into_note(
        self,
        id: NoteId,
        pairing_id: PairingId,
        created_at: DateTime<Utc>,
    ) -> MentorshipNote {
        MentorshipNote {
            id,
            pairing_id,
            author_id: self.author_id,
            text: self.text,
            note_type: self.note_type,
            visibility: self.visibility,
            goals: self.goals,
            goal_status: self.goal_status,
            meeting_date: self.meeting_date,
            linked_role: self.linked_role,
            created_at,
        }
    }
}

/// Who is asking to read notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteViewer {
    pub member_id: MemberId,
    #[serde(default)]
    pub is_admin: bool,
}

pub fn can_view(note: &MentorshipNote, viewer: &NoteViewer, pair: &MentorshipPair) -> bool {
    if viewer.is_admin {
        return true;
    }

    match note.visibility {
        NoteVisibility::Mentor => pair.mentor_id == viewer.member_id,
        NoteVisibility::Mentee => pair.mentee_id == viewer.member_id,
        NoteVisibility::Both => pair.involves(&viewer.member_id),
        NoteVisibility::Officers => false,
    }
}

/// Visible notes, newest first.
pub fn visible_notes(
    notes: Vec<MentorshipNote>,
    viewer: &NoteViewer,
    pair: &MentorshipPair,
) -> Vec<MentorshipNote> {
    let mut visible: Vec<MentorshipNote> = notes
        .into_iter()
        .filter(|note| can_view(note, viewer, pair))
        .collect();
    visible.sort_by(|left, right| {
        right
            .created_at
            .cmp(&left.created_at)
            .then_with(|| right.id.cmp(&left.id))
    });
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pair() -> MentorshipPair {
        MentorshipPair::new(
            MemberId::new("mentor"),
            MemberId::new("mentee"),
            Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).single().expect("valid"),
        )
    }

    fn note(visibility: NoteVisibility, minute: u32) -> MentorshipNote {
        MentorshipNote {
            id: NoteId(format!("note-{minute}")),
            pairing_id: pair().id,
            author_id: MemberId::new("mentor"),
            text: "Planned Ice Breaker".to_string(),
            note_type: NoteType::Session,
            visibility,
            goals: Vec::new(),
            goal_status: None,
            meeting_date: None,
            linked_role: None,
            created_at: Utc
                .with_ymd_and_hms(2025, 2, 1, 18, minute, 0)
                .single()
                .expect("valid"),
        }
    }

    fn viewer(id: &str, is_admin: bool) -> NoteViewer {
        NoteViewer {
            member_id: MemberId::new(id),
            is_admin,
        }
    }

    #[test]
    fn visibility_rules_follow_audience() {
        let pair = pair();
        let mentor_only = note(NoteVisibility::Mentor, 1);
        let officers = note(NoteVisibility::Officers, 2);
        let both = note(NoteVisibility::Both, 3);

        assert!(can_view(&mentor_only, &viewer("mentor", false), &pair));
        assert!(!can_view(&mentor_only, &viewer("mentee", false), &pair));
        assert!(!can_view(&officers, &viewer("mentor", false), &pair));
        assert!(can_view(&officers, &viewer("vpe", true), &pair));
        assert!(can_view(&both, &viewer("mentee", false), &pair));
        assert!(!can_view(&both, &viewer("outsider", false), &pair));
    }

    #[test]
    fn visible_notes_are_newest_first() {
        let pair = pair();
        let notes = vec![
            note(NoteVisibility::Both, 5),
            note(NoteVisibility::Mentee, 9),
            note(NoteVisibility::Both, 7),
        ];

        let visible = visible_notes(notes, &viewer("mentor", false), &pair);
        let ids: Vec<_> = visible.iter().map(|note| note.id.0.as_str()).collect();
        assert_eq!(ids, vec!["note-7", "note-5"]);
    }

    #[test]
    fn drafts_are_normalized() {
        let draft = NoteDraft {
            author_id: MemberId::new("mentee"),
            text: "  Finish Level 1  ".to_string(),
            note_type: NoteType::Goal,
            visibility: NoteVisibility::Both,
            goals: vec![" Ice Breaker ".to_string(), "Ice Breaker".to_string(), " ".to_string()],
            goal_status: None,
            meeting_date: None,
            linked_role: Some("  ".to_string()),
        };

        let note = draft
            .normalize()
            .expect("valid draft")
            .into_note(NoteId("n-1".to_string()), pair().id, Utc::now());
        assert_eq!(note.text, "Finish Level 1");
        assert_eq!(note.goals, vec!["Ice Breaker".to_string()]);
        assert_eq!(note.goal_status, Some(GoalStatus::Open));
        assert_eq!(note.linked_role, None);
    }

    #[test]
    fn drafts_reject_empty_text_and_stray_goal_status() {
        let mut draft = NoteDraft {
            author_id: MemberId::new("mentor"),
            text: "   ".to_string(),
            note_type: NoteType::Feedback,
            visibility: NoteVisibility::Mentor,
            goals: Vec::new(),
            goal_status: None,
            meeting_date: None,
            linked_role: None,
        };
        assert_eq!(draft.clone().normalize(), Err(ValidationError::EmptyNote));

        draft.text = "Great vocal variety".to_string();
        draft.goal_status = Some(GoalStatus::Done);
        assert_eq!(draft.normalize(), Err(ValidationError::GoalStatusOnNonGoal));
    }
}
