//! Collaborative draft state machine.
//!
//! A draft holds two independently-authored halves. Each party may only
//! ever write its own half, which makes the two submissions commutative:
//! whatever order they land in, the merged draft is the same. The status
//! moves EDITING → COMPLETED exactly once, when both contents are
//! non-empty, and nothing transitions out of COMPLETED.
//!
//! The database is the source of truth (see `collab_handler`); this module
//! carries the pure rules so they can be checked without a database.

use uuid::Uuid;

pub const STATUS_EDITING: &str = "EDITING";
pub const STATUS_COMPLETED: &str = "COMPLETED";

/// Derive a fresh draft id from the originating entry plus a
/// millisecond-timestamp nonce, so repeated invitations on the same entry
/// never collide.
pub fn derive_draft_id(entry_id: Uuid, nonce_millis: i64) -> String {
    format!("{}-{}", entry_id.simple(), nonce_millis)
}

/// Which half of the draft a write belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Inviter,
    Collaborator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Inviter => "inviter",
            Role::Collaborator => "collaborator",
        }
    }
}

/// In-memory view of a draft's mutable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftState {
    pub inviter_content: Option<String>,
    pub inviter_images: Vec<String>,
    pub collaborator_content: Option<String>,
    pub collaborator_images: Vec<String>,
    pub completed: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ApplyError {
    /// Completed drafts are immutable.
    DraftCompleted,
    /// Blank content never counts as a contribution.
    EmptyContent,
}

impl DraftState {
    /// Merge one party's contribution, touching only that party's fields.
    /// Returns true when this application completed the draft.
    pub fn apply(
        &mut self,
        role: Role,
        content: &str,
        images: &[String],
    ) -> Result<bool, ApplyError> {
        if self.completed {
            return Err(ApplyError::DraftCompleted);
        }
        if content.trim().is_empty() {
            return Err(ApplyError::EmptyContent);
        }

        match role {
            Role::Inviter => {
                self.inviter_content = Some(content.to_string());
                self.inviter_images = images.to_vec();
            }
            Role::Collaborator => {
                self.collaborator_content = Some(content.to_string());
                self.collaborator_images = images.to_vec();
            }
        }

        if self.both_present() {
            self.completed = true;
            return Ok(true);
        }
        Ok(false)
    }

    /// Both halves hold non-empty content.
    pub fn both_present(&self) -> bool {
        is_present(&self.inviter_content) && is_present(&self.collaborator_content)
    }
}

fn is_present(content: &Option<String>) -> bool {
    content.as_deref().map(|c| !c.trim().is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_draft_id_unique_per_nonce() {
        let entry = Uuid::new_v4();
        let a = derive_draft_id(entry, 1_700_000_000_000);
        let b = derive_draft_id(entry, 1_700_000_000_001);
        assert_ne!(a, b);
        assert!(a.starts_with(&entry.simple().to_string()));
    }

    #[test]
    fn test_single_contribution_stays_editing() {
        let mut draft = DraftState::default();
        let finalized = draft.apply(Role::Inviter, "hello", &[]).unwrap();

        assert!(!finalized);
        assert!(!draft.completed);
        assert_eq!(draft.inviter_content.as_deref(), Some("hello"));
        assert!(draft.collaborator_content.is_none());
    }

    #[test]
    fn test_second_contribution_completes() {
        let mut draft = DraftState::default();
        assert!(!draft.apply(Role::Inviter, "hello", &[]).unwrap());
        let finalized = draft.apply(Role::Collaborator, "world", &[]).unwrap();

        assert!(finalized);
        assert!(draft.completed);
        assert_eq!(draft.inviter_content.as_deref(), Some("hello"));
        assert_eq!(draft.collaborator_content.as_deref(), Some("world"));
    }

    #[test]
    fn test_contributions_commute() {
        let inviter_imgs = images(&["https://img.example/a.jpg"]);
        let collab_imgs = images(&["https://img.example/b.jpg", "https://img.example/c.jpg"]);

        let mut forward = DraftState::default();
        forward.apply(Role::Inviter, "hello", &inviter_imgs).unwrap();
        forward.apply(Role::Collaborator, "world", &collab_imgs).unwrap();

        let mut reverse = DraftState::default();
        reverse.apply(Role::Collaborator, "world", &collab_imgs).unwrap();
        reverse.apply(Role::Inviter, "hello", &inviter_imgs).unwrap();

        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_role_never_touches_other_half() {
        let mut draft = DraftState::default();
        draft.apply(Role::Collaborator, "world", &images(&["x"])).unwrap();
        draft.apply(Role::Collaborator, "world again", &[]).unwrap();

        assert!(draft.inviter_content.is_none());
        assert!(draft.inviter_images.is_empty());
        assert_eq!(draft.collaborator_content.as_deref(), Some("world again"));
    }

    #[test]
    fn test_completed_draft_rejects_writes() {
        let mut draft = DraftState::default();
        draft.apply(Role::Inviter, "hello", &[]).unwrap();
        draft.apply(Role::Collaborator, "world", &[]).unwrap();

        let before = draft.clone();
        assert_eq!(
            draft.apply(Role::Inviter, "rewrite", &[]),
            Err(ApplyError::DraftCompleted)
        );
        assert_eq!(draft, before);
    }

    #[test]
    fn test_blank_content_rejected_without_change() {
        let mut draft = DraftState::default();
        assert_eq!(
            draft.apply(Role::Inviter, "   ", &[]),
            Err(ApplyError::EmptyContent)
        );
        assert_eq!(draft, DraftState::default());
    }

    #[test]
    fn test_whitespace_half_never_completes() {
        let mut draft = DraftState {
            collaborator_content: Some("  ".to_string()),
            ..Default::default()
        };
        let finalized = draft.apply(Role::Inviter, "hello", &[]).unwrap();
        assert!(!finalized);
        assert!(!draft.both_present());
    }
}
