use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// The in-progress two-sided collaborative document. Each party writes
/// only its own content/images columns; status moves EDITING → COMPLETED
/// exactly once, when both contents are present.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CollabDraft {
    pub id: String,
    pub entry_id: Uuid,
    /// Copied from the original entry at creation; never changes.
    pub title: String,
    pub inviter_id: i32,
    pub inviter_content: Option<String>,
    pub inviter_images: Vec<String>,
    pub collaborator_id: Option<i32>,
    pub collaborator_content: Option<String>,
    pub collaborator_images: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable snapshot of a completed draft. Inserted at most once per
/// draft id and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FinalCollabEntry {
    pub id: i32,
    pub draft_id: String,
    pub entry_id: Uuid,
    pub title: String,
    pub inviter_id: i32,
    pub inviter_content: String,
    pub inviter_images: Vec<String>,
    pub collaborator_id: i32,
    pub collaborator_content: String,
    pub collaborator_images: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub inviter_name: Option<String>, // From LEFT JOIN with Users table
    #[sqlx(default)]
    pub collaborator_name: Option<String>,
}
