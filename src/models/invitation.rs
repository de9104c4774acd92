use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// An offer to co-author a collaborative version of an existing entry.
/// Status is one of PENDING, ACCEPTED, DECLINED; the first response is
/// terminal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Invitation {
    pub id: i32,
    pub entry_id: Uuid,
    /// Draft the invitee will contribute to once accepted.
    pub draft_id: String,
    pub inviter_id: i32,
    pub inviter_name: String,
    pub invitee_id: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub entry_title: Option<String>, // From LEFT JOIN with Entries table
}
