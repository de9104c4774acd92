use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A social notification: reaction, nudge, or collaboration lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub recipient_id: i32,
    pub sender_id: i32,
    /// One of: reaction, nudge, collab_invite, collab_accepted,
    /// collab_finalized, entry_shared.
    pub kind: String,
    pub body: Option<String>,
    pub entry_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub sender_name: Option<String>, // From LEFT JOIN with Users table
}

/// An emoji reaction on a diary entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reaction {
    pub id: i32,
    pub entry_id: Uuid,
    pub reactor_id: i32,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub reactor_name: Option<String>,
}
