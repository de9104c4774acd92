use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A diary entry. Immutable once shared, except for collaboration linkage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Entry {
    pub id: Uuid,
    pub author_id: i32,
    /// Author's partner at creation time; invitation target.
    pub partner_id: Option<i32>,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub weather: Option<String>,
    /// Ordered durable image URLs.
    pub images: Vec<String>,
    pub shared: bool,
    /// Linkage to a collaborative rework of this entry, if one was started.
    pub collab_draft_id: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub author_name: Option<String>, // From LEFT JOIN with Users table
}
