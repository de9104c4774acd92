use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserProfile {
    pub id: i32,
    /// Identity-provider subject this profile is linked to.
    pub auth_id: Option<String>,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    /// The paired partner, if any. Pairing is symmetric.
    pub partner_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}
