use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Input for marking notifications read
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkReadInput {
    pub ids: Vec<i32>,
}

/// Input for an "urgent" nudge to the partner
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NudgeInput {
    pub message: Option<String>,
}

/// Input for an emoji reaction on an entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateReactionInput {
    pub emoji: String,
}

/// Response for notification mutations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationMutationResponse {
    pub success: bool,
    pub message: Option<String>,
}
