use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Input for creating a collaboration invitation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateInvitationInput {
    pub entry_id: Uuid,
}

/// Input for answering an invitation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RespondInvitationInput {
    pub accept: bool,
}

/// Response for invitation mutations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvitationMutationResponse {
    pub success: bool,
    pub message: Option<String>,
}
