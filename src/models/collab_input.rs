use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Input for submitting one party's half of a collaborative draft.
/// The caller's role is derived server-side from the draft, not trusted
/// from input.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitContributionInput {
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Response for collaboration mutations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollabMutationResponse {
    pub success: bool,
    /// Set when this submission completed the draft.
    pub finalized: bool,
    pub message: Option<String>,
}
