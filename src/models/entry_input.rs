use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Input for creating a diary entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEntryInput {
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub weather: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub shared: bool,
}

/// Response for entry mutations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntryMutationResponse {
    pub success: bool,
    pub message: Option<String>,
}
