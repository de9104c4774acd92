use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Input for creating an anniversary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAnniversaryInput {
    pub title: String,
    pub date: NaiveDate,
    #[serde(default = "default_repeats")]
    pub repeats_yearly: bool,
}

fn default_repeats() -> bool {
    true
}

/// Input for updating an anniversary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateAnniversaryInput {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub repeats_yearly: Option<bool>,
}

/// Response for anniversary mutations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnniversaryMutationResponse {
    pub success: bool,
    pub message: Option<String>,
}
