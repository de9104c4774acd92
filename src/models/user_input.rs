use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Input for updating own profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileInput {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Response carrying a freshly issued pairing code
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PairingCodeResponse {
    pub code: String,
    pub expires_in_secs: i64,
}

/// Input for redeeming a partner's pairing code
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JoinPairingInput {
    pub code: String,
}

/// Response for a brokered image upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}
