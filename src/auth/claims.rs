use serde::{Deserialize, Serialize};

/// Claims carried in the identity provider's session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,           // provider user id
    pub exp: i64,              // expiration timestamp
    pub iat: i64,              // issued at timestamp
    pub email: Option<String>, // present on first sight, used for auto-linking
}
