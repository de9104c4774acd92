pub mod claims;
pub mod jwt;
pub mod pairing;

pub use claims::SessionClaims;
pub use jwt::validate_token;
pub use pairing::{generate_pairing_code, validate_pairing_code};
