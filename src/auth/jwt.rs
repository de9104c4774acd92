use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::SessionClaims;

/// Validate an HS256 session token signed with the shared provider secret.
pub fn validate_token(token: &str, secret: &str) -> Result<SessionClaims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| format!("Session token validation failed: {}", e))?;

    Ok(token_data.claims)
}

/// Sign a session token. Exercised by tests; production tokens come from
/// the identity provider with the same shared secret.
pub fn sign_token(claims: &SessionClaims, secret: &str) -> Result<String, String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to sign session token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, exp_offset: i64) -> SessionClaims {
        let now = chrono::Utc::now().timestamp();
        SessionClaims {
            sub: sub.to_string(),
            exp: now + exp_offset,
            iat: now,
            email: Some("a@example.com".to_string()),
        }
    }

    #[test]
    fn test_sign_and_validate_round_trip() {
        let secret = "test_secret_key_for_testing_purposes";
        let token = sign_token(&claims("user_123", 300), secret).unwrap();
        let validated = validate_token(&token, secret).unwrap();

        assert_eq!(validated.sub, "user_123");
        assert_eq!(validated.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_token(&claims("user_123", 300), "secret_one_padded_to_length").unwrap();
        assert!(validate_token(&token, "secret_two_padded_to_length").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = "test_secret_key_for_testing_purposes";
        let token = sign_token(&claims("user_123", -3600), secret).unwrap();
        assert!(validate_token(&token, secret).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(validate_token("not.a.jwt", "test_secret_key").is_err());
    }
}
