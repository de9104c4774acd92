use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Pairing codes are valid for 10 minutes.
const PAIRING_CODE_TTL_SECS: i64 = 10 * 60;

/// Generate a pairing code for linking two profiles.
/// Code format: base64(profile_id:expiry_timestamp:hmac_signature)
pub fn generate_pairing_code(profile_id: i32, secret: &str) -> Result<String, AppError> {
    let expiry_time = chrono::Utc::now().timestamp() + PAIRING_CODE_TTL_SECS;

    let payload = format!("{}:{}", profile_id, expiry_time);
    let signature = create_hmac_signature(&payload, secret)?;
    let code_data = format!("{}:{}", payload, signature);

    Ok(STANDARD.encode(code_data.as_bytes()))
}

/// Validate a pairing code and extract the issuing profile id.
pub fn validate_pairing_code(code: &str, secret: &str) -> Result<i32, AppError> {
    let decoded_bytes = STANDARD
        .decode(code.trim())
        .map_err(|_| AppError::BadRequest("Invalid pairing code format".to_string()))?;

    let decoded = String::from_utf8(decoded_bytes)
        .map_err(|_| AppError::BadRequest("Invalid pairing code encoding".to_string()))?;

    // Parse code: profile_id:expiry_time:signature
    let parts: Vec<&str> = decoded.split(':').collect();

    if parts.len() != 3 {
        return Err(AppError::BadRequest("Invalid pairing code structure".to_string()));
    }

    let profile_id: i32 = parts[0]
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid profile ID in pairing code".to_string()))?;

    let expiry_time: i64 = parts[1]
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid expiry time in pairing code".to_string()))?;

    let code_signature = parts[2];

    if chrono::Utc::now().timestamp() > expiry_time {
        return Err(AppError::BadRequest(
            "Pairing code has expired. Ask your partner for a new one.".to_string(),
        ));
    }

    let payload = format!("{}:{}", profile_id, expiry_time);
    let expected_signature = create_hmac_signature(&payload, secret)?;

    if code_signature != expected_signature {
        return Err(AppError::BadRequest("Invalid pairing code".to_string()));
    }

    Ok(profile_id)
}

fn create_hmac_signature(data: &str, secret: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("HMAC initialization error: {}", e)))?;

    mac.update(data.as_bytes());

    let result = mac.finalize();
    let code_bytes = result.into_bytes();

    Ok(hex::encode(code_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_validate_code() {
        let secret = "test_secret_key_for_testing_purposes";
        let profile_id = 42;

        let code = generate_pairing_code(profile_id, secret).unwrap();
        let validated = validate_pairing_code(&code, secret).unwrap();

        assert_eq!(profile_id, validated);
    }

    #[test]
    fn test_invalid_code_format() {
        let result = validate_pairing_code("not_a_real_code", "test_secret_key");
        assert!(result.is_err());
    }

    #[test]
    fn test_code_with_wrong_signature() {
        let code = generate_pairing_code(7, "secret_key_one").unwrap();
        let result = validate_pairing_code(&code, "secret_key_two");
        assert!(result.is_err());
    }

    #[test]
    fn test_tampered_profile_id_rejected() {
        let secret = "test_secret_key_for_testing_purposes";
        let code = generate_pairing_code(7, secret).unwrap();

        let decoded = String::from_utf8(STANDARD.decode(&code).unwrap()).unwrap();
        let tampered = decoded.replacen("7:", "8:", 1);
        let tampered_code = STANDARD.encode(tampered.as_bytes());

        assert!(validate_pairing_code(&tampered_code, secret).is_err());
    }
}
