use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;

use crate::{auth, models::UserProfile, AppState};

/// Extracts the session token from either the __session cookie (mobile
/// webview / frontend) or the Authorization header (testing)
fn extract_token_from_request(parts: &Parts) -> Option<String> {
    if let Some(cookie_header) = parts.headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            // Parse cookies manually (cookie = "name=value; name2=value2")
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(value) = cookie.strip_prefix("__session=") {
                    return Some(value.to_string());
                }
            }
        }
    }

    // Fallback to Authorization header (for testing with Bearer tokens)
    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    None
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub auth_id: String,
    pub email: String,
    pub profile_id: i32,
    pub partner_id: Option<i32>,
    pub display_name: String,
}

impl From<&UserProfile> for AuthenticatedUser {
    fn from(user: &UserProfile) -> Self {
        AuthenticatedUser {
            auth_id: user.auth_id.clone().unwrap_or_default(),
            email: user.email.clone(),
            profile_id: user.id,
            partner_id: user.partner_id,
            display_name: user.display_name.clone(),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = (StatusCode, axum::Json<serde_json::Value>);

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = extract_token_from_request(parts);

        let state = state.clone();

        async move {
            let token = token.ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"error": "Missing authentication: no __session cookie or Authorization header"})),
                )
            })?;

            let claims = auth::validate_token(&token, &state.config.auth_secret).map_err(|e| {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"error": e})),
                )
            })?;

            let auth_id = claims.sub.clone();

            // Hot path: cached profile keyed by provider user id.
            if let Some(user) = state.user_cache.get(&auth_id).await {
                tracing::debug!(auth_id, profile_id = user.id, "Profile resolved from cache");
                return Ok(AuthenticatedUser::from(&user));
            }

            let user_opt = sqlx::query_as::<_, UserProfile>(
                r#"SELECT * FROM "Users" WHERE auth_id = $1"#,
            )
            .bind(&auth_id)
            .fetch_optional(&state.db)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, auth_id, "Database query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({"error": "Database error"})),
                )
            })?;

            if let Some(user) = user_opt {
                tracing::debug!(auth_id, profile_id = user.id, "User found by auth_id");
                state.user_cache.insert(auth_id, user.clone()).await;
                return Ok(AuthenticatedUser::from(&user));
            }

            // User not seen before. Auto-link by e-mail when the provider
            // includes one in the claims.
            let email = claims.email.ok_or_else(|| {
                tracing::warn!(auth_id, "Unknown auth_id and no email claim to auto-link by");
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"error": "No profile linked to this account"})),
                )
            })?;

            let user = sqlx::query_as::<_, UserProfile>(
                r#"UPDATE "Users" SET auth_id = $1 WHERE LOWER(email) = LOWER($2) RETURNING *"#,
            )
            .bind(&auth_id)
            .bind(&email)
            .fetch_optional(&state.db)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, auth_id, email, "Auto-link query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({"error": "Database error"})),
                )
            })?
            .ok_or_else(|| {
                tracing::warn!(auth_id, email, "User profile not found for auto-linking");
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"error": format!("User profile not found for email: {}", email)})),
                )
            })?;

            tracing::info!(
                auth_id,
                profile_id = user.id,
                email,
                "User auto-linked by email"
            );

            state.user_cache.insert(auth_id, user.clone()).await;

            Ok(AuthenticatedUser::from(&user))
        }
    }
}
