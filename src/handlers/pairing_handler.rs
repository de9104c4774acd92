use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    auth::{generate_pairing_code, validate_pairing_code},
    extractors::AuthenticatedUser,
    models::{JoinPairingInput, PairingCodeResponse, UserProfile},
    AppError, AppResult, AppState,
};

/// POST /api/pairing/code - Issue a short-lived pairing code for the partner
#[utoipa::path(
    post,
    path = "/api/pairing/code",
    responses(
        (status = 200, description = "Pairing code issued", body = PairingCodeResponse),
        (status = 409, description = "Already paired")
    ),
    tag = "pairing",
    security(("cookie_auth" = []))
)]
pub async fn create_pairing_code(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<PairingCodeResponse>> {
    if auth.partner_id.is_some() {
        return Err(AppError::Conflict("You are already paired".to_string()));
    }

    let code = generate_pairing_code(auth.profile_id, &state.config.auth_secret)?;

    tracing::info!(profile_id = auth.profile_id, "Pairing code issued");

    Ok(Json(PairingCodeResponse {
        code,
        expires_in_secs: 600,
    }))
}

/// POST /api/pairing/join - Redeem a partner's pairing code
#[utoipa::path(
    post,
    path = "/api/pairing/join",
    request_body = JoinPairingInput,
    responses(
        (status = 200, description = "Profiles linked", body = UserProfile),
        (status = 400, description = "Invalid, expired, or self-issued code"),
        (status = 409, description = "Either side already paired")
    ),
    tag = "pairing",
    security(("cookie_auth" = []))
)]
pub async fn join_pairing(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<JoinPairingInput>,
) -> AppResult<Json<UserProfile>> {
    let issuer_id = validate_pairing_code(&input.code, &state.config.auth_secret)?;

    if issuer_id == auth.profile_id {
        return Err(AppError::BadRequest("You cannot pair with yourself".to_string()));
    }

    if auth.partner_id.is_some() {
        return Err(AppError::Conflict("You are already paired".to_string()));
    }

    let issuer = sqlx::query_as::<_, UserProfile>(r#"SELECT * FROM "Users" WHERE id = $1"#)
        .bind(issuer_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", issuer_id)))?;

    if issuer.partner_id.is_some() {
        return Err(AppError::Conflict(
            "That code's owner is already paired".to_string(),
        ));
    }

    // Link both sides symmetrically; the guards re-run inside the
    // transaction so two concurrent redeems cannot cross-link.
    let mut tx = state.db.begin().await?;

    let linked: Option<(i32,)> = sqlx::query_as(
        r#"UPDATE "Users" SET partner_id = $1 WHERE id = $2 AND partner_id IS NULL RETURNING id"#,
    )
    .bind(auth.profile_id)
    .bind(issuer_id)
    .fetch_optional(&mut *tx)
    .await?;

    if linked.is_none() {
        return Err(AppError::Conflict(
            "That code's owner is already paired".to_string(),
        ));
    }

    let me = sqlx::query_as::<_, UserProfile>(
        r#"UPDATE "Users" SET partner_id = $1 WHERE id = $2 AND partner_id IS NULL RETURNING *"#,
    )
    .bind(issuer_id)
    .bind(auth.profile_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::Conflict("You are already paired".to_string()))?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, issuer_id, joiner_id = auth.profile_id, "Transaction rollback in join_pairing");
        AppError::Internal(format!("Failed to commit pairing: {}", e))
    })?;

    // Both cached profiles are stale now.
    state.user_cache.invalidate(&auth.auth_id).await;
    if let Some(issuer_auth_id) = &issuer.auth_id {
        state.user_cache.invalidate(issuer_auth_id).await;
    }

    tracing::info!(
        issuer_id,
        joiner_id = auth.profile_id,
        "Profiles paired"
    );

    Ok(Json(me))
}
