use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    extractors::AuthenticatedUser,
    models::{UpdateProfileInput, UserProfile},
    AppError, AppResult, AppState,
};

/// PUT /api/users/me - Update own display name / avatar
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileInput,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 422, description = "Blank display name")
    ),
    tag = "users",
    security(("cookie_auth" = []))
)]
pub async fn update_own_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Json<UserProfile>> {
    if let Some(name) = &input.display_name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("display_name must not be blank".to_string()));
        }
    }

    let user = sqlx::query_as::<_, UserProfile>(
        r#"
        UPDATE "Users"
        SET display_name = COALESCE($1, display_name),
            avatar_url = COALESCE($2, avatar_url)
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(input.display_name.as_deref().map(str::trim))
    .bind(&input.avatar_url)
    .bind(auth.profile_id)
    .fetch_one(&state.db)
    .await?;

    // Cached copy is stale now.
    state.user_cache.invalidate(&auth.auth_id).await;

    tracing::debug!(profile_id = auth.profile_id, "Profile updated");
    Ok(Json(user))
}

/// GET /api/users/me/partner - The linked partner profile
#[utoipa::path(
    get,
    path = "/api/users/me/partner",
    responses(
        (status = 200, description = "Partner profile", body = UserProfile),
        (status = 404, description = "No partner linked")
    ),
    tag = "users",
    security(("cookie_auth" = []))
)]
pub async fn get_partner(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<UserProfile>> {
    let partner_id = auth
        .partner_id
        .ok_or_else(|| AppError::NotFound("No partner linked".to_string()))?;

    let partner = sqlx::query_as::<_, UserProfile>(r#"SELECT * FROM "Users" WHERE id = $1"#)
        .bind(partner_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Partner profile {} not found", partner_id)))?;

    Ok(Json(partner))
}
