use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{extractors::AuthenticatedUser, models::UserProfile, AppError, AppResult, AppState};

/// GET /api/auth/me - The authenticated profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated profile", body = UserProfile),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth",
    security(("cookie_auth" = []))
)]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<UserProfile>> {
    // Fetch fresh rather than trusting the extractor cache; the client
    // calls this right after pairing changes.
    let user = sqlx::query_as::<_, UserProfile>(r#"SELECT * FROM "Users" WHERE id = $1"#)
        .bind(auth.profile_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", auth.profile_id)))?;

    Ok(Json(user))
}
