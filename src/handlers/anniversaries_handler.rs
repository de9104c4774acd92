use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    extractors::AuthenticatedUser,
    models::{Anniversary, AnniversaryMutationResponse, CreateAnniversaryInput, UpdateAnniversaryInput},
    AppError, AppResult, AppState,
};

/// An anniversary enriched with its next occurrence relative to today.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnniversaryView {
    #[serde(flatten)]
    pub anniversary: Anniversary,
    pub next_occurrence: chrono::NaiveDate,
    pub days_until: i64,
}

fn to_view(anniversary: Anniversary) -> AnniversaryView {
    let today = chrono::Utc::now().date_naive();
    let next_occurrence = anniversary.next_occurrence(today);
    let days_until = anniversary.days_until(today);
    AnniversaryView {
        anniversary,
        next_occurrence,
        days_until,
    }
}

/// GET /api/anniversaries - The couple's anniversaries, soonest first
#[utoipa::path(
    get,
    path = "/api/anniversaries",
    responses(
        (status = 200, description = "Anniversaries for the couple", body = Vec<AnniversaryView>)
    ),
    tag = "anniversaries",
    security(("cookie_auth" = []))
)]
pub async fn get_anniversaries(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<AnniversaryView>>> {
    // Visible to both partners, whoever created them.
    let rows = sqlx::query_as::<_, Anniversary>(
        r#"SELECT * FROM "Anniversaries" WHERE created_by = $1 OR partner_id = $1"#,
    )
    .bind(auth.profile_id)
    .fetch_all(&state.db)
    .await?;

    let mut views: Vec<AnniversaryView> = rows.into_iter().map(to_view).collect();
    views.sort_by_key(|v| v.days_until);

    Ok(Json(views))
}

/// POST /api/anniversaries - Create an anniversary
#[utoipa::path(
    post,
    path = "/api/anniversaries",
    request_body = CreateAnniversaryInput,
    responses(
        (status = 200, description = "Anniversary created", body = AnniversaryView),
        (status = 422, description = "Blank title or no partner linked")
    ),
    tag = "anniversaries",
    security(("cookie_auth" = []))
)]
pub async fn create_anniversary(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<CreateAnniversaryInput>,
) -> AppResult<Json<AnniversaryView>> {
    if input.title.trim().is_empty() {
        return Err(AppError::Validation("title must not be blank".to_string()));
    }
    let partner_id = auth.partner_id.ok_or_else(|| {
        AppError::MissingPartner("Anniversaries need a linked partner".to_string())
    })?;

    let anniversary = sqlx::query_as::<_, Anniversary>(
        r#"
        INSERT INTO "Anniversaries" (created_by, partner_id, title, date, repeats_yearly)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(auth.profile_id)
    .bind(partner_id)
    .bind(input.title.trim())
    .bind(input.date)
    .bind(input.repeats_yearly)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(anniversary_id = anniversary.id, created_by = auth.profile_id, "Anniversary created");
    Ok(Json(to_view(anniversary)))
}

/// PUT /api/anniversaries/{id} - Update an anniversary
#[utoipa::path(
    put,
    path = "/api/anniversaries/{id}",
    params(
        ("id" = i32, Path, description = "Anniversary ID")
    ),
    request_body = UpdateAnniversaryInput,
    responses(
        (status = 200, description = "Anniversary updated", body = AnniversaryView),
        (status = 404, description = "Anniversary not found")
    ),
    tag = "anniversaries",
    security(("cookie_auth" = []))
)]
pub async fn update_anniversary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    auth: AuthenticatedUser,
    Json(input): Json<UpdateAnniversaryInput>,
) -> AppResult<Json<AnniversaryView>> {
    // Either partner may edit.
    let anniversary = sqlx::query_as::<_, Anniversary>(
        r#"
        UPDATE "Anniversaries"
        SET title = COALESCE($1, title),
            date = COALESCE($2, date),
            repeats_yearly = COALESCE($3, repeats_yearly)
        WHERE id = $4 AND (created_by = $5 OR partner_id = $5)
        RETURNING *
        "#,
    )
    .bind(input.title.as_deref().map(str::trim))
    .bind(input.date)
    .bind(input.repeats_yearly)
    .bind(id)
    .bind(auth.profile_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Anniversary {} not found", id)))?;

    Ok(Json(to_view(anniversary)))
}

/// DELETE /api/anniversaries/{id} - Delete an anniversary
#[utoipa::path(
    delete,
    path = "/api/anniversaries/{id}",
    params(
        ("id" = i32, Path, description = "Anniversary ID")
    ),
    responses(
        (status = 200, description = "Anniversary deleted", body = AnniversaryMutationResponse),
        (status = 404, description = "Anniversary not found")
    ),
    tag = "anniversaries",
    security(("cookie_auth" = []))
)]
pub async fn delete_anniversary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    auth: AuthenticatedUser,
) -> AppResult<Json<AnniversaryMutationResponse>> {
    let result = sqlx::query(
        r#"DELETE FROM "Anniversaries" WHERE id = $1 AND (created_by = $2 OR partner_id = $2)"#,
    )
    .bind(id)
    .bind(auth.profile_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Anniversary {} not found", id)));
    }

    tracing::info!(anniversary_id = id, deleted_by = auth.profile_id, "Anniversary deleted");
    Ok(Json(AnniversaryMutationResponse {
        success: true,
        message: Some("Anniversary deleted successfully".to_string()),
    }))
}
