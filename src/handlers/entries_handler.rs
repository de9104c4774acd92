use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    events::{ChangeEvent, ChangeKind},
    extractors::AuthenticatedUser,
    models::{CreateEntryInput, Entry, EntryMutationResponse},
    AppError, AppResult, AppState,
};

const ENTRY_BASE_QUERY: &str = r#"
    SELECT e.*, u.display_name AS author_name
    FROM "Entries" e
    LEFT JOIN "Users" u ON e.author_id = u.id
"#;

/// GET /api/entries - Own entries plus the partner's shared entries
#[utoipa::path(
    get,
    path = "/api/entries",
    responses(
        (status = 200, description = "Visible diary entries, newest first", body = Vec<Entry>)
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn get_entries(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<Entry>>> {
    let sql = format!(
        "{} WHERE e.deleted = false AND (e.author_id = $1 OR (e.shared = true AND e.author_id = $2)) ORDER BY e.created_at DESC",
        ENTRY_BASE_QUERY
    );

    let entries = sqlx::query_as::<sqlx::Postgres, Entry>(&sql)
        .bind(auth.profile_id)
        .bind(auth.partner_id.unwrap_or(-1))
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, profile_id = auth.profile_id, "Failed to fetch entries");
            e
        })?;

    tracing::debug!(profile_id = auth.profile_id, count = entries.len(), "Fetched entries");
    Ok(Json(entries))
}

/// POST /api/entries - Create a new diary entry
#[utoipa::path(
    post,
    path = "/api/entries",
    request_body = CreateEntryInput,
    responses(
        (status = 200, description = "Entry created", body = Entry),
        (status = 422, description = "Blank title or content"),
        (status = 502, description = "Image reference is not a durable URL")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<CreateEntryInput>,
) -> AppResult<Json<Entry>> {
    if input.title.trim().is_empty() {
        return Err(AppError::Validation("title must not be blank".to_string()));
    }
    if input.content.trim().is_empty() {
        return Err(AppError::Validation("content must not be blank".to_string()));
    }

    // Image references must already be durable before anything is written.
    super::uploads_handler::ensure_durable(&state.config.image_host_url, &input.images)?;

    let entry = sqlx::query_as::<_, Entry>(
        r#"
        INSERT INTO "Entries" (
            id, author_id, partner_id, title, content, mood, weather, images, shared, deleted
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, false)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.profile_id)
    .bind(auth.partner_id)
    .bind(input.title.trim())
    .bind(&input.content)
    .bind(&input.mood)
    .bind(&input.weather)
    .bind(&input.images)
    .bind(input.shared)
    .fetch_one(&state.db)
    .await?;

    if entry.shared {
        notify_shared(&state, &auth, &entry).await?;
    }

    tracing::info!(entry_id = %entry.id, author_id = auth.profile_id, shared = entry.shared, "Entry created");
    Ok(Json(entry))
}

/// GET /api/entries/{id} - A single entry, if visible to the caller
#[utoipa::path(
    get,
    path = "/api/entries/{id}",
    params(
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "The entry", body = Entry),
        (status = 403, description = "Entry is not shared with you"),
        (status = 404, description = "Entry not found")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Entry>> {
    let entry = fetch_entry(&state.db, entry_id).await?;

    let visible = entry.author_id == auth.profile_id
        || (entry.shared && Some(entry.author_id) == auth.partner_id);
    if !visible {
        return Err(AppError::Forbidden("Entry is not shared with you".to_string()));
    }

    Ok(Json(entry))
}

/// POST /api/entries/{id}/share - Share an entry with the partner
#[utoipa::path(
    post,
    path = "/api/entries/{id}/share",
    params(
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry shared", body = Entry),
        (status = 403, description = "Only the author can share"),
        (status = 404, description = "Entry not found")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn share_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Entry>> {
    let entry = fetch_entry(&state.db, entry_id).await?;

    if entry.author_id != auth.profile_id {
        return Err(AppError::Forbidden("Only the author can share an entry".to_string()));
    }

    if entry.shared {
        return Ok(Json(entry));
    }

    let entry = sqlx::query_as::<_, Entry>(
        r#"UPDATE "Entries" SET shared = true WHERE id = $1 RETURNING *"#,
    )
    .bind(entry_id)
    .fetch_one(&state.db)
    .await?;

    notify_shared(&state, &auth, &entry).await?;

    tracing::info!(entry_id = %entry_id, author_id = auth.profile_id, "Entry shared");
    Ok(Json(entry))
}

/// DELETE /api/entries/{id} - Delete an entry (soft delete)
#[utoipa::path(
    delete,
    path = "/api/entries/{id}",
    params(
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry deleted", body = EntryMutationResponse),
        (status = 403, description = "Only the author can delete"),
        (status = 404, description = "Entry not found")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    auth: AuthenticatedUser,
) -> AppResult<Json<EntryMutationResponse>> {
    let result = sqlx::query(
        r#"UPDATE "Entries" SET deleted = true WHERE id = $1 AND author_id = $2"#,
    )
    .bind(entry_id)
    .bind(auth.profile_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        // Distinguish missing from not-owned for a useful status.
        let exists: Option<(i32,)> =
            sqlx::query_as(r#"SELECT author_id FROM "Entries" WHERE id = $1 AND deleted = false"#)
                .bind(entry_id)
                .fetch_optional(&state.db)
                .await?;

        return match exists {
            Some(_) => Err(AppError::Forbidden("Only the author can delete an entry".to_string())),
            None => Err(AppError::NotFound(format!("Entry {} not found", entry_id))),
        };
    }

    tracing::info!(entry_id = %entry_id, author_id = auth.profile_id, "Entry deleted");
    Ok(Json(EntryMutationResponse {
        success: true,
        message: Some("Entry deleted successfully".to_string()),
    }))
}

async fn fetch_entry(db: &sqlx::PgPool, entry_id: Uuid) -> AppResult<Entry> {
    let sql = format!("{} WHERE e.id = $1 AND e.deleted = false", ENTRY_BASE_QUERY);
    sqlx::query_as::<sqlx::Postgres, Entry>(&sql)
        .bind(entry_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))
}

async fn notify_shared(
    state: &Arc<AppState>,
    auth: &AuthenticatedUser,
    entry: &Entry,
) -> AppResult<()> {
    let Some(partner_id) = entry.partner_id else {
        return Ok(());
    };

    super::notifications_handler::insert_notification(
        &state.db,
        partner_id,
        auth.profile_id,
        "entry_shared",
        Some(&entry.title),
        Some(entry.id),
    )
    .await?;

    state.events.publish(ChangeEvent::new(
        ChangeKind::EntryShared,
        vec![partner_id],
        serde_json::json!({ "entry_id": entry.id, "title": entry.title }),
    ));

    Ok(())
}
