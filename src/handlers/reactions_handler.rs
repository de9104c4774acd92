use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    events::{ChangeEvent, ChangeKind},
    extractors::AuthenticatedUser,
    models::{CreateReactionInput, Reaction},
    AppError, AppResult, AppState,
};

/// GET /api/entries/{id}/reactions - Reactions on an entry
#[utoipa::path(
    get,
    path = "/api/entries/{id}/reactions",
    params(
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Reactions on the entry", body = Vec<Reaction>),
        (status = 403, description = "Entry is not visible to you"),
        (status = 404, description = "Entry not found")
    ),
    tag = "reactions",
    security(("cookie_auth" = []))
)]
pub async fn get_reactions(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<Reaction>>> {
    ensure_entry_visible(&state.db, entry_id, &auth).await?;

    let reactions = sqlx::query_as::<_, Reaction>(
        r#"
        SELECT r.*, u.display_name AS reactor_name
        FROM "Reactions" r
        LEFT JOIN "Users" u ON r.reactor_id = u.id
        WHERE r.entry_id = $1
        ORDER BY r.created_at
        "#,
    )
    .bind(entry_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(reactions))
}

/// POST /api/entries/{id}/reactions - React to an entry with an emoji
#[utoipa::path(
    post,
    path = "/api/entries/{id}/reactions",
    params(
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    request_body = CreateReactionInput,
    responses(
        (status = 200, description = "Reaction stored", body = Reaction),
        (status = 403, description = "Entry is not visible to you"),
        (status = 404, description = "Entry not found"),
        (status = 422, description = "Blank emoji")
    ),
    tag = "reactions",
    security(("cookie_auth" = []))
)]
pub async fn create_reaction(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    auth: AuthenticatedUser,
    Json(input): Json<CreateReactionInput>,
) -> AppResult<Json<Reaction>> {
    if input.emoji.trim().is_empty() {
        return Err(AppError::Validation("emoji must not be blank".to_string()));
    }

    let author_id = ensure_entry_visible(&state.db, entry_id, &auth).await?;

    // Repeating the same emoji replaces nothing; the unique constraint
    // keeps one row per (entry, reactor, emoji).
    let reaction = sqlx::query_as::<_, Reaction>(
        r#"
        INSERT INTO "Reactions" (entry_id, reactor_id, emoji)
        VALUES ($1, $2, $3)
        ON CONFLICT (entry_id, reactor_id, emoji) DO UPDATE SET emoji = EXCLUDED.emoji
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .bind(auth.profile_id)
    .bind(input.emoji.trim())
    .fetch_one(&state.db)
    .await?;

    if author_id != auth.profile_id {
        super::notifications_handler::insert_notification(
            &state.db,
            author_id,
            auth.profile_id,
            "reaction",
            Some(&reaction.emoji),
            Some(entry_id),
        )
        .await?;

        state.events.publish(ChangeEvent::new(
            ChangeKind::NotificationCreated,
            vec![author_id],
            serde_json::json!({ "kind": "reaction", "entry_id": entry_id, "emoji": reaction.emoji }),
        ));
    }

    tracing::debug!(entry_id = %entry_id, reactor_id = auth.profile_id, "Reaction stored");
    Ok(Json(reaction))
}

/// Returns the entry's author id when the caller may see the entry.
async fn ensure_entry_visible(
    db: &sqlx::PgPool,
    entry_id: Uuid,
    auth: &AuthenticatedUser,
) -> AppResult<i32> {
    let entry: Option<(i32, bool)> = sqlx::query_as(
        r#"SELECT author_id, shared FROM "Entries" WHERE id = $1 AND deleted = false"#,
    )
    .bind(entry_id)
    .fetch_optional(db)
    .await?;

    let (author_id, shared) =
        entry.ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))?;

    let visible =
        author_id == auth.profile_id || (shared && Some(author_id) == auth.partner_id);
    if !visible {
        return Err(AppError::Forbidden("Entry is not visible to you".to_string()));
    }

    Ok(author_id)
}
