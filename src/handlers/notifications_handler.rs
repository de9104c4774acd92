use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    events::{ChangeEvent, ChangeKind},
    extractors::AuthenticatedUser,
    models::{MarkReadInput, Notification, NotificationMutationResponse, NudgeInput},
    AppError, AppResult, AppState,
};

const NOTIFICATION_BASE_QUERY: &str = r#"
    SELECT n.*, u.display_name AS sender_name
    FROM "Notifications" n
    LEFT JOIN "Users" u ON n.sender_id = u.id
"#;

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetNotificationsQuery {
    pub unread: Option<bool>,
}

/// GET /api/notifications?unread=
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(GetNotificationsQuery),
    responses(
        (status = 200, description = "Notifications for the caller, newest first", body = Vec<Notification>)
    ),
    tag = "notifications",
    security(("cookie_auth" = []))
)]
pub async fn get_notifications(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(query): Query<GetNotificationsQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let mut sql = format!("{} WHERE n.recipient_id = $1", NOTIFICATION_BASE_QUERY);
    if query.unread.unwrap_or(false) {
        sql.push_str(" AND n.read = false");
    }
    sql.push_str(" ORDER BY n.created_at DESC LIMIT 100");

    let notifications = sqlx::query_as::<sqlx::Postgres, Notification>(&sql)
        .bind(auth.profile_id)
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, profile_id = auth.profile_id, "Failed to fetch notifications");
            e
        })?;

    tracing::debug!(profile_id = auth.profile_id, count = notifications.len(), "Fetched notifications");
    Ok(Json(notifications))
}

/// POST /api/notifications/read - Mark a set of notifications read
#[utoipa::path(
    post,
    path = "/api/notifications/read",
    request_body = MarkReadInput,
    responses(
        (status = 200, description = "Notifications marked read", body = NotificationMutationResponse)
    ),
    tag = "notifications",
    security(("cookie_auth" = []))
)]
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<MarkReadInput>,
) -> AppResult<Json<NotificationMutationResponse>> {
    if input.ids.is_empty() {
        return Ok(Json(NotificationMutationResponse {
            success: true,
            message: None,
        }));
    }

    // Scoped to the caller so one user cannot mark another's read.
    let result = sqlx::query(
        r#"UPDATE "Notifications" SET read = true WHERE recipient_id = $1 AND id = ANY($2)"#,
    )
    .bind(auth.profile_id)
    .bind(&input.ids)
    .execute(&state.db)
    .await?;

    tracing::debug!(
        profile_id = auth.profile_id,
        marked = result.rows_affected(),
        "Notifications marked read"
    );

    Ok(Json(NotificationMutationResponse {
        success: true,
        message: Some(format!("{} notifications marked read", result.rows_affected())),
    }))
}

/// POST /api/notifications/nudge - Send an "urgent" nudge to the partner
#[utoipa::path(
    post,
    path = "/api/notifications/nudge",
    request_body = NudgeInput,
    responses(
        (status = 200, description = "Nudge sent", body = NotificationMutationResponse),
        (status = 422, description = "No partner linked")
    ),
    tag = "notifications",
    security(("cookie_auth" = []))
)]
pub async fn nudge_partner(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<NudgeInput>,
) -> AppResult<Json<NotificationMutationResponse>> {
    let partner_id = auth.partner_id.ok_or_else(|| {
        AppError::MissingPartner("You have no partner to nudge".to_string())
    })?;

    insert_notification(
        &state.db,
        partner_id,
        auth.profile_id,
        "nudge",
        input.message.as_deref(),
        None,
    )
    .await?;

    state.events.publish(ChangeEvent::new(
        ChangeKind::NotificationCreated,
        vec![partner_id],
        serde_json::json!({ "kind": "nudge", "from": auth.profile_id }),
    ));

    tracing::info!(from = auth.profile_id, to = partner_id, "Nudge sent");

    Ok(Json(NotificationMutationResponse {
        success: true,
        message: Some("Nudge sent".to_string()),
    }))
}

/// Shared fan-out helper used by every handler that produces a social
/// notification. Takes any executor so it can join a caller's transaction.
pub async fn insert_notification<'e, E>(
    executor: E,
    recipient_id: i32,
    sender_id: i32,
    kind: &str,
    body: Option<&str>,
    entry_id: Option<Uuid>,
) -> AppResult<i32>
where
    E: sqlx::PgExecutor<'e>,
{
    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO "Notifications" (recipient_id, sender_id, kind, body, entry_id, read)
        VALUES ($1, $2, $3, $4, $5, false)
        RETURNING id
        "#,
    )
    .bind(recipient_id)
    .bind(sender_id)
    .bind(kind)
    .bind(body)
    .bind(entry_id)
    .fetch_one(executor)
    .await?;

    Ok(id)
}
