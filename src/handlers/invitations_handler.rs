use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    collab::derive_draft_id,
    events::{ChangeEvent, ChangeKind},
    extractors::AuthenticatedUser,
    models::{CreateInvitationInput, Invitation, RespondInvitationInput},
    AppError, AppResult, AppState,
};

const INVITATION_BASE_QUERY: &str = r#"
    SELECT i.*, e.title AS entry_title
    FROM "Invitations" i
    LEFT JOIN "Entries" e ON i.entry_id = e.id
"#;

/// GET /api/invitations/incoming - Pending invitations addressed to the caller
#[utoipa::path(
    get,
    path = "/api/invitations/incoming",
    responses(
        (status = 200, description = "Pending incoming invitations", body = Vec<Invitation>)
    ),
    tag = "invitations",
    security(("cookie_auth" = []))
)]
pub async fn get_incoming_invitations(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<Invitation>>> {
    let sql = format!(
        "{} WHERE i.invitee_id = $1 AND i.status = 'PENDING' ORDER BY i.created_at DESC",
        INVITATION_BASE_QUERY
    );

    let invitations = sqlx::query_as::<sqlx::Postgres, Invitation>(&sql)
        .bind(auth.profile_id)
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, profile_id = auth.profile_id, "Failed to fetch incoming invitations");
            e
        })?;

    tracing::debug!(profile_id = auth.profile_id, count = invitations.len(), "Fetched incoming invitations");
    Ok(Json(invitations))
}

/// GET /api/invitations/outgoing - Invitations created by the caller
#[utoipa::path(
    get,
    path = "/api/invitations/outgoing",
    responses(
        (status = 200, description = "Invitations the caller sent", body = Vec<Invitation>)
    ),
    tag = "invitations",
    security(("cookie_auth" = []))
)]
pub async fn get_outgoing_invitations(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<Invitation>>> {
    let sql = format!(
        "{} WHERE i.inviter_id = $1 ORDER BY i.created_at DESC",
        INVITATION_BASE_QUERY
    );

    let invitations = sqlx::query_as::<sqlx::Postgres, Invitation>(&sql)
        .bind(auth.profile_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(invitations))
}

/// POST /api/invitations - Invite the partner to co-author an entry
#[utoipa::path(
    post,
    path = "/api/invitations",
    request_body = CreateInvitationInput,
    responses(
        (status = 200, description = "Invitation created", body = Invitation),
        (status = 403, description = "Only the author can invite"),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "A pending invitation already exists for this entry"),
        (status = 422, description = "Entry has no linked partner")
    ),
    tag = "invitations",
    security(("cookie_auth" = []))
)]
pub async fn create_invitation(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<CreateInvitationInput>,
) -> AppResult<Json<Invitation>> {
    // All checks run before anything is persisted: a failed invitation
    // must leave no record behind.
    let entry: Option<(i32, Option<i32>)> = sqlx::query_as(
        r#"SELECT author_id, partner_id FROM "Entries" WHERE id = $1 AND deleted = false"#,
    )
    .bind(input.entry_id)
    .fetch_optional(&state.db)
    .await?;

    let (author_id, partner_id) =
        entry.ok_or_else(|| AppError::NotFound(format!("Entry {} not found", input.entry_id)))?;

    let invitee_id = resolve_invitee(author_id, partner_id, auth.profile_id).map_err(|e| {
        if matches!(e, AppError::MissingPartner(_)) {
            tracing::warn!(entry_id = %input.entry_id, "Invitation attempted on entry without partner");
        }
        e
    })?;

    let pending: Option<(i32,)> = sqlx::query_as(
        r#"SELECT id FROM "Invitations" WHERE entry_id = $1 AND status = 'PENDING'"#,
    )
    .bind(input.entry_id)
    .fetch_optional(&state.db)
    .await?;

    if pending.is_some() {
        return Err(AppError::Conflict(
            "A pending invitation already exists for this entry".to_string(),
        ));
    }

    let draft_id = derive_draft_id(input.entry_id, chrono::Utc::now().timestamp_millis());

    // Invitation and its notification land together or not at all: a
    // failed invitation must leave no record behind.
    let mut tx = state.db.begin().await?;

    let invitation = sqlx::query_as::<_, Invitation>(
        r#"
        INSERT INTO "Invitations" (
            entry_id, draft_id, inviter_id, inviter_name, invitee_id, status
        )
        VALUES ($1, $2, $3, $4, $5, 'PENDING')
        RETURNING *
        "#,
    )
    .bind(input.entry_id)
    .bind(&draft_id)
    .bind(auth.profile_id)
    .bind(&auth.display_name)
    .bind(invitee_id)
    .fetch_one(&mut *tx)
    .await?;

    super::notifications_handler::insert_notification(
        &mut *tx,
        invitee_id,
        auth.profile_id,
        "collab_invite",
        None,
        Some(input.entry_id),
    )
    .await?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, entry_id = %input.entry_id, "Transaction rollback in create_invitation");
        AppError::Internal(format!("Failed to commit invitation: {}", e))
    })?;

    state.events.publish(ChangeEvent::new(
        ChangeKind::InvitationUpdated,
        vec![invitee_id],
        serde_json::json!({ "invitation_id": invitation.id, "status": invitation.status }),
    ));

    tracing::info!(
        invitation_id = invitation.id,
        entry_id = %input.entry_id,
        inviter_id = auth.profile_id,
        invitee_id,
        draft_id = %draft_id,
        "Invitation created"
    );

    Ok(Json(invitation))
}

/// POST /api/invitations/{id}/respond - Accept or decline an invitation
#[utoipa::path(
    post,
    path = "/api/invitations/{id}/respond",
    params(
        ("id" = i32, Path, description = "Invitation ID")
    ),
    request_body = RespondInvitationInput,
    responses(
        (status = 200, description = "Invitation resolved", body = Invitation),
        (status = 403, description = "You are not the invitee"),
        (status = 404, description = "Invitation not found"),
        (status = 409, description = "Invitation already resolved")
    ),
    tag = "invitations",
    security(("cookie_auth" = []))
)]
pub async fn respond_to_invitation(
    State(state): State<Arc<AppState>>,
    Path(invitation_id): Path<i32>,
    auth: AuthenticatedUser,
    Json(input): Json<RespondInvitationInput>,
) -> AppResult<Json<Invitation>> {
    let (invitee_id, status): (i32, String) = sqlx::query_as(
        r#"SELECT invitee_id, status FROM "Invitations" WHERE id = $1"#,
    )
    .bind(invitation_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Invitation {} not found", invitation_id)))?;

    if invitee_id != auth.profile_id {
        return Err(AppError::Forbidden(
            "Only the invitee can respond to an invitation".to_string(),
        ));
    }

    if status != "PENDING" {
        return Err(AppError::AlreadyResolved(format!(
            "Invitation was already {}",
            status.to_lowercase()
        )));
    }

    let new_status = if input.accept { "ACCEPTED" } else { "DECLINED" };

    // First response wins: the PENDING guard makes a concurrent second
    // response miss the row instead of overwriting the decision.
    let invitation = sqlx::query_as::<_, Invitation>(
        r#"
        UPDATE "Invitations"
        SET status = $1, resolved_at = NOW()
        WHERE id = $2 AND status = 'PENDING'
        RETURNING *
        "#,
    )
    .bind(new_status)
    .bind(invitation_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::AlreadyResolved("Invitation was already resolved".to_string())
    })?;

    if input.accept {
        super::notifications_handler::insert_notification(
            &state.db,
            invitation.inviter_id,
            auth.profile_id,
            "collab_accepted",
            None,
            Some(invitation.entry_id),
        )
        .await?;
    }

    state.events.publish(ChangeEvent::new(
        ChangeKind::InvitationUpdated,
        vec![invitation.inviter_id, invitation.invitee_id],
        serde_json::json!({ "invitation_id": invitation.id, "status": invitation.status }),
    ));

    tracing::info!(
        invitation_id,
        invitee_id = auth.profile_id,
        status = new_status,
        "Invitation resolved"
    );

    Ok(Json(invitation))
}

/// Resolves who an invitation on an entry targets. Only the author may
/// invite, and the entry must carry a partner; both checks run before
/// anything is persisted.
fn resolve_invitee(
    author_id: i32,
    partner_id: Option<i32>,
    caller_id: i32,
) -> Result<i32, AppError> {
    if author_id != caller_id {
        return Err(AppError::Forbidden(
            "Only the author can invite collaboration on an entry".to_string(),
        ));
    }

    partner_id.ok_or_else(|| {
        AppError::MissingPartner("This entry has no linked partner to invite".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_with_partner_resolves_invitee() {
        assert_eq!(resolve_invitee(1, Some(2), 1).unwrap(), 2);
    }

    #[test]
    fn test_partnerless_entry_rejected_as_missing_partner() {
        let err = resolve_invitee(1, None, 1).unwrap_err();
        assert!(matches!(err, AppError::MissingPartner(_)));
    }

    #[test]
    fn test_non_author_cannot_invite() {
        let err = resolve_invitee(1, Some(2), 2).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
