use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    collab::{ApplyError, DraftState, Role, STATUS_COMPLETED, STATUS_EDITING},
    events::{ChangeEvent, ChangeKind},
    extractors::AuthenticatedUser,
    models::{CollabDraft, CollabMutationResponse, FinalCollabEntry, SubmitContributionInput},
    AppError, AppResult, AppState,
};

const FINAL_ENTRY_BASE_QUERY: &str = r#"
    SELECT c.*, ui.display_name AS inviter_name, uc.display_name AS collaborator_name
    FROM "CollabEntries" c
    LEFT JOIN "Users" ui ON c.inviter_id = ui.id
    LEFT JOIN "Users" uc ON c.collaborator_id = uc.id
"#;

/// Invitation context a draft write runs under.
#[derive(Debug, sqlx::FromRow)]
struct DraftContext {
    entry_id: Uuid,
    entry_title: String,
    inviter_id: i32,
    invitee_id: i32,
    status: String,
}

/// GET /api/collab/drafts/{draftId} - Load a collaboration draft
#[utoipa::path(
    get,
    path = "/api/collab/drafts/{draft_id}",
    params(
        ("draft_id" = String, Path, description = "Draft ID")
    ),
    responses(
        (status = 200, description = "The draft", body = CollabDraft),
        (status = 403, description = "You are not a participant"),
        (status = 404, description = "Draft not found")
    ),
    tag = "collab",
    security(("cookie_auth" = []))
)]
pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    Path(draft_id): Path<String>,
    auth: AuthenticatedUser,
) -> AppResult<Json<CollabDraft>> {
    let draft = sqlx::query_as::<_, CollabDraft>(
        r#"SELECT * FROM "CollabDrafts" WHERE id = $1"#,
    )
    .bind(&draft_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Draft {} not found", draft_id)))?;

    let ctx = fetch_draft_context(&state.db, &draft_id).await?;
    if auth.profile_id != ctx.inviter_id && auth.profile_id != ctx.invitee_id {
        return Err(AppError::Forbidden(
            "You are not a participant in this draft".to_string(),
        ));
    }

    Ok(Json(draft))
}

/// POST /api/collab/drafts/{draftId}/contributions - Submit one party's half
///
/// The write is role-partitioned: the statement for a role only ever names
/// that role's columns, so the two parties' submissions commute. When the
/// submission makes both halves non-empty, a conditional status flip
/// (EDITING → COMPLETED, guarded on status) picks exactly one winner, and
/// that winner materializes the immutable final entry in the same
/// transaction.
#[utoipa::path(
    post,
    path = "/api/collab/drafts/{draft_id}/contributions",
    params(
        ("draft_id" = String, Path, description = "Draft ID")
    ),
    request_body = SubmitContributionInput,
    responses(
        (status = 200, description = "Contribution stored, draft possibly finalized", body = CollabMutationResponse),
        (status = 403, description = "You are not a participant, or the invitation is not accepted"),
        (status = 404, description = "No invitation references this draft"),
        (status = 409, description = "Draft already completed"),
        (status = 422, description = "Blank content"),
        (status = 502, description = "Image reference is not a durable URL")
    ),
    tag = "collab",
    security(("cookie_auth" = []))
)]
pub async fn submit_contribution(
    State(state): State<Arc<AppState>>,
    Path(draft_id): Path<String>,
    auth: AuthenticatedUser,
    Json(input): Json<SubmitContributionInput>,
) -> AppResult<Json<CollabMutationResponse>> {
    let ctx = fetch_draft_context(&state.db, &draft_id).await?;

    let role = if auth.profile_id == ctx.inviter_id {
        Role::Inviter
    } else if auth.profile_id == ctx.invitee_id {
        Role::Collaborator
    } else {
        return Err(AppError::Forbidden(
            "You are not a participant in this draft".to_string(),
        ));
    };

    ensure_contribution_allowed(role, &ctx.status)?;

    // Everything below mutates shared state; all validation happens first
    // so a rejected submission leaves the draft untouched. The fail-fast
    // check runs against a snapshot; the status guards on the statements
    // below stay authoritative under concurrency.
    super::uploads_handler::ensure_durable(&state.config.image_host_url, &input.images)?;

    let mut snapshot = sqlx::query_as::<_, CollabDraft>(
        r#"SELECT * FROM "CollabDrafts" WHERE id = $1"#,
    )
    .bind(&draft_id)
    .fetch_optional(&state.db)
    .await?
    .as_ref()
    .map(draft_state_of)
    .unwrap_or_default();

    snapshot
        .apply(role, &input.content, &input.images)
        .map_err(|e| match e {
            ApplyError::DraftCompleted => AppError::Conflict(
                "Draft is already completed and can no longer be edited".to_string(),
            ),
            ApplyError::EmptyContent => {
                AppError::Validation("content must not be blank".to_string())
            }
        })?;

    let mut tx = state.db.begin().await?;

    let draft = upsert_contribution(&mut tx, &draft_id, &ctx, role, &auth, &input).await?;

    // Completion check runs on the row the upsert returned, never on the
    // pre-write snapshot: under a concurrent submission the other half may
    // have landed between the two.
    let completed = if draft_state_of(&draft).both_present() && draft.collaborator_id.is_some() {
        // Conditional flip guarded on status, so of two concurrent writers
        // that both observe "both halves present" only one gets the
        // COMPLETED row back and runs finalization.
        sqlx::query_as::<_, CollabDraft>(
            r#"
            UPDATE "CollabDrafts"
            SET status = $2, updated_at = NOW()
            WHERE id = $1
              AND status = $3
              AND btrim(COALESCE(inviter_content, '')) <> ''
              AND btrim(COALESCE(collaborator_content, '')) <> ''
              AND collaborator_id IS NOT NULL
            RETURNING *
            "#,
        )
        .bind(&draft_id)
        .bind(STATUS_COMPLETED)
        .bind(STATUS_EDITING)
        .fetch_optional(&mut *tx)
        .await?
    } else {
        None
    };

    let finalized = if let Some(completed) = &completed {
        finalize_draft(&mut tx, completed, &auth).await?;
        true
    } else {
        false
    };

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, draft_id = %draft_id, "Transaction rollback in submit_contribution");
        AppError::Internal(format!("Failed to commit contribution to draft {}: {}", draft_id, e))
    })?;

    let status = if finalized { STATUS_COMPLETED } else { draft.status.as_str() };
    let participants = vec![ctx.inviter_id, ctx.invitee_id];
    state.events.publish(ChangeEvent::new(
        ChangeKind::DraftUpdated,
        participants.clone(),
        serde_json::json!({ "draft_id": draft.id, "status": status }),
    ));
    if finalized {
        state.events.publish(ChangeEvent::new(
            ChangeKind::DraftFinalized,
            participants,
            serde_json::json!({ "draft_id": draft.id, "entry_id": ctx.entry_id }),
        ));
    }

    tracing::info!(
        draft_id = %draft_id,
        role = role.as_str(),
        profile_id = auth.profile_id,
        finalized,
        "Contribution stored"
    );

    Ok(Json(CollabMutationResponse {
        success: true,
        finalized,
        message: Some(if finalized {
            "Both halves are in; the collaborative entry is ready".to_string()
        } else {
            "Contribution stored".to_string()
        }),
    }))
}

/// GET /api/collab/entries - Finalized collaborative entries for the couple
#[utoipa::path(
    get,
    path = "/api/collab/entries",
    responses(
        (status = 200, description = "Finalized collaborative entries, newest first", body = Vec<FinalCollabEntry>)
    ),
    tag = "collab",
    security(("cookie_auth" = []))
)]
pub async fn get_final_entries(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<FinalCollabEntry>>> {
    let sql = format!(
        "{} WHERE c.inviter_id = $1 OR c.collaborator_id = $1 ORDER BY c.created_at DESC",
        FINAL_ENTRY_BASE_QUERY
    );

    let entries = sqlx::query_as::<sqlx::Postgres, FinalCollabEntry>(&sql)
        .bind(auth.profile_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(entries))
}

/// GET /api/collab/entries/{id} - A single finalized collaborative entry
#[utoipa::path(
    get,
    path = "/api/collab/entries/{id}",
    params(
        ("id" = i32, Path, description = "Final collaborative entry ID")
    ),
    responses(
        (status = 200, description = "The finalized entry", body = FinalCollabEntry),
        (status = 403, description = "You are not a participant"),
        (status = 404, description = "Not found")
    ),
    tag = "collab",
    security(("cookie_auth" = []))
)]
pub async fn get_final_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    auth: AuthenticatedUser,
) -> AppResult<Json<FinalCollabEntry>> {
    let sql = format!("{} WHERE c.id = $1", FINAL_ENTRY_BASE_QUERY);

    let entry = sqlx::query_as::<sqlx::Postgres, FinalCollabEntry>(&sql)
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Collaborative entry {} not found", id)))?;

    if auth.profile_id != entry.inviter_id && auth.profile_id != entry.collaborator_id {
        return Err(AppError::Forbidden(
            "You are not a participant in this entry".to_string(),
        ));
    }

    Ok(Json(entry))
}

/// Gate on the invitation status. A declined invitation closes the draft
/// for both parties; the collaborator additionally needs the invitation
/// accepted, while the inviter may start while it is still pending.
fn ensure_contribution_allowed(role: Role, invitation_status: &str) -> Result<(), AppError> {
    if invitation_status == "DECLINED" {
        return Err(AppError::Forbidden(
            "The invitation was declined; this draft is closed".to_string(),
        ));
    }
    if role == Role::Collaborator && invitation_status != "ACCEPTED" {
        return Err(AppError::Forbidden(
            "The invitation has not been accepted".to_string(),
        ));
    }
    Ok(())
}

fn draft_state_of(draft: &CollabDraft) -> DraftState {
    DraftState {
        inviter_content: draft.inviter_content.clone(),
        inviter_images: draft.inviter_images.clone(),
        collaborator_content: draft.collaborator_content.clone(),
        collaborator_images: draft.collaborator_images.clone(),
        completed: draft.status == STATUS_COMPLETED,
    }
}

/// Every draft write runs under the invitation that referenced the draft id.
async fn fetch_draft_context(db: &sqlx::PgPool, draft_id: &str) -> AppResult<DraftContext> {
    sqlx::query_as::<_, DraftContext>(
        r#"
        SELECT i.entry_id, e.title AS entry_title, i.inviter_id, i.invitee_id, i.status
        FROM "Invitations" i
        INNER JOIN "Entries" e ON i.entry_id = e.id
        WHERE i.draft_id = $1
        "#,
    )
    .bind(draft_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No invitation references draft {}", draft_id)))
}

/// Role-partitioned merge-write. The draft row is created lazily on first
/// write, stamping title and inviter from the invitation context; the
/// conflict arm only ever touches the caller's own columns, and its status
/// guard keeps completed drafts immutable.
async fn upsert_contribution(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    draft_id: &str,
    ctx: &DraftContext,
    role: Role,
    auth: &AuthenticatedUser,
    input: &SubmitContributionInput,
) -> AppResult<CollabDraft> {
    let sql = match role {
        Role::Inviter => {
            r#"
            INSERT INTO "CollabDrafts" (
                id, entry_id, title, inviter_id,
                inviter_content, inviter_images, collaborator_images, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, '{}', 'EDITING')
            ON CONFLICT (id) DO UPDATE
            SET inviter_content = EXCLUDED.inviter_content,
                inviter_images = EXCLUDED.inviter_images,
                updated_at = NOW()
            WHERE "CollabDrafts".status = 'EDITING'
            RETURNING *
            "#
        }
        Role::Collaborator => {
            r#"
            INSERT INTO "CollabDrafts" (
                id, entry_id, title, inviter_id,
                collaborator_id, collaborator_content, collaborator_images,
                inviter_images, status
            )
            VALUES ($1, $2, $3, $4, $7, $5, $6, '{}', 'EDITING')
            ON CONFLICT (id) DO UPDATE
            SET collaborator_id = EXCLUDED.collaborator_id,
                collaborator_content = EXCLUDED.collaborator_content,
                collaborator_images = EXCLUDED.collaborator_images,
                updated_at = NOW()
            WHERE "CollabDrafts".status = 'EDITING'
            RETURNING *
            "#
        }
    };

    let mut query = sqlx::query_as::<_, CollabDraft>(sql)
        .bind(draft_id)
        .bind(ctx.entry_id)
        .bind(&ctx.entry_title)
        .bind(ctx.inviter_id)
        .bind(&input.content)
        .bind(&input.images);
    if role == Role::Collaborator {
        query = query.bind(auth.profile_id);
    }

    query.fetch_optional(&mut **tx).await?.ok_or_else(|| {
        AppError::Conflict("Draft is already completed and can no longer be edited".to_string())
    })
}

/// One-time promotion of a completed draft into the immutable combined
/// record. The CAS in `submit_contribution` guarantees a single caller;
/// the unique draft_id constraint backstops it.
async fn finalize_draft(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    draft: &CollabDraft,
    auth: &AuthenticatedUser,
) -> AppResult<()> {
    let collaborator_id = draft.collaborator_id.ok_or_else(|| {
        AppError::Internal(format!("Completed draft {} has no collaborator", draft.id))
    })?;
    let inviter_content = draft.inviter_content.clone().unwrap_or_default();
    let collaborator_content = draft.collaborator_content.clone().unwrap_or_default();

    sqlx::query(
        r#"
        INSERT INTO "CollabEntries" (
            draft_id, entry_id, title,
            inviter_id, inviter_content, inviter_images,
            collaborator_id, collaborator_content, collaborator_images
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (draft_id) DO NOTHING
        "#,
    )
    .bind(&draft.id)
    .bind(draft.entry_id)
    .bind(&draft.title)
    .bind(draft.inviter_id)
    .bind(&inviter_content)
    .bind(&draft.inviter_images)
    .bind(collaborator_id)
    .bind(&collaborator_content)
    .bind(&draft.collaborator_images)
    .execute(&mut **tx)
    .await?;

    // Collaboration linkage is the one mutation a shared entry allows.
    sqlx::query(r#"UPDATE "Entries" SET collab_draft_id = $1 WHERE id = $2"#)
        .bind(&draft.id)
        .bind(draft.entry_id)
        .execute(&mut **tx)
        .await?;

    for (recipient, sender) in [
        (draft.inviter_id, collaborator_id),
        (collaborator_id, draft.inviter_id),
    ] {
        super::notifications_handler::insert_notification(
            &mut **tx,
            recipient,
            sender,
            "collab_finalized",
            Some(&draft.title),
            Some(draft.entry_id),
        )
        .await?;
    }

    tracing::info!(
        draft_id = %draft.id,
        entry_id = %draft.entry_id,
        finalized_by = auth.profile_id,
        "Draft finalized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declined_invitation_closes_draft_for_both_roles() {
        assert!(matches!(
            ensure_contribution_allowed(Role::Inviter, "DECLINED"),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_contribution_allowed(Role::Collaborator, "DECLINED"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_inviter_may_write_while_pending() {
        assert!(ensure_contribution_allowed(Role::Inviter, "PENDING").is_ok());
    }

    #[test]
    fn test_collaborator_needs_acceptance() {
        assert!(matches!(
            ensure_contribution_allowed(Role::Collaborator, "PENDING"),
            Err(AppError::Forbidden(_))
        ));
        assert!(ensure_contribution_allowed(Role::Collaborator, "ACCEPTED").is_ok());
    }

    #[test]
    fn test_accepted_invitation_allows_both_roles() {
        assert!(ensure_contribution_allowed(Role::Inviter, "ACCEPTED").is_ok());
    }
}
