use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::Modify;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tandem API",
        version = "1.0.0",
        description = "Backend API for the Tandem couples' diary",
        contact(
            name = "API Support",
            email = "support@tandem.example"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Auth
        crate::handlers::auth_handler::get_me,

        // Users
        crate::handlers::users_handler::update_own_profile,
        crate::handlers::users_handler::get_partner,

        // Pairing
        crate::handlers::pairing_handler::create_pairing_code,
        crate::handlers::pairing_handler::join_pairing,

        // Entries
        crate::handlers::entries_handler::get_entries,
        crate::handlers::entries_handler::create_entry,
        crate::handlers::entries_handler::get_entry,
        crate::handlers::entries_handler::share_entry,
        crate::handlers::entries_handler::delete_entry,

        // Invitations
        crate::handlers::invitations_handler::get_incoming_invitations,
        crate::handlers::invitations_handler::get_outgoing_invitations,
        crate::handlers::invitations_handler::create_invitation,
        crate::handlers::invitations_handler::respond_to_invitation,

        // Collaboration
        crate::handlers::collab_handler::get_draft,
        crate::handlers::collab_handler::submit_contribution,
        crate::handlers::collab_handler::get_final_entries,
        crate::handlers::collab_handler::get_final_entry,

        // Notifications
        crate::handlers::notifications_handler::get_notifications,
        crate::handlers::notifications_handler::mark_read,
        crate::handlers::notifications_handler::nudge_partner,

        // Reactions
        crate::handlers::reactions_handler::get_reactions,
        crate::handlers::reactions_handler::create_reaction,

        // Anniversaries
        crate::handlers::anniversaries_handler::get_anniversaries,
        crate::handlers::anniversaries_handler::create_anniversary,
        crate::handlers::anniversaries_handler::update_anniversary,
        crate::handlers::anniversaries_handler::delete_anniversary,

        // Uploads
        crate::handlers::uploads_handler::upload_image,

        // Events
        crate::handlers::events_handler::event_stream,
    ),
    components(
        schemas(
            // Core models
            crate::models::UserProfile,
            crate::models::Entry,
            crate::models::Invitation,
            crate::models::CollabDraft,
            crate::models::FinalCollabEntry,
            crate::models::Notification,
            crate::models::Reaction,
            crate::models::Anniversary,

            // Input models
            crate::models::UpdateProfileInput,
            crate::models::PairingCodeResponse,
            crate::models::JoinPairingInput,
            crate::models::UploadResponse,
            crate::models::CreateEntryInput,
            crate::models::EntryMutationResponse,
            crate::models::CreateInvitationInput,
            crate::models::RespondInvitationInput,
            crate::models::InvitationMutationResponse,
            crate::models::SubmitContributionInput,
            crate::models::CollabMutationResponse,
            crate::models::MarkReadInput,
            crate::models::NudgeInput,
            crate::models::CreateReactionInput,
            crate::models::NotificationMutationResponse,
            crate::models::CreateAnniversaryInput,
            crate::models::UpdateAnniversaryInput,
            crate::models::AnniversaryMutationResponse,

            // View models
            crate::handlers::anniversaries_handler::AnniversaryView,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Profile management"),
        (name = "pairing", description = "Partner linking"),
        (name = "entries", description = "Diary entries"),
        (name = "invitations", description = "Collaboration invitations"),
        (name = "collab", description = "Two-party collaborative entries"),
        (name = "notifications", description = "Notifications and nudges"),
        (name = "reactions", description = "Emoji reactions"),
        (name = "anniversaries", description = "Shared anniversaries"),
        (name = "uploads", description = "Image upload brokering"),
        (name = "events", description = "Live change feed"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("__session"))),
            )
        }
    }
}
