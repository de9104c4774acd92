use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use crate::{handlers, middleware, openapi::ApiDoc};

pub fn build_router(state: Arc<crate::AppState>) -> Router {
    // CORS configuration; the app ships with a browser client so
    // credentials must be allowed for the session cookie.
    let origin = state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    // Auth routes
    let auth_routes = Router::new().route("/me", get(handlers::auth_handler::get_me));

    // User routes
    let user_routes = Router::new()
        .route("/me", put(handlers::users_handler::update_own_profile))
        .route("/me/partner", get(handlers::users_handler::get_partner));

    // Pairing routes
    let pairing_routes = Router::new()
        .route("/code", post(handlers::pairing_handler::create_pairing_code))
        .route("/join", post(handlers::pairing_handler::join_pairing));

    // Entry routes
    let entry_routes = Router::new()
        .route("/", get(handlers::entries_handler::get_entries))
        .route("/", post(handlers::entries_handler::create_entry))
        .route("/{id}", get(handlers::entries_handler::get_entry))
        .route("/{id}", delete(handlers::entries_handler::delete_entry))
        .route("/{id}/share", post(handlers::entries_handler::share_entry))
        .route("/{id}/reactions", get(handlers::reactions_handler::get_reactions))
        .route("/{id}/reactions", post(handlers::reactions_handler::create_reaction));

    // Invitation routes
    let invitation_routes = Router::new()
        .route("/", post(handlers::invitations_handler::create_invitation))
        .route("/incoming", get(handlers::invitations_handler::get_incoming_invitations))
        .route("/outgoing", get(handlers::invitations_handler::get_outgoing_invitations))
        .route("/{id}/respond", post(handlers::invitations_handler::respond_to_invitation));

    // Collaboration routes
    let collab_routes = Router::new()
        .route("/drafts/{draft_id}", get(handlers::collab_handler::get_draft))
        .route(
            "/drafts/{draft_id}/contributions",
            post(handlers::collab_handler::submit_contribution),
        )
        .route("/entries", get(handlers::collab_handler::get_final_entries))
        .route("/entries/{id}", get(handlers::collab_handler::get_final_entry));

    // Notification routes
    let notification_routes = Router::new()
        .route("/", get(handlers::notifications_handler::get_notifications))
        .route("/read", post(handlers::notifications_handler::mark_read))
        .route("/nudge", post(handlers::notifications_handler::nudge_partner));

    // Anniversary routes
    let anniversary_routes = Router::new()
        .route("/", get(handlers::anniversaries_handler::get_anniversaries))
        .route("/", post(handlers::anniversaries_handler::create_anniversary))
        .route("/{id}", put(handlers::anniversaries_handler::update_anniversary))
        .route("/{id}", delete(handlers::anniversaries_handler::delete_anniversary));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/pairing", pairing_routes)
        .nest("/api/entries", entry_routes)
        .nest("/api/invitations", invitation_routes)
        .nest("/api/collab", collab_routes)
        .nest("/api/notifications", notification_routes)
        .nest("/api/anniversaries", anniversary_routes)
        .route("/api/uploads", post(handlers::uploads_handler::upload_image))
        .route("/api/events", get(handlers::events_handler::event_stream))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/swagger-ui", get(swagger_ui))
        .layer(axum::middleware::from_fn(middleware::metrics_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .with_state(state)
}

async fn swagger_ui() -> Html<&'static str> {
    Html(r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Tandem API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: '/api-docs/openapi.json',
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
    "#)
}
