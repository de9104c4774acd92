pub mod anniversaries_handler;
pub mod auth_handler;
pub mod collab_handler;
pub mod entries_handler;
pub mod events_handler;
pub mod health;
pub mod invitations_handler;
pub mod metrics;
pub mod notifications_handler;
pub mod pairing_handler;
pub mod reactions_handler;
pub mod uploads_handler;
pub mod users_handler;

pub use health::health_check;
pub use metrics::{metrics_handler, setup_metrics_recorder, MetricsState};
