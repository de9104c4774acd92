use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    /// Shared secret with the identity provider (HS256 session tokens).
    pub auth_secret: String,
    /// Base URL of the image host; durable image URLs live under it.
    pub image_host_url: String,
    /// API key sent to the image host on upload.
    pub image_host_key: String,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let auth_secret = env::var("AUTH_SECRET")
            .map_err(|_| "AUTH_SECRET must be set".to_string())?;

        if auth_secret.len() < 32 {
            return Err("AUTH_SECRET must be at least 32 bytes".to_string());
        }

        let image_host_url = env::var("IMAGE_HOST_URL")
            .map_err(|_| "IMAGE_HOST_URL must be set".to_string())?
            .trim_end_matches('/')
            .to_string();

        let image_host_key = env::var("IMAGE_HOST_KEY")
            .map_err(|_| "IMAGE_HOST_KEY must be set".to_string())?;

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            database_url,
            auth_secret,
            image_host_url,
            image_host_key,
            cors_origin,
        })
    }
}
