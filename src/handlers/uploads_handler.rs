use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::{
    extractors::AuthenticatedUser,
    models::UploadResponse,
    AppError, AppResult, AppState,
};

/// POST /api/uploads - Broker an image to the image host
///
/// The client never talks to the image host directly; it uploads here and
/// gets back the durable URL it must reference in entries and drafts.
#[utoipa::path(
    post,
    path = "/api/uploads",
    responses(
        (status = 200, description = "Image uploaded, durable URL returned", body = UploadResponse),
        (status = 400, description = "No file field in the multipart body"),
        (status = 502, description = "Image host rejected the upload")
    ),
    tag = "uploads",
    security(("cookie_auth" = []))
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .unwrap_or("upload.jpg")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
            file = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let (filename, bytes) = file
        .ok_or_else(|| AppError::BadRequest("Missing 'file' field in multipart body".to_string()))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    let size = bytes.len();
    let url = forward_to_image_host(&state, filename.clone(), bytes).await?;

    tracing::info!(
        profile_id = auth.profile_id,
        filename = %filename,
        size,
        url = %url,
        "Image uploaded"
    );

    Ok(Json(UploadResponse { url }))
}

async fn forward_to_image_host(
    state: &Arc<AppState>,
    filename: String,
    bytes: Vec<u8>,
) -> AppResult<String> {
    let endpoint = format!("{}/upload", state.config.image_host_url);

    let part = reqwest::multipart::Part::bytes(bytes).file_name(filename);
    let form = reqwest::multipart::Form::new().part("file", part);

    let client = reqwest::Client::new();
    let response = client
        .post(&endpoint)
        .header("Authorization", format!("Bearer {}", state.config.image_host_key))
        .multipart(form)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Image host request failed");
            AppError::ImageUpload(format!("Image host unreachable: {}", e))
        })?;

    if !response.status().is_success() {
        let status = response.status();
        tracing::error!(status = %status, "Image host returned error");
        return Err(AppError::ImageUpload(format!(
            "Image host returned {}",
            status
        )));
    }

    let body: serde_json::Value = response.json().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to parse image host response");
        AppError::ImageUpload(format!("Invalid image host response: {}", e))
    })?;

    let url = body
        .get("url")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::ImageUpload("Image host response had no url".to_string()))?
        .to_string();

    Ok(url)
}

/// A submission may only reference durable URLs, i.e. ones minted by the
/// image host. Checked before any draft or entry write so a bad reference
/// aborts the whole submission with zero state change.
pub fn ensure_durable(image_host_url: &str, urls: &[String]) -> Result<(), AppError> {
    for url in urls {
        if !url.starts_with(image_host_url) {
            return Err(AppError::ImageUpload(format!(
                "Image reference is not a durable URL: {}",
                url
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "https://img.tandem.example";

    #[test]
    fn test_durable_urls_accepted() {
        let urls = vec![
            format!("{}/u/abc.jpg", HOST),
            format!("{}/u/def.png", HOST),
        ];
        assert!(ensure_durable(HOST, &urls).is_ok());
    }

    #[test]
    fn test_empty_list_accepted() {
        assert!(ensure_durable(HOST, &[]).is_ok());
    }

    #[test]
    fn test_foreign_url_rejected() {
        let urls = vec![
            format!("{}/u/abc.jpg", HOST),
            "https://elsewhere.example/x.jpg".to_string(),
        ];
        let err = ensure_durable(HOST, &urls).unwrap_err();
        assert!(matches!(err, AppError::ImageUpload(_)));
    }

    #[test]
    fn test_local_file_path_rejected() {
        let urls = vec!["file:///tmp/cache/img.jpg".to_string()];
        assert!(ensure_durable(HOST, &urls).is_err());
    }
}
