use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::field::display;

use crate::detection::{DetectionError, DetectionPipeline, InvocationError};
use crate::storage::LocalFileStore;

/// Pull the image out of the `file` field and store it.
pub(crate) async fn store_image_field(
    store: &LocalFileStore,
    multipart: &mut Multipart,
) -> Result<String, Response> {
    let bad_request =
        |msg: String| (StatusCode::BAD_REQUEST, Json(json!({"error": msg}))).into_response();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.jpg").to_string();
        if !LocalFileStore::is_image(&file_name) {
            return Err(bad_request(format!("{} is not an image", file_name)));
        }

        let data = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
        if data.is_empty() {
            return Err(bad_request("Uploaded file is empty".to_string()));
        }

        return store.save(&file_name, &data).await.map_err(|e| {
            tracing::error!("Failed to store upload: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to store upload"})),
            )
                .into_response()
        });
    }

    Err(bad_request("No file field found".to_string()))
}

// POST /coffee/detect - run the classifier on an uploaded image
pub async fn detect(
    Extension(pipeline): Extension<Arc<DetectionPipeline>>,
    Extension(store): Extension<LocalFileStore>,
    Extension(user_id): Extension<i32>,
    mut multipart: Multipart,
) -> Response {
    let image_path = match store_image_field(&store, &mut multipart).await {
        Ok(path) => path,
        Err(response) => return response,
    };

    match pipeline.detect(user_id, &image_path).await {
        Ok(outcome) => {
            tracing::Span::current()
                .record("action", "detect")
                .record("detection_id", outcome.detection_id)
                .record("business_event", "Detection completed");
            crate::metrics::increment_detection_records();

            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(e) => {
            // Nothing references the upload when the pipeline fails
            let _ = tokio::fs::remove_file(&image_path).await;

            tracing::Span::current()
                .record("action", "detect_failed")
                .record("error", display(&e));

            let (status, output) = match &e {
                DetectionError::Invocation(err @ InvocationError::Timeout { .. }) => {
                    (StatusCode::GATEWAY_TIMEOUT, err.captured_output())
                }
                DetectionError::Invocation(err) => (StatusCode::BAD_GATEWAY, err.captured_output()),
                DetectionError::Parse(_) => (StatusCode::BAD_GATEWAY, None),
                DetectionError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            };

            (
                status,
                Json(json!({"error": format!("Detection failed: {}", e), "output": output})),
            )
                .into_response()
        }
    }
}

// GET /detection/history - the caller's history, newest first
pub async fn list_history(
    Extension(pipeline): Extension<Arc<DetectionPipeline>>,
    Extension(user_id): Extension<i32>,
) -> Response {
    match pipeline.history().list_for_user(user_id).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch detection history: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch detection history"})),
            )
                .into_response()
        }
    }
}
