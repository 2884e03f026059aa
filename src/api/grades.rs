use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::detection::store_image_field;
use crate::detection::GradeEnricher;
use crate::storage::LocalFileStore;

// POST /grades/:id/sample-image - attach a reference photo to a grade entry
pub async fn upload_sample_image(
    Extension(db): Extension<DatabaseConnection>,
    Extension(store): Extension<LocalFileStore>,
    Path(grade_id): Path<i32>,
    mut multipart: Multipart,
) -> Response {
    let url = match store_image_field(&store, &mut multipart).await {
        Ok(path) => path,
        Err(response) => return response,
    };

    match GradeEnricher::new(db).attach_sample_image(grade_id, &url).await {
        Ok(true) => (StatusCode::OK, Json(json!({"sample_image_url": url}))).into_response(),
        Ok(false) => {
            let _ = tokio::fs::remove_file(&url).await;
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Grade entry not found"})),
            )
                .into_response()
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&url).await;
            tracing::error!("Failed to attach sample image: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to attach sample image"})),
            )
                .into_response()
        }
    }
}
