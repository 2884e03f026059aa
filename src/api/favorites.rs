use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::favorites::{FavoriteError, FavoriteManager};

#[derive(Deserialize)]
pub struct AddFavoriteRequest {
    pub detection_id: i32,
}

#[derive(Deserialize)]
pub struct SearchFavoritesQuery {
    pub keyword: String,
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> Response {
    error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": context})),
    )
        .into_response()
}

// POST /favorites - bookmark a detection record
pub async fn add_favorite(
    Extension(db): Extension<DatabaseConnection>,
    Extension(user_id): Extension<i32>,
    Json(payload): Json<AddFavoriteRequest>,
) -> Response {
    match FavoriteManager::new(db).add(user_id, payload.detection_id).await {
        Ok(favorite) => {
            tracing::Span::current()
                .record("action", "add_favorite")
                .record("detection_id", favorite.detection_id)
                .record("business_event", "Favorite created");
            crate::metrics::increment_favorite_records();

            (StatusCode::CREATED, Json(favorite)).into_response()
        }
        Err(e @ FavoriteError::NotFound) => {
            (StatusCode::NOT_FOUND, Json(json!({"error": e.to_string()}))).into_response()
        }
        Err(e @ FavoriteError::Conflict) => {
            (StatusCode::CONFLICT, Json(json!({"error": e.to_string()}))).into_response()
        }
        Err(FavoriteError::Database(e)) => internal_error("Failed to create favorite", e),
    }
}

// GET /favorites
pub async fn list_favorites(
    Extension(db): Extension<DatabaseConnection>,
    Extension(user_id): Extension<i32>,
) -> Response {
    match FavoriteManager::new(db).list_for_user(user_id).await {
        Ok(favorites) => (StatusCode::OK, Json(favorites)).into_response(),
        Err(e) => internal_error("Failed to fetch favorites", e),
    }
}

// GET /favorites/search?keyword=crack
pub async fn search_favorites(
    Extension(db): Extension<DatabaseConnection>,
    Extension(user_id): Extension<i32>,
    Query(query): Query<SearchFavoritesQuery>,
) -> Response {
    match FavoriteManager::new(db).search(user_id, &query.keyword).await {
        Ok(favorites) => (StatusCode::OK, Json(favorites)).into_response(),
        Err(e) => internal_error("Failed to search favorites", e),
    }
}

// DELETE /favorites/:id
pub async fn delete_favorite(
    Extension(db): Extension<DatabaseConnection>,
    Extension(user_id): Extension<i32>,
    Path(favorite_id): Path<i32>,
) -> Response {
    match FavoriteManager::new(db).delete_owned(user_id, favorite_id).await {
        Ok(true) => {
            info!("Deleted favorite: {}", favorite_id);
            crate::metrics::decrement_favorite_records();
            (StatusCode::OK, Json(json!({"deleted": true}))).into_response()
        }
        Ok(false) => (StatusCode::NOT_FOUND, Json(json!({"deleted": false}))).into_response(),
        Err(e) => internal_error("Failed to delete favorite", e),
    }
}
