pub mod detection;
pub mod favorites;
pub mod grades;
pub mod middleware;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Extension, Router,
};
use sea_orm::DatabaseConnection;

use crate::detection::DetectionPipeline;
use crate::storage::LocalFileStore;
use middleware::TokenVerifier;

pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

async fn health_check() -> &'static str {
    "OK"
}

pub fn router(
    db: DatabaseConnection,
    pipeline: Arc<DetectionPipeline>,
    store: LocalFileStore,
    verifier: Arc<dyn TokenVerifier>,
) -> Router {
    let protected_routes = Router::new()
        .route("/coffee/detect", post(detection::detect))
        .route("/detection/history", get(detection::list_history))
        .route(
            "/favorites",
            get(favorites::list_favorites).post(favorites::add_favorite),
        )
        .route("/favorites/search", get(favorites::search_favorites))
        .route("/favorites/:id", delete(favorites::delete_favorite))
        .route("/grades/:id/sample-image", post(grades::upload_sample_image))
        .route_layer(axum::middleware::from_fn(middleware::auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(Extension(db))
        .layer(Extension(pipeline))
        .layer(Extension(store))
        .layer(Extension(verifier))
        .layer(tower_cookies::CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
