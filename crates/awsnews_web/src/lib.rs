use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/posts/today", get(handlers::todays_posts))
        .route("/api/posts/by-date", get(handlers::posts_by_date))
        .route("/api/posts/by-category", get(handlers::posts_by_category))
        .route("/api/posts/search", get(handlers::search_posts))
        .route("/api/posts/latest", get(handlers::latest_posts))
        .route("/api/posts/popular", get(handlers::popular_posts))
        .route("/api/categories", get(handlers::categories))
        .route("/api/article", get(handlers::article_content))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, ApiError, AppState};
    pub use awsnews_core::{Error, Result};
}
