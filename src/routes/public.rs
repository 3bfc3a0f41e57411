use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in). These routes are read-only.
///
/// Security Mandate:
/// The post detail endpoint must never leak unmoderated comments: its comment tree
/// is built from APPROVED comments only, enforced at the Repository level.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        .route("/health", get(handlers::health_check))
        // GET /posts?search=...&tags=...&status=...&page=...&sortBy=...
        // Filtered, paged post listing. Unrecognized sortBy values fall back to
        // createdAt inside the normalizer, never into SQL.
        .route("/posts", get(handlers::list_posts))
        // GET /posts/{post_id}
        // Single post with its approved comment tree. Every successful read
        // atomically increments the post's view counter.
        .route("/posts/{post_id}", get(handlers::get_post))
        // GET /comments/{comment_id}
        // Single comment with its parent post projection.
        .route("/comments/{comment_id}", get(handlers::get_comment))
        // GET /comments/author/{author_id}
        // All comments written by one author, newest first.
        .route(
            "/comments/author/{author_id}",
            get(handlers::get_comments_by_author),
        )
}
