use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer: post authoring, commenting, and owner-scoped edits.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware being
/// present on the router layer above this module. This guarantees that all handlers
/// receive a validated `AuthUser` struct containing the user's ID and role, which is
/// then used for the Owner-Only checks (e.g., in `update_post` and `delete_comment`)
/// and the admin role check in `moderate_comment`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Post Authoring ---
        // POST /posts
        // Submits a new post. The author is always the authenticated caller.
        .route("/posts", post(handlers::create_post))
        // GET /posts/my-posts
        // Lists all posts owned by the authenticated user (drafts included),
        // plus the author aggregate (count, average views).
        .route("/posts/my-posts", get(handlers::get_my_posts))
        // PATCH/DELETE /posts/{post_id}
        // Modify or remove a post. **Strict ownership check** (author or admin)
        // is enforced within the handler logic; only admins may change isFeatured.
        .route(
            "/posts/{post_id}",
            patch(handlers::update_post).delete(handlers::delete_post),
        )
        // --- Commenting System ---
        // POST /comments
        // Posts a new comment or reply. New comments always start PENDING.
        .route("/comments", post(handlers::create_comment))
        // PATCH/DELETE /comments/{comment_id}
        // Owner-scoped edit and delete. A comment belonging to someone else
        // answers the same 404 as a missing one.
        .route(
            "/comments/{comment_id}",
            patch(handlers::update_comment).delete(handlers::delete_comment),
        )
        // PATCH /comments/{comment_id}/moderate
        // Admin-only moderation transition; the admin role check lives in the handler.
        .route(
            "/comments/{comment_id}/moderate",
            patch(handlers::moderate_comment),
        )
}
