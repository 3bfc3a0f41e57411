use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Defines the routes exclusively accessible to users with the ADMIN role.
///
/// Access Control:
/// The router is nested under `/admin` behind the authentication layer; the
/// explicit `role == ADMIN` permission check happens inside each handler before
/// any data is touched, answering 403 for authenticated non-admins.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Retrieves the dashboard statistics snapshot (post counts by status,
        // comment and user counts, view totals) from one consistent read.
        .route("/stats", get(handlers::get_stats))
}
