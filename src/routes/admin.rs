use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// User management, exclusively for the 'admin' role. This router is nested
/// under `/users` and wrapped in `admin_middleware` by `create_router`; the
/// middleware authenticates the caller and rejects non-admins with 403, so
/// the handlers themselves carry no role checks.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /users
        // Lists every account, newest first. The password digest is not part
        // of the serialized model.
        .route("/", get(handlers::get_users))
        // GET /users/{id}      single account lookup
        // PATCH /users/{id}    role change, restricted to the role enum
        // DELETE /users/{id}   hard delete, no cascade to authored posts
        .route(
            "/{id}",
            get(handlers::get_user_details)
                .patch(handlers::update_user_role)
                .delete(handlers::delete_user),
        )
}
