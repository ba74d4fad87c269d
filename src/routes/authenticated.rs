use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Routes requiring a valid session. The `auth_middleware` layered over this
/// router in `create_router` runs the `AuthUser` extractor before any handler
/// body, so every handler here receives a validated identity.
///
/// Ownership checks for post mutation live inside the handlers, because they
/// need the loaded post row: missing post yields 404 before any authorization
/// decision, then author-or-admin gates the write.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /auth/me
        // Session introspection. Re-fetches the user row, so the returned
        // role is the stored one, not the token's possibly stale claim.
        .route("/auth/me", get(handlers::whoami))
        // POST /posts
        // Submits a new post; the author is forced to the caller's identity.
        .route("/posts", post(handlers::create_post))
        // PUT/DELETE /posts/{id}
        // Mutation of an existing post, restricted to its author or an admin.
        .route(
            "/posts/{id}",
            put(handlers::update_post).delete(handlers::delete_post),
        )
}
