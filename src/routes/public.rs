use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session: the identity gateway (signup,
/// login) and read-only post access. Anything listed here must be safe to
/// expose to anonymous traffic.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/signup
        // Creates a new account with the default 'user' role. 409 on a
        // duplicate email.
        .route("/auth/signup", post(handlers::signup))
        // POST /auth/login
        // Verifies credentials and sets the HTTP-only session cookie.
        .route("/auth/login", post(handlers::login))
        // GET /posts?limit=N
        // Lists posts newest-first, author name joined in. Readable by anyone.
        .route("/posts", get(handlers::get_posts))
        // GET /posts/{id}
        // Single post detail, author name and email joined in.
        .route("/posts/{id}", get(handlers::get_post_details))
}
