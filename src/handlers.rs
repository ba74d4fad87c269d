use crate::{
    AppState,
    auth::{self, AuthUser},
    config::Env,
    error::ApiError,
    models::{
        self, AuthResponse, CreatePostRequest, LoginRequest, MessageResponse, Post, Role,
        SignupRequest, UpdatePostRequest, UpdateRoleRequest, User,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// PostListQuery
///
/// Accepted query parameters for the public post listing endpoint
/// (GET /posts). Bound by Axum's Query extractor.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PostListQuery {
    /// Maximum number of posts to return; defaults to 10.
    pub limit: Option<i64>,
}

const DEFAULT_POST_LIMIT: i64 = 10;

// --- Auth Handlers ---

/// signup
///
/// [Public Route] Registers a new account. The password is stored only as a
/// bcrypt digest and the role is always `user`; elevation happens exclusively
/// through the admin role-change endpoint.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Invalid name, email, or password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    models::validate_name(&payload.name)?;
    let email = models::normalize_email(&payload.email);
    models::validate_email(&email)?;
    models::validate_password(&payload.password)?;

    if state.repo.get_user_by_email(&email).await.is_some() {
        return Err(ApiError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let digest = crate::password::hash(&payload.password)?;

    let user = state
        .repo
        .create_user(payload.name.trim(), &email, &digest)
        .await
        .map_err(|e| {
            // Two signups racing past the existence probe: the unique index
            // on email decides, and the loser gets the same 409.
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                ApiError::Conflict("User with this email already exists".to_string())
            } else {
                ApiError::from(e)
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

/// login
///
/// [Public Route] Verifies credentials and establishes a session by setting
/// the HTTP-only `token` cookie.
///
/// *Enumeration resistance*: an unknown email and a wrong password produce
/// byte-identical 401 responses.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = models::normalize_email(&payload.email);

    let record = state
        .repo
        .get_user_by_email(&email)
        .await
        .ok_or(ApiError::InvalidCredentials)?;

    if !crate::password::verify(&payload.password, &record.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = auth::issue_token(record.user.id, record.user.role, &state.config.jwt_secret)?;
    let cookie = auth::session_cookie(&token, state.config.env == Env::Production);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            message: "Login successful".to_string(),
            user: record.user,
        }),
    ))
}

/// whoami
///
/// [Authenticated Route] Returns the caller's profile. The identity comes
/// from the token, but the row is re-fetched, so the returned role reflects
/// the latest stored value even when the token's embedded role is stale. A
/// valid token for a since-deleted account is rejected here.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn whoami(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .repo
        .get_user(id)
        .await
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Json(user))
}

// --- Post Handlers ---

/// get_posts
///
/// [Public Route] Lists posts newest-first with the author's display name
/// joined in. The caller may cap the result with `?limit=N` (default 10).
#[utoipa::path(
    get,
    path = "/posts",
    params(PostListQuery),
    responses((status = 200, description = "List posts", body = [Post]))
)]
pub async fn get_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Json<Vec<Post>> {
    let limit = query
        .limit
        .filter(|l| *l >= 0)
        .unwrap_or(DEFAULT_POST_LIMIT);
    Json(state.repo.get_posts(limit).await)
}

/// get_post_details
///
/// [Public Route] Retrieves a single post by id. A malformed id is rejected
/// with 400 by the Path extractor before this body runs.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 400, description = "Invalid post ID"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, ApiError> {
    match state.repo.get_post(id).await {
        Some(post) => Ok(Json(post)),
        None => Err(ApiError::NotFound("Post")),
    }
}

/// create_post
///
/// [Authenticated Route] Submits a new post. The author is always the
/// authenticated caller; the request body carries no author field, so a
/// client-supplied author is impossible by construction.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 400, description = "Invalid title or content"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_post(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    models::validate_title(&payload.title)?;
    models::validate_content(&payload.content)?;

    let post = state.repo.create_post(payload, id).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// update_post
///
/// [Authenticated Route] Modifies a post's title and/or content.
///
/// *Authorization*: the post is loaded first, so a missing post yields 404
/// before any authorization decision; then mutation is allowed only for the
/// author or an admin. Author and id are immutable.
#[utoipa::path(
    put,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 403, description = "Not the author or an admin"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn update_post(
    AuthUser { id: user_id, role }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let existing = state
        .repo
        .get_post(id)
        .await
        .ok_or(ApiError::NotFound("Post"))?;

    if existing.author != user_id && role != Role::Admin {
        return Err(ApiError::Forbidden("Not authorized to update this post"));
    }

    if let Some(title) = &payload.title {
        models::validate_title(title)?;
    }
    if let Some(content) = &payload.content {
        models::validate_content(content)?;
    }

    match state.repo.update_post(id, payload).await {
        Some(post) => Ok(Json(post)),
        // Deleted between the ownership check and the write.
        None => Err(ApiError::NotFound("Post")),
    }
}

/// delete_post
///
/// [Authenticated Route] Hard-deletes a post, no tombstone. Same
/// load-then-authorize ordering as `update_post`.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not the author or an admin"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    AuthUser { id: user_id, role }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let existing = state
        .repo
        .get_post(id)
        .await
        .ok_or(ApiError::NotFound("Post"))?;

    if existing.author != user_id && role != Role::Admin {
        return Err(ApiError::Forbidden("Not authorized to delete this post"));
    }

    if !state.repo.delete_post(id).await {
        return Err(ApiError::NotFound("Post"));
    }

    Ok(Json(MessageResponse {
        message: "Post deleted successfully".to_string(),
    }))
}

// --- User Management Handlers (admin router) ---

// The admin role check is not repeated in these handlers: the /users router
// is wrapped in `admin_middleware`, which rejects non-admin callers before
// any handler body runs.

/// get_users
///
/// [Admin Route] Lists every account, newest first. Password digests never
/// appear: the serialized `User` model has no such field.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn get_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.repo.get_users().await)
}

/// get_user_details
///
/// [Admin Route] Retrieves a single account by id.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    match state.repo.get_user(id).await {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound("User")),
    }
}

/// update_user_role
///
/// [Admin Route] Changes an account's role. The value is validated against
/// the role enum before the store is touched; anything else is a 400 and no
/// mutation occurs. The change does not revoke the target's existing session
/// tokens, which keep their issued role until expiry.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 400, description = "Invalid role value"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<User>, ApiError> {
    let role = Role::parse(&payload.role).ok_or_else(|| {
        ApiError::Validation("Invalid role. Role must be 'admin' or 'user'".to_string())
    })?;

    match state.repo.set_user_role(id, role).await {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound("User")),
    }
}

/// delete_user
///
/// [Admin Route] Hard-deletes an account. Authored posts are left in place
/// with a dangling author reference; their joined author fields come back
/// null from then on.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_user(id).await {
        return Err(ApiError::NotFound("User"));
    }

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
