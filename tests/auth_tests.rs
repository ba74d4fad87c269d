use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use inkpost::{
    AppState,
    auth::{self, AuthUser, Claims},
    config::{AppConfig, Env},
    error::ApiError,
    models::{CreatePostRequest, Post, Role, UpdatePostRequest, User, UserRecord},
    password,
    repository::Repository,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use uuid::Uuid;

// --- Mock Repository for Auth Logic ---

#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn get_user(&self, _id: Uuid) -> Option<User> {
        self.user_to_return.clone()
    }
    // Placeholders for the trait surface the auth flow never touches.
    async fn create_user(
        &self,
        _name: &str,
        _email: &str,
        _password_hash: &str,
    ) -> sqlx::Result<User> {
        Ok(User::default())
    }
    async fn get_user_by_email(&self, _email: &str) -> Option<UserRecord> {
        None
    }
    async fn get_users(&self) -> Vec<User> {
        vec![]
    }
    async fn set_user_role(&self, _id: Uuid, _role: Role) -> Option<User> {
        None
    }
    async fn delete_user(&self, _id: Uuid) -> bool {
        false
    }
    async fn create_post(&self, _req: CreatePostRequest, _author: Uuid) -> sqlx::Result<Post> {
        Ok(Post::default())
    }
    async fn get_posts(&self, _limit: i64) -> Vec<Post> {
        vec![]
    }
    async fn get_post(&self, _id: Uuid) -> Option<Post> {
        None
    }
    async fn update_post(&self, _id: Uuid, _req: UpdatePostRequest) -> Option<Post> {
        None
    }
    async fn delete_post(&self, _id: Uuid) -> bool {
        false
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn create_token(user_id: Uuid, role: Role, iat_offset: i64, exp_offset: i64) -> String {
    let now = unix_now();
    let claims = Claims {
        sub: user_id,
        role,
        iat: (now + iat_offset) as usize,
        exp: (now + exp_offset) as usize,
    };
    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(env: Env, repo: MockAuthRepo, jwt_secret: &str) -> AppState {
    let config = AppConfig {
        env,
        jwt_secret: jwt_secret.to_string(),
        ..AppConfig::default()
    };
    AppState {
        repo: Arc::new(repo),
        config,
    }
}

/// Builds request Parts carrying the given session cookie, if any.
fn request_parts(cookie: Option<&str>) -> Parts {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri("/".parse::<Uri>().unwrap());
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let (parts, _) = builder.body(axum::body::Body::empty()).unwrap().into_parts();
    parts
}

fn rejection_status(err: ApiError) -> StatusCode {
    use axum::response::IntoResponse;
    err.into_response().status()
}

// --- Extractor Tests ---

#[tokio::test]
async fn auth_succeeds_with_valid_cookie_token() {
    let token = create_token(TEST_USER_ID, Role::User, 0, 3600);
    // No user in the repo: the extractor must resolve from the claims alone.
    let state = create_app_state(Env::Production, MockAuthRepo::default(), TEST_JWT_SECRET);

    let mut parts = request_parts(Some(&format!("token={token}")));
    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await;

    assert!(auth_user.is_ok());
    let user = auth_user.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.role, Role::User);
}

#[tokio::test]
async fn auth_trusts_token_role_over_stored_role() {
    // The store says admin, but the token was issued while the user was a
    // plain user. Protected endpoints see the token's role.
    let token = create_token(TEST_USER_ID, Role::User, 0, 3600);
    let state = create_app_state(
        Env::Production,
        MockAuthRepo {
            user_to_return: Some(User {
                id: TEST_USER_ID,
                role: Role::Admin,
                ..User::default()
            }),
        },
        TEST_JWT_SECRET,
    );

    let mut parts = request_parts(Some(&format!("token={token}")));
    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();

    assert_eq!(user.role, Role::User);
}

#[tokio::test]
async fn auth_fails_with_missing_cookie() {
    let state = create_app_state(Env::Production, MockAuthRepo::default(), TEST_JWT_SECRET);

    let mut parts = request_parts(None);
    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await;

    assert!(auth_user.is_err());
    assert_eq!(
        rejection_status(auth_user.unwrap_err()),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn auth_fails_with_expired_token() {
    // Well past the validator's default leeway.
    let token = create_token(TEST_USER_ID, Role::User, -7200, -3600);
    let state = create_app_state(Env::Production, MockAuthRepo::default(), TEST_JWT_SECRET);

    let mut parts = request_parts(Some(&format!("token={token}")));
    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await;

    assert!(auth_user.is_err());
    assert_eq!(
        rejection_status(auth_user.unwrap_err()),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn auth_fails_with_wrong_secret() {
    let token = create_token(TEST_USER_ID, Role::Admin, 0, 3600);
    let state = create_app_state(Env::Production, MockAuthRepo::default(), "a-different-secret");

    let mut parts = request_parts(Some(&format!("token={token}")));
    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await;

    assert!(auth_user.is_err());
    assert_eq!(
        rejection_status(auth_user.unwrap_err()),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn auth_fails_with_garbage_token() {
    let state = create_app_state(Env::Production, MockAuthRepo::default(), TEST_JWT_SECRET);

    let mut parts = request_parts(Some("token=not-a-jwt"));
    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await;

    assert!(auth_user.is_err());
}

#[tokio::test]
async fn local_bypass_resolves_stored_user() {
    let mock_user_id = Uuid::new_v4();
    let state = create_app_state(
        Env::Local,
        MockAuthRepo {
            user_to_return: Some(User {
                id: mock_user_id,
                role: Role::Admin,
                ..User::default()
            }),
        },
        TEST_JWT_SECRET,
    );

    let mut parts = request_parts(None);
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(user.id, mock_user_id);
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn local_bypass_disabled_in_production() {
    let mock_user_id = Uuid::new_v4();
    let state = create_app_state(
        Env::Production,
        MockAuthRepo {
            user_to_return: Some(User {
                id: mock_user_id,
                ..User::default()
            }),
        },
        TEST_JWT_SECRET,
    );

    let mut parts = request_parts(None);
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await;
    assert!(auth_user.is_err());
    assert_eq!(
        rejection_status(auth_user.unwrap_err()),
        StatusCode::UNAUTHORIZED
    );
}

// --- Token Issuance Tests ---

#[tokio::test]
async fn issued_token_round_trips_through_extractor() {
    let user_id = Uuid::new_v4();
    let token = auth::issue_token(user_id, Role::Admin, TEST_JWT_SECRET).unwrap();

    let state = create_app_state(Env::Production, MockAuthRepo::default(), TEST_JWT_SECRET);
    let mut parts = request_parts(Some(&format!("token={token}")));

    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.role, Role::Admin);
}

// --- Cookie Tests ---

#[test]
fn session_cookie_carries_required_attributes() {
    let cookie = auth::session_cookie("abc123", false);
    assert!(cookie.starts_with("token=abc123"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains(&format!("Max-Age={}", auth::TOKEN_TTL_SECS)));
    assert!(!cookie.contains("Secure"));
}

#[test]
fn session_cookie_secure_in_production() {
    let cookie = auth::session_cookie("abc123", true);
    assert!(cookie.contains("Secure"));
}

#[test]
fn token_extracted_from_multi_value_cookie_header() {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(
        header::COOKIE,
        header::HeaderValue::from_static("theme=dark; token=xyz; lang=en"),
    );
    assert_eq!(auth::token_from_cookies(&headers), Some("xyz"));
}

// --- Password Tests ---

#[test]
fn digest_never_equals_plaintext_and_verifies() {
    let digest = password::hash("hunter2-secret").unwrap();
    assert_ne!(digest, "hunter2-secret");
    assert!(password::verify("hunter2-secret", &digest).unwrap());
}

#[test]
fn wrong_password_fails_verification() {
    let digest = password::hash("correct-password").unwrap();
    assert!(!password::verify("wrong-password", &digest).unwrap());
}
