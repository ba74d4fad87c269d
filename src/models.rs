use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// The RBAC label attached to every user and embedded in session token claims.
/// Stored in Postgres as the `user_role` enum type; lowercase on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Parses a client-supplied role string. Anything outside the enum is
    /// rejected rather than defaulted, so a typo can never grant or strip
    /// privileges silently.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// User
///
/// The client-visible user record. The password digest is deliberately absent
/// from this struct; it lives only in [`UserRecord`], which is never
/// serialized, so no response can leak it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    // Stored trimmed and lowercased; unique.
    pub email: String,
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// UserRecord
///
/// Internal row shape that also carries the bcrypt digest. Fetched only where
/// credentials must be checked (login) or existence probed (signup), mirroring
/// a "select password explicitly" access pattern.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Post
///
/// A blog post. `author` references a user id but carries no foreign key
/// constraint: deleting a user leaves the reference dangling, and the joined
/// display fields below come back null for such posts.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    // Immutable after creation; never taken from a request body.
    pub author: Uuid,

    // Loaded via LEFT JOIN on users; null when the author row is gone.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// Input payload for POST /auth/signup. The role is not accepted from the
/// client; every signup starts as a plain user.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Input payload for POST /auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Input payload for POST /posts. There is intentionally no author field; the
/// author is always the authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// Partial update payload for PUT /posts/{id}. Only title and content are
/// mutable; omitted fields keep their stored value (COALESCE in the update
/// query).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Input payload for PATCH /users/{id}. Carried as a raw string and validated
/// through [`Role::parse`] so an out-of-enum value maps to 400 rather than a
/// body-deserialization rejection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateRoleRequest {
    pub role: String,
}

// --- Output Schemas ---

/// Response body for signup and login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthResponse {
    pub message: String,
    pub user: User,
}

/// Generic confirmation body for delete operations.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

// --- Input Validation ---

/// Maximum accepted title length, in characters.
pub const TITLE_MAX_LEN: usize = 100;
/// Minimum accepted password length.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Canonical email form: trimmed and lowercased. Applied before every store
/// read or write involving an email, which is what makes uniqueness
/// case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Shallow shape check; full deliverability is not this layer's concern.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| ApiError::Validation("Please provide a valid email".to_string()))?;
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ApiError::Validation(
            "Please provide a valid email".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("Please provide a name".to_string()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < PASSWORD_MIN_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ApiError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation("Please provide a title".to_string()));
    }
    if trimmed.chars().count() > TITLE_MAX_LEN {
        return Err(ApiError::Validation(format!(
            "Title cannot be more than {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::Validation("Please provide content".to_string()));
    }
    Ok(())
}
