use crate::models::{CreatePostRequest, Post, Role, UpdatePostRequest, User, UserRecord};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, letting the
/// handlers interact with the data layer without knowing the concrete backend
/// (Postgres in production, mocks in tests).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
///
/// Read methods return `Option`/`Vec` and swallow store errors into their
/// empty forms after logging; a failed read is indistinguishable from an
/// absent row, which maps to 404. Write methods that must distinguish
/// conflict from infrastructure failure return `sqlx::Result`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, name: &str, email: &str, password_hash: &str)
    -> sqlx::Result<User>;
    async fn get_user(&self, id: Uuid) -> Option<User>;
    /// Fetches the row including the password digest. Login only; expects a
    /// pre-normalized email.
    async fn get_user_by_email(&self, email: &str) -> Option<UserRecord>;
    async fn get_users(&self) -> Vec<User>;
    async fn set_user_role(&self, id: Uuid, role: Role) -> Option<User>;
    /// Hard delete. Authored posts are left untouched; their author reference
    /// dangles afterwards.
    async fn delete_user(&self, id: Uuid) -> bool;

    // --- Posts ---
    async fn create_post(&self, req: CreatePostRequest, author: Uuid) -> sqlx::Result<Post>;
    /// Newest-first listing, capped at `limit`, author display name joined in.
    async fn get_posts(&self, limit: i64) -> Vec<Post>;
    async fn get_post(&self, id: Uuid) -> Option<Post>;
    /// Partial update of title/content. Ownership is checked by the caller
    /// before this runs; last write wins between concurrent updates.
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> Option<Post>;
    async fn delete_post(&self, id: Uuid) -> bool;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL connection pool.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

// Post rows are always returned with the author's display fields joined in.
// LEFT JOIN: a post whose author was deleted still lists, with null fields.
const POST_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.author,
           u.name AS author_name, u.email AS author_email,
           p.created_at, p.updated_at
    FROM posts p
    LEFT JOIN users u ON p.author = u.id
"#;

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, 'user', NOW(), NOW())
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_user(&self, id: Uuid) -> Option<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    async fn get_user_by_email(&self, email: &str) -> Option<UserRecord> {
        let query = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRecord>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user_by_email error: {:?}", e);
                None
            })
    }

    async fn get_users(&self) -> Vec<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_users error: {:?}", e);
                vec![]
            })
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> Option<User> {
        let query = format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("set_user_role error: {:?}", e);
                None
            })
    }

    async fn delete_user(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_user error: {:?}", e);
                false
            }
        }
    }

    /// Inserts a new post and immediately joins the author's display fields
    /// back in, so the response carries the same shape as every other post
    /// read.
    async fn create_post(&self, req: CreatePostRequest, author: Uuid) -> sqlx::Result<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            WITH inserted AS (
                INSERT INTO posts (id, title, content, author, created_at, updated_at)
                VALUES ($1, $2, $3, $4, NOW(), NOW())
                RETURNING id, title, content, author, created_at, updated_at
            )
            SELECT p.id, p.title, p.content, p.author,
                   u.name AS author_name, u.email AS author_email,
                   p.created_at, p.updated_at
            FROM inserted p
            LEFT JOIN users u ON p.author = u.id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.title.trim())
        .bind(req.content)
        .bind(author)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_posts(&self, limit: i64) -> Vec<Post> {
        let query = format!("{POST_SELECT} ORDER BY p.created_at DESC LIMIT $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_posts error: {:?}", e);
                vec![]
            })
    }

    async fn get_post(&self, id: Uuid) -> Option<Post> {
        let query = format!("{POST_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_post error: {:?}", e);
                None
            })
    }

    /// COALESCE keeps any column whose corresponding request field is None.
    /// The author column is never part of the SET list; it is immutable.
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> Option<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            WITH updated AS (
                UPDATE posts
                SET title = COALESCE($2, title),
                    content = COALESCE($3, content),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id, title, content, author, created_at, updated_at
            )
            SELECT p.id, p.title, p.content, p.author,
                   u.name AS author_name, u.email AS author_email,
                   p.created_at, p.updated_at
            FROM updated p
            LEFT JOIN users u ON p.author = u.id
            "#,
        )
        .bind(id)
        .bind(req.title.as_deref().map(str::trim))
        .bind(req.content)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_post error: {:?}", e);
            None
        })
    }

    async fn delete_post(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_post error: {:?}", e);
                false
            }
        }
    }
}
