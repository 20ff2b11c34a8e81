use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Base role every account carries.
pub const ROLE_USER: &str = "ROLE_USER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// User record in the database.
///
/// Invariant: `password_hash` and `google_id` are never both absent — an
/// account is created either with a hashed password or with an external
/// identity (which also gets an unusable placeholder hash).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String, // stored lowercased, compared case-insensitively
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
    pub google_id: Option<String>,
    pub is_verified: bool,
    pub created_at: OffsetDateTime,
}

/// Fields for inserting a user.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
    pub google_id: Option<String>,
    pub is_verified: bool,
}

impl User {
    /// Role set as seen by tokens and views: never empty, always contains the
    /// base role.
    pub fn effective_roles(&self) -> Vec<String> {
        let mut roles = self.roles.clone();
        if !roles.iter().any(|r| r == ROLE_USER) {
            roles.push(ROLE_USER.to_string());
        }
        roles
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, roles,
                   google_id, is_verified, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, roles,
                   google_id, is_verified, created_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_google_id(db: &PgPool, google_id: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, roles,
                   google_id, is_verified, created_at
            FROM users
            WHERE google_id = $1
            "#,
        )
        .bind(google_id)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user. A unique-violation error here is the authoritative
    /// duplicate signal; callers translate it to a Conflict.
    pub async fn create(db: &PgPool, new: NewUser) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name,
                               roles, google_id, is_verified)
            VALUES ($1, lower($2), $3, $4, $5, $6, $7, $8)
            RETURNING id, email, password_hash, first_name, last_name, roles,
                      google_id, is_verified, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.roles)
        .bind(new.google_id)
        .bind(new.is_verified)
        .fetch_one(db)
        .await
    }

    /// Attach an external identity to an existing account and mark it
    /// verified.
    pub async fn link_google_id(db: &PgPool, id: Uuid, google_id: &str) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET google_id = $2, is_verified = TRUE
            WHERE id = $1
            RETURNING id, email, password_hash, first_name, last_name, roles,
                      google_id, is_verified, created_at
            "#,
        )
        .bind(id)
        .bind(google_id)
        .fetch_one(db)
        .await
    }
}
