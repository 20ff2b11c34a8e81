use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Contact request row. Created by the public form independently of auth;
/// `user_id` is attached either at creation time (email already has an
/// account) or by the backfill when that account appears later.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub consultation_type: String,
    pub message: Option<String>,
    pub confidentiality_accepted: bool,
    pub processed: bool,
    pub user_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Fields for inserting a contact request.
#[derive(Debug)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub consultation_type: String,
    pub message: Option<String>,
    pub confidentiality_accepted: bool,
    pub user_id: Option<Uuid>,
}

pub async fn create(db: &PgPool, new: NewContact) -> sqlx::Result<Contact> {
    sqlx::query_as::<_, Contact>(
        r#"
        INSERT INTO contacts (id, first_name, last_name, email, phone,
                              consultation_type, message, confidentiality_accepted,
                              user_id)
        VALUES ($1, $2, $3, lower($4), $5, $6, $7, $8, $9)
        RETURNING id, first_name, last_name, email, phone, consultation_type,
                  message, confidentiality_accepted, processed, user_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.first_name)
    .bind(new.last_name)
    .bind(new.email)
    .bind(new.phone)
    .bind(new.consultation_type)
    .bind(new.message)
    .bind(new.confidentiality_accepted)
    .bind(new.user_id)
    .fetch_one(db)
    .await
}

/// Contacts belonging to the caller, by linkage or by matching email, newest
/// first.
pub async fn list_for_user(db: &PgPool, user_id: Uuid, email: &str) -> sqlx::Result<Vec<Contact>> {
    sqlx::query_as::<_, Contact>(
        r#"
        SELECT id, first_name, last_name, email, phone, consultation_type,
               message, confidentiality_accepted, processed, user_id, created_at
        FROM contacts
        WHERE user_id = $1 OR lower(email) = lower($2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(email)
    .fetch_all(db)
    .await
}

/// Admin view: every contact request, optionally filtered on the processed
/// flag, newest first.
pub async fn list_all(db: &PgPool, processed: Option<bool>) -> sqlx::Result<Vec<Contact>> {
    sqlx::query_as::<_, Contact>(
        r#"
        SELECT id, first_name, last_name, email, phone, consultation_type,
               message, confidentiality_accepted, processed, user_id, created_at
        FROM contacts
        WHERE $1::boolean IS NULL OR processed = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(processed)
    .fetch_all(db)
    .await
}

/// Attach every unlinked contact request with this email to the user.
/// A single conditional UPDATE, so running it again is a no-op.
pub async fn link_unclaimed(db: &PgPool, user_id: Uuid, email: &str) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE contacts
        SET user_id = $1
        WHERE user_id IS NULL AND lower(email) = lower($2)
        "#,
    )
    .bind(user_id)
    .bind(email)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}
