//! Credential store backed by PostgreSQL
//!
//! All password plaintext is hashed inside this module before any row is
//! written, so a plaintext never reaches the database, even transiently.
//! Email uniqueness is case-insensitive and ultimately enforced by the
//! `users_email_lower_idx` unique index, not by application logic.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::models::{User, UserRole};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, phone, \
     date_of_birth, country, role, is_email_verified, is_active, last_login_at, \
     created_at, updated_at";

/// Store-level errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("User not found")]
    NotFound,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Registration fields for a new user
///
/// `password` is the plaintext as submitted; `create` hashes it before the
/// insert and the value is dropped with this struct.
#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub country: Option<String>,
}

/// Partial profile update; absent fields keep their current value
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub country: Option<String>,
}

/// Persistent store of user credentials and profiles
#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user from registration fields
    ///
    /// Under concurrent registration of the same email, the unique index is
    /// the final arbiter: a unique violation from the insert maps to
    /// `DuplicateEmail` the same way a prior existence check would.
    pub async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let password_hash =
            hash_password(&new_user.password).map_err(|e| StoreError::Hash(e.to_string()))?;
        let email = new_user.email.to_lowercase();

        let query = format!(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, phone, date_of_birth, country, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        );

        let result = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(&email)
            .bind(&password_hash)
            .bind(&new_user.phone)
            .bind(new_user.date_of_birth)
            .bind(&new_user.country)
            .bind(UserRole::Applicant)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateEmail),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Look up a user by id
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Apply a partial profile update
    ///
    /// The password column is untouchable from here; it only changes through
    /// `update_password`.
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, StoreError> {
        let query = format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                phone = COALESCE($3, phone),
                date_of_birth = COALESCE($4, date_of_birth),
                country = COALESCE($5, country),
                updated_at = NOW()
            WHERE id = $6
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.phone)
            .bind(update.date_of_birth)
            .bind(&update.country)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Replace a user's password
    ///
    /// The incoming plaintext is hashed here, before the UPDATE is issued,
    /// so the write is only ever of the digest.
    pub async fn update_password(&self, id: Uuid, new_password: &str) -> Result<(), StoreError> {
        let password_hash =
            hash_password(new_password).map_err(|e| StoreError::Hash(e.to_string()))?;

        let rows_affected =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
                .bind(&password_hash)
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    /// Stamp the last-login timestamp, returning the value written
    pub async fn touch_last_login(&self, id: Uuid) -> Result<DateTime<Utc>, StoreError> {
        let now = Utc::now();

        sqlx::query("UPDATE users SET last_login_at = $1 WHERE id = $2")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(now)
    }
}

/// Postgres unique-violation detection (SQLSTATE 23505)
fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
