//! Postgres-backed `users` table.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError | Scenario |
//! |------------|------------|----------|
//! | `RowNotFound` | `NotFound` | Row missing or soft-deleted |
//! | Database (check/not-null violation, `23514`/`23502`) | `Validation` | Row rejected by a constraint |
//! | Database (other) | `Database` | Any other server-side failure |
//! | `PoolClosed`, I/O, TLS, ... | `Database` | Connection-level failures |
//!
//! ## Soft Deletes
//!
//! Every statement filters on `deleted_at IS NULL`; `delete()` only stamps
//! the column, so ids are never reused.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use user_service_core::{NewUser, User, UserFilter, UserId, UserPatch};

use super::r#trait::{StoreError, StoreResult, UserStore};

const MAX_CONNECTIONS: u32 = 10;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ NULL,
        name TEXT NOT NULL,
        age BIGINT NOT NULL,
        email TEXT NOT NULL,
        address TEXT NOT NULL DEFAULT ''
    )
"#;

const CREATE_DELETED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_users_deleted_at ON users (deleted_at)";

/// Postgres-backed `UserStore`.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Load a live row, locking it for the remainder of `tx`.
    async fn lock_live(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: UserId,
    ) -> StoreResult<User> {
        let row = sqlx::query(
            r#"
            SELECT id, created_at, updated_at, deleted_at, name, age, email, address
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(id.get())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_user", e))?
        .ok_or(StoreError::NotFound)?;

        decode(&row)
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self), err)]
    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_table", e))?;
        sqlx::query(CREATE_DELETED_AT_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_index", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, created_at, updated_at, deleted_at, name, age, email, address
            FROM users
            WHERE deleted_at IS NULL
                AND ($1::bigint IS NULL OR id = $1)
                AND ($2::text IS NULL OR name = $2)
                AND ($3::bigint IS NULL OR age = $3)
                AND ($4::text IS NULL OR email = $4)
                AND ($5::text IS NULL OR address = $5)
            ORDER BY id ASC
            "#,
        )
        .bind(filter.id())
        .bind(filter.name())
        .bind(filter.age())
        .bind(filter.email())
        .bind(filter.address())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;

        rows.iter().map(decode).collect()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get(&self, id: UserId) -> StoreResult<User> {
        let row = sqlx::query(
            r#"
            SELECT id, created_at, updated_at, deleted_at, name, age, email, address
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_user", e))?
        .ok_or(StoreError::NotFound)?;

        decode(&row)
    }

    #[instrument(skip(self, new), err)]
    async fn create(&self, new: NewUser) -> StoreResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (name, age, email, address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at, updated_at, deleted_at, name, age, email, address
            "#,
        )
        .bind(&new.name)
        .bind(new.age)
        .bind(&new.email)
        .bind(&new.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        decode(&row)
    }

    #[instrument(skip(self, patch), fields(user_id = %id), err)]
    async fn update(&self, id: UserId, patch: &UserPatch) -> StoreResult<User> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut user = Self::lock_live(&mut tx, id).await?;
        user.apply(patch);
        if let Err(e) = user.validate() {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(e.into());
        }

        let row = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, age = $3, email = $4, address = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, created_at, updated_at, deleted_at, name, age, email, address
            "#,
        )
        .bind(id.get())
        .bind(&user.name)
        .bind(user.age)
        .bind(&user.email)
        .bind(&user.address)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        decode(&row)
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn delete(&self, id: UserId) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_user", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // not_null_violation / check_violation
                Some("23502") | Some("23514") => StoreError::Validation(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {}", operation))
        }
        other => StoreError::Database(format!("{} failed: {}", operation, other)),
    }
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    name: String,
    age: i64,
    email: String,
    address: String,
}

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
            name: row.try_get("name")?,
            age: row.try_get("age")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            name: row.name,
            age: row.age,
            email: row.email,
            address: row.address,
        }
    }
}

fn decode(row: &PgRow) -> StoreResult<User> {
    UserRow::from_row(row)
        .map(User::from)
        .map_err(|e| StoreError::Database(format!("failed to decode user row: {}", e)))
}
