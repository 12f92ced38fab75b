use async_trait::async_trait;
use sqlx::PgPool;

use super::{AccountStatus, CredentialRecord, CredentialStore};
use crate::error::StoreError;

type CredentialRow = (String, String, String, String, bool, bool, bool, bool);

/// Postgres-backed credential store
///
/// Relies on the primary key on `users.email` (see `migrations/`) for
/// uniqueness; a violation surfaces as `StoreError::Conflict`.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT email, password_hash, first_name, last_name,
                   credentials_non_expired, account_non_expired, account_non_locked, enabled
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(
                email,
                password_hash,
                first_name,
                last_name,
                credentials_non_expired,
                account_non_expired,
                account_non_locked,
                enabled,
            )| CredentialRecord {
                email,
                password_hash,
                first_name,
                last_name,
                status: AccountStatus {
                    credentials_non_expired,
                    account_non_expired,
                    account_non_locked,
                    enabled,
                },
            },
        ))
    }

    async fn insert(&self, record: CredentialRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name,
                               credentials_non_expired, account_non_expired,
                               account_non_locked, enabled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(record.status.credentials_non_expired)
        .bind(record.status.account_non_expired)
        .bind(record.status.account_non_locked)
        .bind(record.status.enabled)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE email = $2")
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(email.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, email: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(email.to_string()));
        }
        Ok(())
    }
}
