/// Credential store
///
/// The user record store is an external collaborator; this module fixes
/// the contract the auth service relies on and ships two backends.
///
/// The store, not the service, is the source of truth for email
/// uniqueness: `insert` must fail with `StoreError::Conflict` when a record
/// for the email already exists, even if a concurrent registration slipped
/// past the service's advisory pre-check.

mod memory;
mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::error::StoreError;

pub use memory::InMemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Account status flags, each of which must be set for login to succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    pub credentials_non_expired: bool,
    pub account_non_expired: bool,
    pub account_non_locked: bool,
    pub enabled: bool,
}

impl AccountStatus {
    pub fn active() -> Self {
        Self {
            credentials_non_expired: true,
            account_non_expired: true,
            account_non_locked: true,
            enabled: true,
        }
    }

    pub fn allows_login(&self) -> bool {
        self.credentials_non_expired
            && self.account_non_expired
            && self.account_non_locked
            && self.enabled
    }
}

impl Default for AccountStatus {
    fn default() -> Self {
        Self::active()
    }
}

/// Persisted identity, password hash and status flags for one user
#[derive(Clone)]
pub struct CredentialRecord {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub status: AccountStatus,
}

// Keep the hash out of logs and panic messages.
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("status", &self.status)
            .finish()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Look up a record by its exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError>;

    /// Persist a new record
    ///
    /// # Errors
    /// * `Conflict` - a record with this email already exists
    /// * `Backend` - storage failure
    async fn insert(&self, record: CredentialRecord) -> Result<(), StoreError>;

    /// Replace the password hash of an existing record
    ///
    /// # Errors
    /// * `NotFound` - no record for this email
    /// * `Backend` - storage failure
    async fn update_password(&self, email: &str, password_hash: &str) -> Result<(), StoreError>;

    /// Remove a record. Dependent data is the store's responsibility.
    ///
    /// # Errors
    /// * `NotFound` - no record for this email
    /// * `Backend` - storage failure
    async fn delete(&self, email: &str) -> Result<(), StoreError>;
}
