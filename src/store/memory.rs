use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{AccountStatus, CredentialRecord, CredentialStore};
use crate::error::StoreError;

/// Process-local credential store
///
/// Insert-if-absent runs under the map's shard lock, so uniqueness holds
/// under concurrent registrations.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    records: DashMap<String, CredentialRecord>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the status flags of an existing record
    pub fn set_status(&self, email: &str, status: AccountStatus) -> Result<(), StoreError> {
        let mut record = self
            .records
            .get_mut(email)
            .ok_or_else(|| StoreError::NotFound(email.to_string()))?;
        record.status = status;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self.records.get(email).map(|r| r.value().clone()))
    }

    async fn insert(&self, record: CredentialRecord) -> Result<(), StoreError> {
        match self.records.entry(record.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(record.email)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<(), StoreError> {
        let mut record = self
            .records
            .get_mut(email)
            .ok_or_else(|| StoreError::NotFound(email.to_string()))?;
        record.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn delete(&self, email: &str) -> Result<(), StoreError> {
        self.records
            .remove(email)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(email.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str) -> CredentialRecord {
        CredentialRecord {
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            status: AccountStatus::active(),
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = InMemoryCredentialStore::new();
        store.insert(record("a@b.com")).await.unwrap();

        let found = store.find_by_email("a@b.com").await.unwrap();
        assert_eq!(found.map(|r| r.first_name), Some("Ann".to_string()));
    }

    #[tokio::test]
    async fn emails_are_case_sensitive() {
        let store = InMemoryCredentialStore::new();
        store.insert(record("a@b.com")).await.unwrap();

        assert!(store.find_by_email("A@b.com").await.unwrap().is_none());
        assert!(store.insert(record("A@b.com")).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_insert_is_conflict() {
        let store = InMemoryCredentialStore::new();
        store.insert(record("a@b.com")).await.unwrap();

        let result = store.insert(record("a@b.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_missing_record() {
        let store = InMemoryCredentialStore::new();

        assert!(matches!(
            store.update_password("nobody@b.com", "x").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("nobody@b.com").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_password_replaces_hash() {
        let store = InMemoryCredentialStore::new();
        store.insert(record("a@b.com")).await.unwrap();
        store.update_password("a@b.com", "$2b$04$new").await.unwrap();

        let found = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.password_hash, "$2b$04$new");
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemoryCredentialStore::new();
        store.insert(record("a@b.com")).await.unwrap();
        store.delete("a@b.com").await.unwrap();

        assert!(store.is_empty());
    }
}
