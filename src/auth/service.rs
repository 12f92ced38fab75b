/// Authentication service
///
/// Orchestrates registration, login, token refresh and the password /
/// account operations on top of the credential store. Holds no mutable
/// state of its own and is shared between all request workers.

use serde::Serialize;
use std::sync::Arc;

use crate::auth::claims::TokenKind;
use crate::auth::jwt::{TokenCodec, TokenPair};
use crate::auth::password::PasswordHasher;
use crate::error::{AppError, AuthError, StoreError, ValidationError};
use crate::store::{AccountStatus, CredentialRecord, CredentialStore};
use crate::validators::{
    is_valid_email, is_valid_name, validate_password, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH,
};

/// Public view of a credential record
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(flatten)]
    pub status: AccountStatus,
}

impl From<CredentialRecord> for UserProfile {
    fn from(record: CredentialRecord) -> Self {
        Self {
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            status: record.status,
        }
    }
}

// Hashed once at startup; results of verifying against it are discarded.
const DUMMY_PASSWORD: &str = "dummy-password-for-timing";

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    hasher: PasswordHasher,
    // Verified against on failed lookups so every login pays one bcrypt check
    dummy_hash: Arc<str>,
}

impl AuthService {
    /// # Errors
    /// Returns `AppError::Internal` if bcrypt rejects the configured cost
    pub fn new(
        store: Arc<dyn CredentialStore>,
        codec: TokenCodec,
        hasher: PasswordHasher,
    ) -> Result<Self, AppError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;

        Ok(Self {
            store,
            codec: Arc::new(codec),
            hasher,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    pub fn token_codec(&self) -> Arc<TokenCodec> {
        Arc::clone(&self.codec)
    }

    /// Register a new user
    ///
    /// Empty-field checks run before format checks; nothing is hashed or
    /// written unless all four fields pass.
    ///
    /// # Errors
    /// * `Validation` - empty or malformed field, weak password
    /// * `Conflict` - a record for this email already exists
    /// * `Internal` - hashing or storage failure
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<UserProfile, AppError> {
        require_non_empty("email", email)?;
        require_non_empty("password", password)?;
        require_non_empty("firstName", first_name)?;
        require_non_empty("lastName", last_name)?;

        require_max_length("email", email, MAX_EMAIL_LENGTH)?;
        require_max_length("firstName", first_name, MAX_NAME_LENGTH)?;
        require_max_length("lastName", last_name, MAX_NAME_LENGTH)?;

        if !is_valid_email(email) {
            return Err(ValidationError::InvalidFormat("email").into());
        }
        if !is_valid_name(first_name) {
            return Err(ValidationError::InvalidFormat("firstName").into());
        }
        if !is_valid_name(last_name) {
            return Err(ValidationError::InvalidFormat("lastName").into());
        }
        validate_password(password)?;

        let password_hash = self.hash_password(password).await?;

        // Fast-fail only. The store's insert decides.
        if self.store.find_by_email(email).await?.is_some() {
            return Err(conflict());
        }

        let record = CredentialRecord {
            email: email.to_string(),
            password_hash,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            status: AccountStatus::active(),
        };

        match self.store.insert(record.clone()).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                tracing::info!(email = %email, "Registration lost uniqueness race");
                return Err(conflict());
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(email = %email, "User registered");
        Ok(record.into())
    }

    /// Authenticate with email and password and issue a token pair
    ///
    /// Unknown email, blocked account and wrong password all produce the
    /// same `InvalidCredentials` error after one bcrypt verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        require_non_empty("email", email)?;
        require_non_empty("password", password)?;

        let record = match self.store.find_by_email(email).await? {
            Some(record) if record.status.allows_login() => record,
            Some(record) => {
                tracing::warn!(email = %email, status = ?record.status, "Login to blocked account");
                self.verify_dummy(password).await?;
                return Err(AuthError::InvalidCredentials.into());
            }
            None => {
                tracing::debug!(email = %email, "Login for unknown email");
                self.verify_dummy(password).await?;
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.verify_password(password, &record.password_hash).await? {
            tracing::warn!(email = %email, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let pair = self.codec.issue_pair(&record.email)?;
        tracing::info!(email = %email, "User logged in");
        Ok(pair)
    }

    /// Mint a new access token from a refresh token
    ///
    /// The refresh token itself is not reissued.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let subject = self
            .codec
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::warn!(error = %e, "Refresh token rejected");
                AppError::from(e)
            })?;

        let access_token = self
            .codec
            .issue(&subject, TokenKind::Access, self.codec.access_ttl())?;

        tracing::debug!(email = %subject, "Access token refreshed");
        Ok(access_token)
    }

    /// Replace the password of an authenticated user
    ///
    /// # Errors
    /// * `Auth` - old password does not match, or the account is gone
    /// * `Validation` - new password breaks the policy
    pub async fn change_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        require_non_empty("oldPassword", old_password)?;
        require_non_empty("newPassword", new_password)?;

        let record = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

        if !self.verify_password(old_password, &record.password_hash).await? {
            tracing::warn!(email = %email, "Password change with wrong old password");
            return Err(AuthError::InvalidCredentials.into());
        }

        validate_password(new_password)?;
        let new_hash = self.hash_password(new_password).await?;

        self.store
            .update_password(email, &new_hash)
            .await
            .map_err(missing_account_is_unauthorized)?;

        tracing::info!(email = %email, "Password changed");
        Ok(())
    }

    pub async fn delete_account(&self, email: &str) -> Result<(), AppError> {
        self.store
            .delete(email)
            .await
            .map_err(missing_account_is_unauthorized)?;

        tracing::info!(email = %email, "Account deleted");
        Ok(())
    }

    pub async fn current_user(&self, email: &str) -> Result<UserProfile, AppError> {
        self.store
            .find_by_email(email)
            .await?
            .map(UserProfile::from)
            .ok_or(AppError::Auth(AuthError::InvalidCredentials))
    }

    // bcrypt is deliberately slow; keep it off the request workers.
    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.hasher;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let hasher = self.hasher;
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
    }

    // Same bcrypt work as a real comparison; the result is discarded.
    async fn verify_dummy(&self, password: &str) -> Result<(), AppError> {
        self.verify_password(password, &self.dummy_hash).await?;
        Ok(())
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

fn require_max_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong(field, max));
    }
    Ok(())
}

fn conflict() -> AppError {
    AppError::Conflict("User with this email already exists".to_string())
}

fn missing_account_is_unauthorized(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::Auth(AuthError::InvalidCredentials),
        other => other.into(),
    }
}
