/// Error Handling Module
///
/// Every failure in the service maps to one of four classes the HTTP layer
/// understands:
/// 1. Validation (400) - malformed or empty input, client fault
/// 2. Conflict (409) - duplicate registration
/// 3. Unauthorized (401) - bad credentials, invalid token, missing header
/// 4. Internal (500) - hashing, signing and storage failures
///
/// Domain-specific error types live here and are folded into `AppError`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Password policy violations, reported rule by rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    TooShort(usize),
    TooLong(usize),
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSymbol,
}

impl fmt::Display for PasswordPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordPolicyError::TooShort(min) => {
                write!(f, "password must be at least {} characters long", min)
            }
            PasswordPolicyError::TooLong(max) => {
                write!(f, "password must be at most {} bytes long", max)
            }
            PasswordPolicyError::MissingUppercase => {
                write!(f, "password must contain at least one uppercase letter")
            }
            PasswordPolicyError::MissingLowercase => {
                write!(f, "password must contain at least one lowercase letter")
            }
            PasswordPolicyError::MissingDigit => {
                write!(f, "password must contain at least one digit")
            }
            PasswordPolicyError::MissingSymbol => {
                write!(f, "password must contain at least one symbol")
            }
        }
    }
}

impl StdError for PasswordPolicyError {}

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(&'static str),
    InvalidFormat(&'static str),
    TooLong(&'static str, usize),
    WeakPassword(PasswordPolicyError),
    MalformedBody(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} must not be empty", field),
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::WeakPassword(rule) => write!(f, "{}", rule),
            ValidationError::MalformedBody(msg) => write!(f, "malformed request body: {}", msg),
        }
    }
}

impl StdError for ValidationError {}

/// Authentication failures. Messages are deliberately uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    InvalidToken,
    MissingToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::MissingToken => write!(f, "Missing or malformed token header"),
        }
    }
}

impl StdError for AuthError {}

/// Token codec failures
///
/// `Rejected` carries the concrete reason for server-side logs only; it is
/// collapsed into `AuthError::InvalidToken` before reaching a client.
#[derive(Debug, Clone)]
pub enum TokenError {
    Rejected(String),
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Rejected(reason) => write!(f, "Token rejected: {}", reason),
            TokenError::Signing(msg) => write!(f, "Token signing failed: {}", msg),
        }
    }
}

impl StdError for TokenError {}

/// Credential store failures
#[derive(Debug, Clone)]
pub enum StoreError {
    Conflict(String),
    NotFound(String),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "Duplicate entry: {}", msg),
            StoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StoreError::Backend(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::Conflict(db_err.message().to_string())
            }
            sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
    Load(config::ConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
            ConfigError::Load(e) => write!(f, "Config load error: {}", e),
        }
    }
}

impl StdError for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err)
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Conflict(String),
    Auth(AuthError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<PasswordPolicyError> for AppError {
    fn from(err: PasswordPolicyError) -> Self {
        AppError::Validation(ValidationError::WeakPassword(err))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Rejected(_) => AppError::Auth(AuthError::InvalidToken),
            TokenError::Signing(msg) => AppError::Internal(msg),
        }
    }
}

/// Storage conflicts stay conflicts; everything else is the server's problem.
/// Callers that need `NotFound` to mean something else match on it first.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => {
                AppError::Conflict("User with this email already exists".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID, also present in the server log line
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (code, message) = match self {
            AppError::Validation(e) => ("VALIDATION_ERROR", e.to_string()),
            AppError::Conflict(msg) => ("ALREADY_EXISTS", msg.clone()),
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => ("INVALID_CREDENTIALS", e.to_string()),
                AuthError::InvalidToken => ("TOKEN_INVALID", e.to_string()),
                AuthError::MissingToken => ("MISSING_TOKEN", e.to_string()),
            },
            // Internal detail stays in the log
            AppError::Internal(_) => {
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        let status = ResponseError::status_code(self);
        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Conflict(msg) => {
                tracing::warn!(request_id = request_id, error = %msg, "Duplicate entry attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-operation context for handler logs
///
/// Failures are logged once, by `ResponseError`, under the `error_id` the
/// client receives; handlers use this context for the success path only.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub subject: Option<String>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            subject: None,
            operation: operation.into(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn log_completed(&self, message: &str) {
        tracing::info!(
            request_id = %self.request_id,
            operation = %self.operation,
            subject = ?self.subject,
            "{}",
            message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email");
        assert_eq!(err.to_string(), "email must not be empty");
    }

    #[test]
    fn test_weak_password_names_the_rule() {
        let err: AppError = PasswordPolicyError::MissingSymbol.into();
        assert_eq!(err.to_string(), "password must contain at least one symbol");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_codes_per_class() {
        assert_eq!(
            AppError::Validation(ValidationError::InvalidFormat("email")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Conflict("dup".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Auth(AuthError::InvalidToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_rejection_collapses_to_invalid_token() {
        let expired: AppError = TokenError::Rejected("ExpiredSignature".into()).into();
        let wrong_kind: AppError = TokenError::Rejected("kind mismatch".into()).into();

        assert_eq!(expired.to_string(), wrong_kind.to_string());
        assert!(matches!(expired, AppError::Auth(AuthError::InvalidToken)));
    }

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err: AppError = StoreError::Conflict("users_pkey".into()).into();
        assert!(matches!(err, AppError::Conflict(_)));

        let err: AppError = StoreError::Backend("connection reset".into()).into();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_internal_detail_not_in_response() {
        let err = AppError::Internal("pq: password authentication failed for user".into());
        let (status, body) = ErrorHandler::error_response(&err, "req-1");

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal server error");
        assert_eq!(body.error_id, "req-1");
    }

    #[actix_web::test]
    async fn test_http_error_body_carries_error_id() {
        let response = ResponseError::error_response(&AppError::Auth(AuthError::InvalidToken));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "TOKEN_INVALID");
        assert!(uuid::Uuid::parse_str(json["error_id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_error_context_creation() {
        let ctx = ErrorContext::new("user_login");
        assert_eq!(ctx.operation, "user_login");
        assert!(ctx.subject.is_none());

        let ctx = ctx.with_subject("a@b.com");
        assert_eq!(ctx.subject.as_deref(), Some("a@b.com"));
    }
}
