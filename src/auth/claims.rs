/// JWT Claims structure
///
/// The payload of every token this service issues. The subject is the
/// user's email; the token kind tells access and refresh tokens apart.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::TokenError;

/// Purpose a token was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims carried by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Token kind
    pub token_type: TokenKind,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Unique token id
    pub jti: String,
}

impl Claims {
    /// Create new claims expiring `ttl_seconds` from now
    ///
    /// # Arguments
    /// * `subject` - User's email address
    /// * `kind` - Access or refresh
    /// * `ttl_seconds` - Token lifetime in seconds
    /// * `issuer` - Issuer identifier
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if the expiry overflows a timestamp
    pub fn new(
        subject: &str,
        kind: TokenKind,
        ttl_seconds: i64,
        issuer: &str,
    ) -> Result<Self, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let exp = now
            .checked_add(ttl_seconds)
            .ok_or_else(|| TokenError::Signing(format!("lifetime {}s overflows", ttl_seconds)))?;

        Ok(Self {
            sub: subject.to_string(),
            token_type: kind,
            exp,
            iat: now,
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("test@example.com", TokenKind::Access, 3600, "test").unwrap();

        assert_eq!(claims.sub, "test@example.com");
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_overflowing_lifetime_is_an_error() {
        let result = Claims::new("test@example.com", TokenKind::Refresh, i64::MAX, "test");
        assert!(matches!(result, Err(TokenError::Signing(_))));
    }

    #[test]
    fn test_every_claim_set_gets_its_own_id() {
        let a = Claims::new("test@example.com", TokenKind::Access, 60, "test").unwrap();
        let b = Claims::new("test@example.com", TokenKind::Access, 60, "test").unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_token_kind_wire_format() {
        let claims = Claims::new("test@example.com", TokenKind::Refresh, 60, "test").unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["token_type"], "refresh");

        let unknown = serde_json::json!({
            "sub": "test@example.com",
            "token_type": "admin",
            "exp": 0,
            "iat": 0,
            "iss": "test",
            "jti": "x",
        });
        assert!(serde_json::from_value::<Claims>(unknown).is_err());
    }
}
