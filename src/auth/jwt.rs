/// JWT Token Issuing and Verification
///
/// `TokenCodec` owns the signing keys built from the configured secret and
/// is shared read-only between request workers.

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, TokenKind};
use crate::configuration::JwtSettings;
use crate::error::{ConfigError, TokenError};

/// Access and refresh token issued together
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from validated settings
    ///
    /// # Errors
    /// Returns `ConfigError` if the secret is empty or the lifetimes are inconsistent
    pub fn new(config: &JwtSettings) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_ttl: Duration::seconds(config.access_token_expiry),
            refresh_ttl: Duration::seconds(config.refresh_token_expiry),
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Sign a new token of the given kind expiring `ttl` from now
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if the expiry overflows or encoding fails
    pub fn issue(&self, subject: &str, kind: TokenKind, ttl: Duration) -> Result<String, TokenError> {
        let claims = Claims::new(subject, kind, ttl.num_seconds(), &self.issuer)?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue an access token and a refresh token for `subject`
    ///
    /// Either both tokens are returned or an error is.
    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair, TokenError> {
        let access_token = self.issue(subject, TokenKind::Access, self.access_ttl)?;
        let refresh_token = self.issue(subject, TokenKind::Refresh, self.refresh_ttl)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify signature, issuer, expiry and kind, returning the subject email
    ///
    /// # Errors
    /// Returns `TokenError::Rejected` for every failed check. The reason is
    /// for logs only; callers must not expose it.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<String, TokenError> {
        let claims = self.decode_claims(token)?;

        if claims.token_type != expected {
            return Err(TokenError::Rejected(format!(
                "expected {} token, got {}",
                expected, claims.token_type
            )));
        }

        Ok(claims.sub)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Rejected(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "test".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 86400,
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(&get_test_config()).expect("valid config")
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let codec = codec();
        let token = codec
            .issue("a@b.com", TokenKind::Access, Duration::minutes(5))
            .expect("Failed to issue token");

        let subject = codec.verify(&token, TokenKind::Access).expect("Failed to verify token");
        assert_eq!(subject, "a@b.com");
    }

    #[test]
    fn test_token_has_three_parts() {
        let token = codec()
            .issue("a@b.com", TokenKind::Access, Duration::minutes(5))
            .unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_pair_kinds_are_not_interchangeable() {
        let codec = codec();
        let pair = codec.issue_pair("a@b.com").expect("Failed to issue pair");

        assert!(codec.verify(&pair.access_token, TokenKind::Access).is_ok());
        assert!(codec.verify(&pair.refresh_token, TokenKind::Refresh).is_ok());
        assert!(codec.verify(&pair.refresh_token, TokenKind::Access).is_err());
        assert!(codec.verify(&pair.access_token, TokenKind::Refresh).is_err());
    }

    #[test]
    fn test_pair_lifetimes() {
        let codec = codec();
        let pair = codec.issue_pair("a@b.com").unwrap();

        let access = codec.decode_claims(&pair.access_token).unwrap();
        let refresh = codec.decode_claims(&pair.refresh_token).unwrap();
        assert_eq!(access.exp - access.iat, 900);
        assert_eq!(refresh.exp - refresh.iat, 86400);
        assert_eq!(access.iss, "test");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let codec = codec();
        let token = codec
            .issue("a@b.com", TokenKind::Access, Duration::seconds(-10))
            .unwrap();

        assert!(codec.verify(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_invalid_token() {
        let result = codec().verify("invalid.token.here", TokenKind::Access);
        assert!(matches!(result, Err(TokenError::Rejected(_))));
    }

    #[test]
    fn test_tampered_token() {
        let codec = codec();
        let token = codec
            .issue("a@b.com", TokenKind::Access, Duration::minutes(5))
            .unwrap();

        let tampered = format!("{}X", token);
        assert!(codec.verify(&tampered, TokenKind::Access).is_err());
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let mut other = get_test_config();
        other.secret = "another-secret-key-at-least-32-characters".to_string();
        let token = TokenCodec::new(&other)
            .unwrap()
            .issue("a@b.com", TokenKind::Access, Duration::minutes(5))
            .unwrap();

        assert!(codec().verify(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let mut other = get_test_config();
        other.issuer = "wrong-issuer".to_string();
        let token = TokenCodec::new(&other)
            .unwrap()
            .issue("a@b.com", TokenKind::Access, Duration::minutes(5))
            .unwrap();

        assert!(codec().verify(&token, TokenKind::Access).is_err());
    }

    /// Signs an arbitrary claim set with the test secret
    fn sign_raw(claims: &serde_json::Value) -> String {
        let config = get_test_config();
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap()
    }

    fn complete_claims() -> serde_json::Map<String, serde_json::Value> {
        let now = chrono::Utc::now().timestamp();
        serde_json::json!({
            "sub": "a@b.com",
            "token_type": "access",
            "exp": now + 300,
            "iat": now,
            "iss": get_test_config().issuer,
            "jti": "5f0c6c1e-0000-4000-8000-000000000000",
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_hand_signed_complete_token_is_accepted() {
        let token = sign_raw(&serde_json::Value::Object(complete_claims()));
        assert_eq!(codec().verify(&token, TokenKind::Access).unwrap(), "a@b.com");
    }

    #[test]
    fn test_token_missing_a_required_claim_is_rejected() {
        let codec = codec();

        for claim in ["sub", "token_type", "exp", "iss"] {
            let mut claims = complete_claims();
            claims.remove(claim);
            let token = sign_raw(&serde_json::Value::Object(claims));

            assert!(
                matches!(codec.verify(&token, TokenKind::Access), Err(TokenError::Rejected(_))),
                "token without {} was accepted",
                claim
            );
        }
    }

    #[test]
    fn test_oversized_lifetime_fails_construction() {
        let mut config = get_test_config();
        config.refresh_token_expiry = i64::MAX;
        assert!(matches!(TokenCodec::new(&config), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_empty_secret_fails_construction() {
        let mut config = get_test_config();
        config.secret = String::new();
        assert!(TokenCodec::new(&config).is_err());
    }
}
