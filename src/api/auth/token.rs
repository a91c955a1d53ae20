//! Bearer token issuance and verification (HS256 JWT).
//!
//! Tokens are stateless: a token is either valid or invalid/expired, there is
//! no revocation list. The only way to invalidate one early is for the client
//! to drop it.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_seconds: ttl_hours * 60 * 60,
        }
    }

    /// Issue a signed token for the given subject, expiring one TTL from now.
    ///
    /// # Errors
    /// Returns `TokenError::Invalid` if the claims cannot be encoded or signed.
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        self.issue_at(username, Utc::now().timestamp())
    }

    pub(crate) fn issue_at(&self, username: &str, now_unix_seconds: i64) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: username.to_string(),
            iat: now_unix_seconds,
            exp: now_unix_seconds + self.ttl_seconds,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// # Errors
    /// Returns `TokenError::Expired` when `exp` has passed, and
    /// `TokenError::Invalid` for a bad signature or malformed input. Never
    /// panics on malformed input.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub(crate) fn verify_at(
        &self,
        token: &str,
        now_unix_seconds: i64,
    ) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the caller's clock, with no leeway.
        validation.validate_exp = false;

        let data = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        if data.claims.exp <= now_unix_seconds {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("top-secret"), 24)
    }

    #[test]
    fn test_issue_and_verify_round_trip() -> Result<(), TokenError> {
        let service = service();
        let token = service.issue_at("admin", NOW)?;

        let claims = service.verify_at(&token, NOW)?;
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + 24 * 60 * 60);
        Ok(())
    }

    #[test]
    fn test_expiry_boundary() -> Result<(), TokenError> {
        let service = service();
        let token = service.issue_at("admin", NOW)?;
        let exp = NOW + 24 * 60 * 60;

        assert!(service.verify_at(&token, exp - 1).is_ok());
        assert_eq!(service.verify_at(&token, exp + 1), Err(TokenError::Expired));
        Ok(())
    }

    #[test]
    fn test_rejects_wrong_secret() -> Result<(), TokenError> {
        let token = service().issue_at("admin", NOW)?;

        let other = TokenService::new(&SecretString::from("other-secret"), 24);
        assert_eq!(other.verify_at(&token, NOW), Err(TokenError::Invalid));
        Ok(())
    }

    #[test]
    fn test_rejects_tampered_token() -> Result<(), TokenError> {
        let service = service();
        let token = service.issue_at("admin", NOW)?;

        let mut tampered = token.clone();
        tampered.truncate(token.len() - 2);
        assert_eq!(service.verify_at(&tampered, NOW), Err(TokenError::Invalid));
        Ok(())
    }

    #[test]
    fn test_rejects_garbage_input() {
        let service = service();
        assert_eq!(service.verify_at("", NOW), Err(TokenError::Invalid));
        assert_eq!(
            service.verify_at("not-a-jwt", NOW),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            service.verify_at("a.b.c.d", NOW),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_ttl_is_configurable() -> Result<(), TokenError> {
        let service = TokenService::new(&SecretString::from("top-secret"), 1);
        let token = service.issue_at("admin", NOW)?;

        assert!(service.verify_at(&token, NOW + 59 * 60).is_ok());
        assert_eq!(
            service.verify_at(&token, NOW + 61 * 60),
            Err(TokenError::Expired)
        );
        Ok(())
    }
}
