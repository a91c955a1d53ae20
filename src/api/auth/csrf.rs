//! Double-submit-cookie CSRF protection.
//!
//! A `GET /api/csrf-token` request mints a random secret, sets it as the
//! `XSRF-TOKEN` cookie and returns an HMAC-SHA256 of that secret as the token
//! the client must echo back in the `CSRF-Token` header. A mutating request
//! is accepted only when the presented token was derived from the secret in
//! the request's own cookie.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{digest::InvalidLength, Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const CSRF_COOKIE_NAME: &str = "XSRF-TOKEN";
pub const CSRF_HEADER_NAME: &str = "csrf-token";

const SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CsrfError {
    #[error("missing csrf cookie")]
    MissingCookie,
    #[error("missing csrf token header")]
    MissingToken,
    #[error("csrf token mismatch")]
    Mismatch,
}

#[derive(Clone)]
pub struct CsrfGuard {
    mac: HmacSha256,
    cookie_secure: bool,
}

impl CsrfGuard {
    /// # Errors
    /// Returns an error if the signing key cannot be used for HMAC.
    pub fn new(secret: &SecretString, cookie_secure: bool) -> Result<Self, InvalidLength> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())?;
        Ok(Self { mac, cookie_secure })
    }

    /// Mint a fresh cookie/token pair. The cookie carries the secret, the
    /// returned token is derived from it.
    ///
    /// # Errors
    /// Returns an error if the cookie string is not a valid header value.
    pub fn mint(&self) -> Result<(HeaderValue, String), InvalidHeaderValue> {
        let mut secret = [0u8; SECRET_LEN];
        rand::rngs::OsRng.fill_bytes(&mut secret);
        let cookie_value = Base64UrlUnpadded::encode_string(&secret);

        let token = self.derive(&cookie_value);
        let cookie = self.cookie(&cookie_value)?;

        Ok((cookie, token))
    }

    /// Check a mutating request: the `CSRF-Token` header must match the value
    /// derivable from the request's own `XSRF-TOKEN` cookie.
    ///
    /// # Errors
    /// Returns a distinct error kind for a missing cookie, a missing header,
    /// or a mismatched token; all surface to the client as 403.
    pub fn check(&self, headers: &HeaderMap) -> Result<(), CsrfError> {
        let cookie_value =
            cookie_value(headers, CSRF_COOKIE_NAME).ok_or(CsrfError::MissingCookie)?;

        let presented = headers
            .get(CSRF_HEADER_NAME)
            .and_then(|value| value.to_str().ok())
            .ok_or(CsrfError::MissingToken)?;

        let presented_mac =
            Base64UrlUnpadded::decode_vec(presented).map_err(|_| CsrfError::Mismatch)?;

        let mut mac = self.mac.clone();
        mac.update(cookie_value.as_bytes());
        // verify_slice compares in constant time
        mac.verify_slice(&presented_mac)
            .map_err(|_| CsrfError::Mismatch)
    }

    fn derive(&self, cookie_value: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(cookie_value.as_bytes());
        Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes())
    }

    // Deliberately not HttpOnly: the double-submit pattern needs the SPA to
    // be able to read its own cookie.
    fn cookie(&self, cookie_value: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{CSRF_COOKIE_NAME}={cookie_value}; Path=/; SameSite=Lax");
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let Some((key, val)) = trimmed.split_once('=') else {
            continue;
        };
        if key.trim() == name {
            return Some(val.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn guard() -> CsrfGuard {
        CsrfGuard::new(&SecretString::from("top-secret"), false).expect("guard")
    }

    fn headers(cookie: Option<&HeaderValue>, token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            // Replay the Set-Cookie value as the request Cookie header, the
            // attribute list after the first ';' is ignored by the parser.
            headers.insert(COOKIE, cookie.clone());
        }
        if let Some(token) = token {
            headers.insert(CSRF_HEADER_NAME, HeaderValue::from_str(token)?);
        }
        Ok(headers)
    }

    #[test]
    fn test_mint_sets_cookie_attributes() -> Result<()> {
        let (cookie, token) = guard().mint()?;
        let cookie = cookie.to_str()?;

        assert!(cookie.starts_with("XSRF-TOKEN="));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));
        assert!(!cookie.contains("HttpOnly"));
        assert!(!token.is_empty());
        Ok(())
    }

    #[test]
    fn test_mint_secure_in_production() -> Result<()> {
        let guard = CsrfGuard::new(&SecretString::from("top-secret"), true)?;
        let (cookie, _token) = guard.mint()?;
        assert!(cookie.to_str()?.contains("; Secure"));
        Ok(())
    }

    #[test]
    fn test_check_accepts_matching_pair() -> Result<()> {
        let guard = guard();
        let (cookie, token) = guard.mint()?;

        let headers = headers(Some(&cookie), Some(&token))?;
        assert_eq!(guard.check(&headers), Ok(()));
        Ok(())
    }

    #[test]
    fn test_check_rejects_token_from_other_cookie() -> Result<()> {
        let guard = guard();
        let (cookie_a, _token_a) = guard.mint()?;
        let (_cookie_b, token_b) = guard.mint()?;

        let headers = headers(Some(&cookie_a), Some(&token_b))?;
        assert_eq!(guard.check(&headers), Err(CsrfError::Mismatch));
        Ok(())
    }

    #[test]
    fn test_check_rejects_missing_cookie() -> Result<()> {
        let guard = guard();
        let (_cookie, token) = guard.mint()?;

        let headers = headers(None, Some(&token))?;
        assert_eq!(guard.check(&headers), Err(CsrfError::MissingCookie));
        Ok(())
    }

    #[test]
    fn test_check_rejects_missing_header() -> Result<()> {
        let guard = guard();
        let (cookie, _token) = guard.mint()?;

        let headers = headers(Some(&cookie), None)?;
        assert_eq!(guard.check(&headers), Err(CsrfError::MissingToken));
        Ok(())
    }

    #[test]
    fn test_check_rejects_garbage_token() -> Result<()> {
        let guard = guard();
        let (cookie, _token) = guard.mint()?;

        let headers = headers(Some(&cookie), Some("!!not-base64!!"))?;
        assert_eq!(guard.check(&headers), Err(CsrfError::Mismatch));
        Ok(())
    }

    #[test]
    fn test_tokens_differ_across_mints() -> Result<()> {
        let guard = guard();
        let (_c1, token_1) = guard.mint()?;
        let (_c2, token_2) = guard.mint()?;
        assert_ne!(token_1, token_2);
        Ok(())
    }

    #[test]
    fn test_cookie_value_parses_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("session=abc; XSRF-TOKEN=xyz; theme=dark"),
        );
        assert_eq!(
            cookie_value(&headers, "XSRF-TOKEN"),
            Some("xyz".to_string())
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
