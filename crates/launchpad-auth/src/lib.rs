//! Bearer token verification
//!
//! Only the token's shape is checked: a well-formed HS256 JWT with a valid
//! signature and an unexpired `exp` claim. Who the subject is and what it
//! may do is not this crate's concern.

#![allow(clippy::must_use_candidate)]

use chrono::{DateTime, Utc};
use jwt_compact::alg::{Hs256, Hs256Key};
use jwt_compact::prelude::*;
use launchpad_core::TokenError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Custom claims carried by Launchpad session tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject the token was issued to
    #[serde(rename = "sub")]
    pub subject: String,
    /// Team the subject acted on behalf of
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

/// A verified token, attached to the request for downstream handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Verifies (and, for tooling and tests, issues) HS256 session tokens
#[derive(Clone)]
pub struct TokenVerifier {
    key: Hs256Key,
    time: TimeOptions,
}

impl TokenVerifier {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: Hs256Key::new(secret.expose_secret().as_bytes()),
            time: TimeOptions::default(),
        }
    }

    /// Check signature and expiry of a compact JWT
    ///
    /// # Errors
    ///
    /// [`TokenError::Expired`] when `exp` is in the past, and
    /// [`TokenError::Malformed`] for every other defect (bad encoding, bad
    /// signature, missing `exp`)
    pub fn verify(&self, token: &str) -> Result<Session, TokenError> {
        let untrusted = UntrustedToken::new(token)?;
        let token: Token<SessionClaims> = Hs256.validator(&self.key).validate(&untrusted)?;
        let claims = token.claims().validate_expiration(&self.time)?;

        Ok(Session {
            subject: claims.custom.subject.clone(),
            team: claims.custom.team.clone(),
            expires_at: claims.expiration,
        })
    }

    /// Sign a token for `claims` valid for `ttl` from now
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be serialized
    pub fn issue(&self, claims: SessionClaims, ttl: chrono::Duration) -> anyhow::Result<String> {
        let claims = Claims::new(claims).set_duration_and_issuance(&self.time, ttl);
        Hs256
            .token(&Header::empty(), &claims, &self.key)
            .map_err(|e| anyhow::anyhow!("failed to sign token: {e}"))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value
///
/// The scheme is matched case-insensitively; an empty token is treated as absent.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
