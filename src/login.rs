// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login gate: a valid token is not enough, it must also belong to the user
//! who is logging in.
//!
//! Login attempts arrive as a single authentication record:
//!
//! ```xml
//! <AUTHN><USERNAME>alice</USERNAME><PASSWORD/><SECRET>eyJ...</SECRET></AUTHN>
//! ```
//!
//! `SECRET` carries the compact JWT. `PASSWORD` is ignored.

use serde::Deserialize;

use crate::error::{AuthError, AuthResult};
use crate::jwks::KeyResolver;
use crate::validator::TokenValidator;

/// Wire shape of the authentication record.
#[derive(Deserialize)]
#[serde(rename = "AUTHN")]
struct AuthnRecord {
    #[serde(rename = "USERNAME")]
    username: String,
    #[serde(rename = "SECRET")]
    secret: String,
}

/// Credentials presented by a login attempt.
#[derive(Clone)]
pub struct LoginRequest {
    /// Username the client claims to be
    pub username: String,
    /// Raw compact JWT
    pub token: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    /// Parse an `<AUTHN>` record into a login request.
    ///
    /// The token is taken from `SECRET` with surrounding whitespace removed.
    /// An empty `USERNAME` or `SECRET` is rejected.
    pub fn from_authn_xml(record: &str) -> AuthResult<Self> {
        let parsed: AuthnRecord = quick_xml::de::from_str(record.trim())
            .map_err(|e| AuthError::InvalidRecord(e.to_string()))?;

        if parsed.username.is_empty() {
            return Err(AuthError::InvalidRecord("USERNAME is empty".to_string()));
        }

        let token = parsed.secret.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidRecord("SECRET is empty".to_string()));
        }

        Ok(Self::new(parsed.username, token))
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Accept the login only if the token validates and its `preferred_username`
/// equals the claimed username.
pub async fn authenticate_login<R: KeyResolver>(
    validator: &TokenValidator<R>,
    request: &LoginRequest,
) -> bool {
    let validated = match validator.validate_token(&request.token).await {
        Ok(v) => v,
        Err(_) => return false,
    };

    match validated.payload.preferred_username.as_deref() {
        Some(name) if name == request.username => {
            tracing::info!(username = %request.username, "Login accepted");
            true
        }
        Some(name) => {
            tracing::warn!(
                claimed = %request.username,
                token_username = %name,
                "Username does not match token"
            );
            false
        }
        None => {
            tracing::warn!(claimed = %request.username, "Token has no preferred_username claim");
            false
        }
    }
}
