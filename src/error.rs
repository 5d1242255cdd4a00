// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Every stage of token validation produces a distinguishable [`AuthError`]
//! for logging. The validator collapses all of them into a single `false`
//! at the decision boundary, so none of this detail reaches the caller of
//! [`crate::TokenValidator::validate`].

use std::fmt;
use std::io;

/// Which document a decode or parse failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// JWT header segment
    Header,
    /// JWT payload segment
    Payload,
    /// JWT signature segment
    Signature,
    /// OIDC discovery document
    Discovery,
    /// JWKS document (fetched or cached)
    KeySet,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Header => "header",
            Segment::Payload => "payload",
            Segment::Signature => "signature",
            Segment::Discovery => "discovery document",
            Segment::KeySet => "key set",
        };
        f.write_str(name)
    }
}

/// Authentication error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token is malformed: {0}")]
    MalformedToken(String),

    #[error("Failed to base64url-decode {segment}: {reason}")]
    Decode { segment: Segment, reason: String },

    #[error("Invalid JSON in {segment}: {reason}")]
    Parse { segment: Segment, reason: String },

    #[error("Missing or mistyped field in {segment}: {reason}")]
    InvalidField { segment: Segment, reason: String },

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token expired at {exp} (now {now})")]
    TokenExpired { exp: i64, now: i64 },

    #[error("Issuer is not trusted: {0}")]
    UntrustedIssuer(String),

    #[error("URL is not allowed: {0}")]
    InsecureUrl(String),

    #[error("Key identifier cannot be used: {0:?}")]
    InvalidKeyId(String),

    #[error("No matching key found for kid {0:?}")]
    KeyNotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Key cache error: {0}")]
    Cache(String),

    #[error("Invalid RSA key material: {0}")]
    KeyFormat(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Authentication record is invalid: {0}")]
    InvalidRecord(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedToken(_) => "malformed_token",
            AuthError::Decode { .. } => "decode_error",
            AuthError::Parse { .. } => "parse_error",
            AuthError::InvalidField { .. } => "invalid_field",
            AuthError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            AuthError::TokenExpired { .. } => "token_expired",
            AuthError::UntrustedIssuer(_) => "untrusted_issuer",
            AuthError::InsecureUrl(_) => "insecure_url",
            AuthError::InvalidKeyId(_) => "invalid_key_id",
            AuthError::KeyNotFound(_) => "key_not_found",
            AuthError::Network(_) => "network_error",
            AuthError::Cache(_) => "cache_error",
            AuthError::KeyFormat(_) => "key_format_error",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::InvalidRecord(_) => "invalid_record",
        }
    }
}

impl From<io::Error> for AuthError {
    fn from(e: io::Error) -> Self {
        AuthError::Cache(e.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AuthError::Network(format!("request timed out: {e}"))
        } else {
            AuthError::Network(e.to_string())
        }
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
