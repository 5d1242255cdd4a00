// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Validator
//!
//! Runs the validation pipeline for a compact JWT:
//!
//! ```text
//! split -> decode header -> decode payload -> check expiry
//!       -> resolve key -> verify signature -> valid | invalid
//! ```
//!
//! An expired token is rejected before key resolution, so it never causes
//! network I/O. [`TokenValidator::validate`] reports a single boolean; which
//! stage failed is only logged.

use tracing::Instrument;

use crate::error::{AuthError, AuthResult, Segment};
use crate::jwks::KeyResolver;
use crate::token::claims::RS256;
use crate::token::{decode_bytes, decode_segment, split_token, TokenHeader, TokenPayload};
use crate::verify::verify;

/// Header and payload of a token that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedToken {
    pub header: TokenHeader,
    pub payload: TokenPayload,
}

/// Validates compact JWTs against keys supplied by a [`KeyResolver`].
#[derive(Debug, Clone)]
pub struct TokenValidator<R> {
    resolver: R,
    span: tracing::Span,
}

impl<R: KeyResolver> TokenValidator<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            span: tracing::info_span!("token_validation"),
        }
    }

    /// Run every validation inside `span` instead of the default one.
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Validate `token`. Any failure is `false`.
    pub async fn validate(&self, token: &str) -> bool {
        self.validate_token(token).await.is_ok()
    }

    /// Validate `token` and return its decoded header and payload.
    ///
    /// Failures are logged here with their stage-specific error.
    pub async fn validate_token(&self, token: &str) -> AuthResult<ValidatedToken> {
        let result = self.run(token).instrument(self.span.clone()).await;

        self.span.in_scope(|| match &result {
            Ok(validated) => {
                tracing::info!(kid = %validated.header.kid, issuer = %validated.payload.iss, "Token is valid");
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "Token rejected");
            }
        });
        result
    }

    async fn run(&self, token: &str) -> AuthResult<ValidatedToken> {
        let parts = split_token(token)?;

        let header: TokenHeader = decode_segment(parts.header, Segment::Header)?;
        if header.alg != RS256 {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }
        tracing::debug!(kid = %header.kid, "Decoded token header");

        let payload: TokenPayload = decode_segment(parts.payload, Segment::Payload)?;
        check_expiry(&payload, chrono::Utc::now().timestamp())?;

        let signature = decode_bytes(parts.signature, Segment::Signature)?;
        let key = self.resolver.resolve_key(&header.kid, parts.payload).await?;

        if !verify(parts.signing_input().as_bytes(), &signature, &key)? {
            return Err(AuthError::InvalidSignature);
        }

        Ok(ValidatedToken { header, payload })
    }
}

/// Reject a payload whose `exp` is at or before `now`.
pub fn check_expiry(payload: &TokenPayload, now: i64) -> AuthResult<()> {
    if payload.is_expired_at(now) {
        Err(AuthError::TokenExpired {
            exp: payload.exp,
            now,
        })
    } else {
        Ok(())
    }
}
