// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Compact JWT splitting and segment decoding.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::de::DeserializeOwned;

use crate::error::{AuthError, AuthResult, Segment};

/// The three base64url segments of a compact JWT, borrowed from the token string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactToken<'a> {
    pub header: &'a str,
    pub payload: &'a str,
    pub signature: &'a str,
}

impl CompactToken<'_> {
    /// The signed portion of the token: `header "." payload`, still encoded.
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }
}

/// Split a compact token on `.`.
///
/// Exactly three non-empty segments are required.
pub fn split_token(token: &str) -> AuthResult<CompactToken<'_>> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None)
            if !header.is_empty() && !payload.is_empty() && !signature.is_empty() =>
        {
            Ok(CompactToken {
                header,
                payload,
                signature,
            })
        }
        _ => Err(AuthError::MalformedToken(format!(
            "expected 3 non-empty segments, found {}",
            token.split('.').count()
        ))),
    }
}

/// Decode a base64url (unpadded) segment into raw bytes.
pub fn decode_bytes(encoded: &str, segment: Segment) -> AuthResult<Vec<u8>> {
    Base64UrlUnpadded::decode_vec(encoded).map_err(|e| AuthError::Decode {
        segment,
        reason: e.to_string(),
    })
}

/// Decode a base64url segment and deserialize its JSON into `T`.
pub fn decode_segment<T: DeserializeOwned>(encoded: &str, segment: Segment) -> AuthResult<T> {
    let bytes = decode_bytes(encoded, segment)?;
    parse_json(&bytes, segment)
}

/// Deserialize JSON, separating syntax errors from missing or mistyped fields.
pub(crate) fn parse_json<T: DeserializeOwned>(bytes: &[u8], segment: Segment) -> AuthResult<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        let reason = e.to_string();
        match e.classify() {
            serde_json::error::Category::Data => AuthError::InvalidField { segment, reason },
            _ => AuthError::Parse { segment, reason },
        }
    })
}
