// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed JWT header and payload records.

use std::collections::HashMap;

use serde::{de::Error as _, Deserialize, Deserializer};

/// Signing algorithm accepted by the token gate.
pub const RS256: &str = "RS256";

/// JWT header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenHeader {
    /// Key identifier used to look up the signing key
    pub kid: String,

    /// Signing algorithm (only `RS256` is accepted)
    pub alg: String,

    /// Token type, usually `JWT`
    #[serde(default)]
    pub typ: Option<String>,
}

/// JWT payload.
///
/// `exp` and `iss` are required. Any other claim is kept in [`extra`](Self::extra)
/// for callers that need it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenPayload {
    /// Expiration time (Unix seconds). Fractional values are truncated.
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,

    /// Issuer URL; OIDC discovery starts here
    pub iss: String,

    /// Subject
    #[serde(default)]
    pub sub: Option<String>,

    /// Username the identity provider asserts for this subject
    #[serde(default)]
    pub preferred_username: Option<String>,

    /// Remaining claims
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl TokenPayload {
    /// Check whether the token has expired at `now` (Unix seconds).
    ///
    /// A token whose `exp` equals `now` is already expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }

    /// Look up an arbitrary claim by name.
    pub fn claim(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }
}

fn numeric_date<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(D::Error::custom("exp must be a finite number"));
    }
    Ok(value.trunc() as i64)
}
