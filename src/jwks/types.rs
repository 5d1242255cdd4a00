// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS and OIDC discovery records.

use serde::{Deserialize, Serialize};

/// Suffix appended to an issuer URL to locate its discovery document.
pub const DISCOVERY_SUFFIX: &str = "/.well-known/openid-configuration";

/// OIDC discovery document. Only `jwks_uri` is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryDocument {
    pub jwks_uri: String,

    #[serde(default)]
    pub issuer: Option<String>,
}

/// JSON Web Key Set as published by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find the key with the given `kid`.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }
}

/// One public key descriptor.
///
/// RSA parameters are optional here so a set that also publishes EC keys
/// still parses; the verifier rejects keys without them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (expected `RSA`)
    pub kty: String,

    /// Key ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Key use (`sig`, `enc`)
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    /// RSA modulus (base64url, unsigned big-endian)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA exponent (base64url, unsigned big-endian)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    /// X.509 certificate chain (unused for verification)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5c: Option<Vec<String>>,

    /// X.509 thumbprint (unused for verification)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5t: Option<String>,
}
