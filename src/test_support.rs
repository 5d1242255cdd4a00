// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests: one RSA key pair per test binary and
//! helpers to mint tokens with it.

use std::sync::OnceLock;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::jwks::Jwk;

pub const TEST_ISSUER: &str = "https://idp.example.com/realms/main";

pub fn test_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("Failed to generate RSA key")
    })
}

/// JWK for the test key, published under `kid`.
pub fn jwk_for(kid: &str) -> Jwk {
    let public = test_key().to_public_key();
    Jwk {
        kty: "RSA".to_string(),
        kid: Some(kid.to_string()),
        alg: Some("RS256".to_string()),
        key_use: Some("sig".to_string()),
        n: Some(URL_SAFE_NO_PAD.encode(public.n().to_bytes_be())),
        e: Some(URL_SAFE_NO_PAD.encode(public.e().to_bytes_be())),
        x5c: None,
        x5t: None,
    }
}

/// RS256 signature over `input` with the test key.
pub fn sign(input: &[u8]) -> Vec<u8> {
    let digest = Sha256::digest(input);
    test_key()
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .expect("Failed to sign")
}

pub fn encode_json(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
}

/// Compact token signed with the test key.
pub fn signed_token(header: &Value, payload: &Value) -> String {
    let signing_input = format!("{}.{}", encode_json(header), encode_json(payload));
    let signature = sign(signing_input.as_bytes());
    format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Standard claims expiring an hour from now.
pub fn claims(username: &str) -> Value {
    json!({
        "exp": now() + 3600,
        "iat": now(),
        "iss": TEST_ISSUER,
        "sub": "f1c2d3e4",
        "preferred_username": username,
    })
}

pub fn header(kid: &str) -> Value {
    json!({"alg": "RS256", "typ": "JWT", "kid": kid})
}
