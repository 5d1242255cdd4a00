// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared test infrastructure: an RSA signing key, token minting and a mock
//! OIDC identity provider.

#![allow(dead_code)]

use std::sync::OnceLock;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use oidc_jwt_auth::config::{Freshness, RetryPolicy};
use oidc_jwt_auth::jwks::{JwksFetcher, KeyCache, OidcKeyResolver};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const DISCOVERY_PATH: &str = "/realms/test/.well-known/openid-configuration";
pub const JWKS_PATH: &str = "/realms/test/protocol/openid-connect/certs";

/// Key the mock identity provider signs with.
pub fn signing_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(generate_key)
}

/// A second key the identity provider never publishes.
pub fn attacker_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(generate_key)
}

fn generate_key() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("Failed to generate RSA key")
}

/// JWK JSON for the public half of `key`.
pub fn jwk_json(key: &RsaPrivateKey, kid: &str) -> Value {
    let public = key.to_public_key();
    json!({
        "kid": kid,
        "kty": "RSA",
        "alg": "RS256",
        "use": "sig",
        "n": URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
        "e": URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
        "x5c": ["MIICmzCCAYMCBgGM"],
        "x5t": "q1LcZQ2kYbx5"
    })
}

/// Mint an RS256 token with `jsonwebtoken`.
pub fn mint_token(key: &RsaPrivateKey, kid: &str, claims: &Value) -> String {
    let pem = key
        .to_pkcs1_pem(LineEnding::LF)
        .expect("Failed to encode key as PEM");
    let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("Invalid RSA PEM");

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    encode(&header, claims, &encoding_key).expect("Failed to sign token")
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims for `username` from `issuer`, valid for an hour.
pub fn claims(issuer: &str, username: &str) -> Value {
    json!({
        "exp": now() + 3600,
        "iat": now(),
        "iss": issuer,
        "sub": "0b6b2c9e-6f55-4bb1-9d5f-2c4f0b7e9a11",
        "preferred_username": username,
        "email_verified": true
    })
}

/// Base64url payload segment carrying only an issuer.
pub fn payload_segment(issuer: &str) -> String {
    let payload = json!({"exp": now() + 3600, "iss": issuer});
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap())
}

/// Mock OIDC identity provider.
pub struct MockIdp {
    pub server: MockServer,
    pub issuer: String,
}

impl MockIdp {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let issuer = format!("{}/realms/test", server.uri());
        Self { server, issuer }
    }

    pub fn jwks_uri(&self) -> String {
        format!("{}{}", self.server.uri(), JWKS_PATH)
    }

    /// Serve the discovery document, expecting exactly `calls` requests.
    pub async fn mount_discovery(&self, calls: u64) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issuer": self.issuer,
                "jwks_uri": self.jwks_uri(),
                "authorization_endpoint": format!("{}/protocol/openid-connect/auth", self.issuer),
                "id_token_signing_alg_values_supported": ["RS256"]
            })))
            .expect(calls)
            .named("discovery")
            .mount(&self.server)
            .await;
    }

    /// Serve `keys` as the JWKS document, expecting exactly `calls` requests.
    pub async fn mount_jwks(&self, keys: Vec<Value>, calls: u64) -> String {
        let body = json!({ "keys": keys }).to_string();
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
            .expect(calls)
            .named("jwks")
            .mount(&self.server)
            .await;
        body
    }
}

/// Resolver over a fresh cache directory, allowing plain HTTP for the mock.
pub fn resolver(cache_dir: &TempDir) -> OidcKeyResolver {
    resolver_with(cache_dir, Freshness::Forever)
}

pub fn resolver_with(cache_dir: &TempDir, freshness: Freshness) -> OidcKeyResolver {
    let cache = KeyCache::new(cache_dir.path().join("jwt-auth"), freshness);
    let fetcher = JwksFetcher::new(Duration::from_secs(2), RetryPolicy::default(), false)
        .expect("Failed to build fetcher");
    OidcKeyResolver::new(cache, fetcher)
}

pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}
