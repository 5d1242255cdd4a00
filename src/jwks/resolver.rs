// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing key resolution: disk cache first, then OIDC discovery and JWKS fetch.

use std::future::Future;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult, Segment};
use crate::token::{decode_segment, TokenPayload};

use super::cache::{validate_key_id, KeyCache};
use super::fetcher::JwksFetcher;
use super::types::Jwk;

/// Resolves the public key a token was signed with.
pub trait KeyResolver: Send + Sync {
    /// Return the key whose `kid` equals `key_id`.
    ///
    /// `payload_encoded` is the token's still-encoded payload segment; resolvers
    /// that need the issuer decode it themselves.
    fn resolve_key(
        &self,
        key_id: &str,
        payload_encoded: &str,
    ) -> impl Future<Output = AuthResult<Jwk>> + Send;
}

/// Key resolver backed by [`KeyCache`] and [`JwksFetcher`].
#[derive(Debug, Clone)]
pub struct OidcKeyResolver {
    cache: KeyCache,
    fetcher: JwksFetcher,
    trusted_issuers: Vec<String>,
    refetch_on_missing_kid: bool,
}

impl OidcKeyResolver {
    pub fn new(cache: KeyCache, fetcher: JwksFetcher) -> Self {
        Self {
            cache,
            fetcher,
            trusted_issuers: Vec::new(),
            refetch_on_missing_kid: false,
        }
    }

    /// Build a resolver from configuration.
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let cache = KeyCache::new(&config.cache_dir, config.freshness);
        let fetcher = JwksFetcher::new(config.http_timeout, config.retry, config.require_https)?;

        if config.trusted_issuers.is_empty() {
            tracing::warn!("No trusted issuers configured; keys will be discovered from any issuer");
        }

        Ok(Self::new(cache, fetcher)
            .with_trusted_issuers(config.trusted_issuers.clone())
            .with_refetch_on_missing_kid(config.refetch_on_missing_kid))
    }

    /// Only discover keys for these issuers. Empty allows any issuer.
    pub fn with_trusted_issuers(mut self, issuers: Vec<String>) -> Self {
        self.trusted_issuers = issuers;
        self
    }

    /// Re-fetch when a cached set does not contain the requested kid.
    pub fn with_refetch_on_missing_kid(mut self, enabled: bool) -> Self {
        self.refetch_on_missing_kid = enabled;
        self
    }

    pub fn cache(&self) -> &KeyCache {
        &self.cache
    }

    /// Drop the cached set for `key_id` so the next lookup fetches it again.
    pub fn invalidate(&self, key_id: &str) -> AuthResult<bool> {
        self.cache.invalidate(key_id)
    }

    fn check_issuer(&self, issuer: &str) -> AuthResult<()> {
        if self.trusted_issuers.is_empty() {
            return Ok(());
        }
        let normalized = issuer.trim_end_matches('/');
        if self
            .trusted_issuers
            .iter()
            .any(|t| t.trim_end_matches('/') == normalized)
        {
            Ok(())
        } else {
            Err(AuthError::UntrustedIssuer(issuer.to_string()))
        }
    }

    async fn fetch_and_cache(&self, key_id: &str, payload_encoded: &str) -> AuthResult<Jwk> {
        let payload: TokenPayload = decode_segment(payload_encoded, Segment::Payload)?;
        self.check_issuer(&payload.iss)?;

        let jwks_uri = self.fetcher.discover_jwks_uri(&payload.iss).await?;
        let fetched = self.fetcher.fetch_key_set(&jwks_uri).await?;

        let Some(key) = fetched.keys.find(key_id).cloned() else {
            tracing::warn!(
                kid = %key_id,
                issuer = %payload.iss,
                available = fetched.keys.keys.len(),
                "Fetched key set does not contain kid"
            );
            return Err(AuthError::KeyNotFound(key_id.to_string()));
        };

        self.cache.store(key_id, &fetched.body)?;
        Ok(key)
    }
}

impl KeyResolver for OidcKeyResolver {
    async fn resolve_key(&self, key_id: &str, payload_encoded: &str) -> AuthResult<Jwk> {
        validate_key_id(key_id)?;

        if let Some(cached) = self.cache.load(key_id)? {
            if let Some(key) = cached.find(key_id) {
                tracing::debug!(kid = %key_id, "Key resolved from cache");
                return Ok(key.clone());
            }
            if !self.refetch_on_missing_kid {
                return Err(AuthError::KeyNotFound(key_id.to_string()));
            }
            tracing::info!(kid = %key_id, "Cached key set lacks kid, re-fetching");
        }

        tracing::info!(kid = %key_id, "Key not cached, starting OIDC discovery");
        self.fetch_and_cache(key_id, payload_encoded).await
    }
}
