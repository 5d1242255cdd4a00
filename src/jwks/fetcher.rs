// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OIDC discovery and JWKS fetching.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::config::RetryPolicy;
use crate::error::{AuthError, AuthResult, Segment};
use crate::token::codec::parse_json;

use super::types::{DiscoveryDocument, JwkSet, DISCOVERY_SUFFIX};

/// A fetched key set together with the exact bytes it was parsed from.
#[derive(Debug, Clone)]
pub struct FetchedKeySet {
    pub keys: JwkSet,
    pub body: Vec<u8>,
}

/// Outcome of a single failed request.
enum Attempt {
    /// Connection failure, timeout or 5xx; may be retried.
    Transient(AuthError),
    /// Anything a retry will not fix.
    Permanent(AuthError),
}

/// HTTP client for the identity provider's discovery and JWKS endpoints.
#[derive(Debug, Clone)]
pub struct JwksFetcher {
    client: Client,
    retry: RetryPolicy,
    require_https: bool,
}

impl JwksFetcher {
    /// Create a fetcher whose requests each time out after `timeout`.
    pub fn new(timeout: Duration, retry: RetryPolicy, require_https: bool) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            retry,
            require_https,
        })
    }

    /// Discovery document URL for an issuer.
    pub fn discovery_url(&self, issuer: &str) -> AuthResult<Url> {
        let raw = format!("{}{}", issuer.trim_end_matches('/'), DISCOVERY_SUFFIX);
        self.checked_url(&raw)
    }

    /// Fetch the issuer's discovery document and return its `jwks_uri`.
    pub async fn discover_jwks_uri(&self, issuer: &str) -> AuthResult<Url> {
        let url = self.discovery_url(issuer)?;
        tracing::debug!(url = %url, "Fetching OIDC discovery document");

        let body = self.get(&url).await?;
        let document: DiscoveryDocument = parse_json(&body, Segment::Discovery)?;
        self.checked_url(&document.jwks_uri)
    }

    /// Fetch and parse a JWKS document.
    pub async fn fetch_key_set(&self, jwks_uri: &Url) -> AuthResult<FetchedKeySet> {
        tracing::debug!(url = %jwks_uri, "Fetching JWKS");

        let body = self.get(jwks_uri).await?;
        let keys: JwkSet = parse_json(&body, Segment::KeySet)?;
        Ok(FetchedKeySet { keys, body })
    }

    fn checked_url(&self, raw: &str) -> AuthResult<Url> {
        let url = Url::parse(raw).map_err(|e| AuthError::InsecureUrl(format!("{raw}: {e}")))?;
        match url.scheme() {
            "https" => Ok(url),
            "http" if !self.require_https => Ok(url),
            _ => Err(AuthError::InsecureUrl(raw.to_string())),
        }
    }

    /// GET `url`, retrying transient failures per the retry policy.
    async fn get(&self, url: &Url) -> AuthResult<Vec<u8>> {
        let mut attempt = 0;
        loop {
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(Attempt::Transient(e)) if attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        url = %url,
                        error = %e,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(Attempt::Transient(e)) | Err(Attempt::Permanent(e)) => return Err(e),
            }
        }
    }

    async fn get_once(&self, url: &Url) -> Result<Vec<u8>, Attempt> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Attempt::Transient(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let err = AuthError::Network(format!("HTTP {status} from {url}"));
            return Err(if status.is_server_error() {
                Attempt::Transient(err)
            } else {
                Attempt::Permanent(err)
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Attempt::Transient(e.into()))?;
        Ok(body.to_vec())
    }
}
