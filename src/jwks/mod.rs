// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key Resolver
//!
//! Finds the RSA public key a token was signed with.
//!
//! ## Resolution Flow
//!
//! 1. Look up `{cache_dir}/{kid}`; on a fresh hit, return the matching key
//! 2. On a miss, decode `iss` from the payload and fetch
//!    `{iss}/.well-known/openid-configuration`
//! 3. Fetch the document at its `jwks_uri`
//! 4. If the set contains `kid`, cache the raw body under `kid` and return the key
//!
//! ## Security
//!
//! - Every request is bounded by the configured timeout (2 seconds by default)
//! - No retries unless a retry policy is configured
//! - Only `https` URLs are followed unless `require_https` is cleared
//! - An issuer allowlist can restrict which providers are contacted
//! - Concurrent misses for the same kid are not deduplicated; each writes the
//!   same content through an atomic rename

pub mod cache;
pub mod fetcher;
pub mod resolver;
pub mod types;

pub use cache::KeyCache;
pub use fetcher::{FetchedKeySet, JwksFetcher};
pub use resolver::{KeyResolver, OidcKeyResolver};
pub use types::{DiscoveryDocument, Jwk, JwkSet};
