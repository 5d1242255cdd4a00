// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OIDC JWT Auth - bearer token gate for login flows
//!
//! Validates RS256 JSON Web Tokens issued by an OpenID-Connect identity
//! provider. Signing keys are found through OIDC discovery, fetched from the
//! provider's JWKS endpoint and cached on disk by key identifier.
//!
//! ## Modules
//!
//! - `token` - Compact JWT splitting and header/payload decoding
//! - `jwks` - Key resolution (disk cache, OIDC discovery, JWKS fetch)
//! - `verify` - RSA PKCS#1 v1.5 / SHA-256 signature verification
//! - `validator` - The validation pipeline, fail-closed to a boolean
//! - `login` - Username check against the token's `preferred_username`
//! - `config` - Environment configuration
//! - `logging` - Subscriber setup for the binary

pub mod config;
pub mod error;
pub mod jwks;
pub mod logging;
pub mod login;
pub mod token;
pub mod validator;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use jwks::{KeyResolver, OidcKeyResolver};
pub use login::{authenticate_login, LoginRequest};
pub use validator::{TokenValidator, ValidatedToken};
