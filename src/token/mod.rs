// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Codec
//!
//! Splits a compact JWT into its three segments and decodes the header and
//! payload into typed records.
//!
//! Header and payload are decoded from base64url (no padding) and then from
//! JSON. Required fields are checked at decode time: a missing `kid`, `alg`,
//! `exp` or `iss` is an [`AuthError::InvalidField`](crate::AuthError::InvalidField),
//! distinct from malformed JSON.

pub mod claims;
pub mod codec;

pub use claims::{TokenHeader, TokenPayload};
pub use codec::{decode_bytes, decode_segment, split_token, CompactToken};
