// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-disk JWKS cache.
//!
//! ## Layout
//!
//! ```text
//! {cache_dir}/
//!   {kid}      # raw JWKS response body that contained {kid}
//! ```
//!
//! Entries are keyed by the key identifier that was requested, never by the
//! first key in the fetched set. Writes go to a sibling temp file that is
//! renamed into place, so readers see either the old entry or the new one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::Freshness;
use crate::error::{AuthError, AuthResult, Segment};
use crate::token::codec::parse_json;

use super::types::JwkSet;

/// Disk-backed key set cache with a freshness policy.
#[derive(Debug, Clone)]
pub struct KeyCache {
    dir: PathBuf,
    freshness: Freshness,
}

impl KeyCache {
    pub fn new(dir: impl AsRef<Path>, freshness: Freshness) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            freshness,
        }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cache entry for `kid`.
    pub fn path_for(&self, kid: &str) -> AuthResult<PathBuf> {
        validate_key_id(kid)?;
        Ok(self.dir.join(kid))
    }

    /// Load the cached key set for `kid`.
    ///
    /// Returns `Ok(None)` when there is no entry, when the entry is older than
    /// the freshness policy allows, or when the entry cannot be parsed (it is
    /// then replaced by the next fetch).
    pub fn load(&self, kid: &str) -> AuthResult<Option<JwkSet>> {
        let path = self.path_for(kid)?;

        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(kid = %kid, "Cached key set not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if let Freshness::MaxAge(max_age) = self.freshness {
            let age = metadata
                .modified()?
                .elapsed()
                .unwrap_or_default();
            if age > max_age {
                tracing::debug!(kid = %kid, age_secs = age.as_secs(), "Cached key set is stale");
                return Ok(None);
            }
        }

        let body = fs::read(&path)?;
        match parse_json::<JwkSet>(&body, Segment::KeySet) {
            Ok(set) => Ok(Some(set)),
            Err(e) => {
                tracing::warn!(kid = %kid, error = %e, "Ignoring unreadable cached key set");
                Ok(None)
            }
        }
    }

    /// Persist a raw JWKS body under `kid`, replacing any existing entry.
    pub fn store(&self, kid: &str, body: &[u8]) -> AuthResult<PathBuf> {
        let path = self.path_for(kid)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = self.dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(body)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &path));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(AuthError::Cache(format!(
                "failed to write {}: {e}",
                path.display()
            )));
        }

        tracing::debug!(kid = %kid, path = %path.display(), "Cached key set");
        Ok(path)
    }

    /// Remove the entry for `kid`. Returns whether an entry existed.
    pub fn invalidate(&self, kid: &str) -> AuthResult<bool> {
        let path = self.path_for(kid)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Modification time of the entry for `kid`, if present.
    pub fn stored_at(&self, kid: &str) -> AuthResult<Option<SystemTime>> {
        let path = self.path_for(kid)?;
        match fs::metadata(&path) {
            Ok(m) => Ok(Some(m.modified()?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Longest key identifier accepted as a file name.
pub const MAX_KEY_ID_LEN: usize = 200;

/// Reject key identifiers that cannot be used verbatim as a file name.
///
/// Providers publish all sorts of identifiers (Cognito uses standard base64
/// with `+` and `=`), so only what would escape the cache directory or break
/// the file system is refused: empty, `.`, `..`, path separators, control
/// characters and identifiers longer than [`MAX_KEY_ID_LEN`] bytes.
pub fn validate_key_id(kid: &str) -> AuthResult<()> {
    let safe = !kid.is_empty()
        && kid != "."
        && kid != ".."
        && kid.len() <= MAX_KEY_ID_LEN
        && !kid
            .chars()
            .any(|c| matches!(c, '/' | '\\') || c.is_control());

    if safe {
        Ok(())
    } else {
        Err(AuthError::InvalidKeyId(kid.to_string()))
    }
}
