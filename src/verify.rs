// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Signature Verifier
//!
//! RS256 verification: SHA-256 over the encoded `header.payload` bytes,
//! checked with RSA PKCS#1 v1.5 against a key rebuilt from the JWK's
//! `n` and `e`.
//!
//! Verification is fail-closed. A bad signature of any kind yields `false`;
//! only unusable key material is reported as an error.

use rsa::{BigUint, Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::{AuthError, AuthResult};
use crate::jwks::Jwk;

/// Width the exponent is left-padded to before integer conversion.
const EXPONENT_WIDTH: usize = 4;

/// Decode a JWK exponent from its unsigned big-endian bytes.
///
/// JWKS documents usually carry 3 bytes (`AQAB` = `[01, 00, 01]` = 65537).
/// The bytes are left-padded to 4 before conversion; leading zero bytes are
/// ignored, anything wider than 32 bits is rejected.
pub fn decode_exponent(bytes: &[u8]) -> AuthResult<u32> {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let significant = &bytes[first..];

    if bytes.is_empty() {
        return Err(AuthError::KeyFormat("exponent is empty".to_string()));
    }
    if significant.len() > EXPONENT_WIDTH {
        return Err(AuthError::KeyFormat(format!(
            "exponent has {} significant bytes, at most {EXPONENT_WIDTH} allowed",
            significant.len()
        )));
    }

    let mut padded = [0u8; EXPONENT_WIDTH];
    padded[EXPONENT_WIDTH - significant.len()..].copy_from_slice(significant);
    Ok(u32::from_be_bytes(padded))
}

/// Rebuild an RSA public key from a JWK's `n` and `e`.
pub fn public_key_from_jwk(jwk: &Jwk) -> AuthResult<RsaPublicKey> {
    if jwk.kty != "RSA" {
        return Err(AuthError::KeyFormat(format!("unsupported key type {:?}", jwk.kty)));
    }

    let n = jwk
        .n
        .as_deref()
        .ok_or_else(|| AuthError::KeyFormat("missing modulus `n`".to_string()))?;
    let e = jwk
        .e
        .as_deref()
        .ok_or_else(|| AuthError::KeyFormat("missing exponent `e`".to_string()))?;

    let modulus = decode_component(n, "n")?;
    let exponent = decode_exponent(&decode_component(e, "e")?)?;

    RsaPublicKey::new(BigUint::from_bytes_be(&modulus), BigUint::from(exponent))
        .map_err(|e| AuthError::KeyFormat(format!("invalid RSA key: {e}")))
}

/// Verify an RS256 signature over `signing_input` with `key`.
///
/// `signing_input` is the ASCII `header "." payload` exactly as it appears in
/// the token, not its decoded form.
pub fn verify(signing_input: &[u8], signature: &[u8], key: &Jwk) -> AuthResult<bool> {
    let public_key = public_key_from_jwk(key)?;
    let digest = Sha256::digest(signing_input);

    match public_key.verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature) {
        Ok(()) => Ok(true),
        Err(e) => {
            tracing::debug!(kid = ?key.kid, error = %e, "RSA signature verification failed");
            Ok(false)
        }
    }
}

fn decode_component(encoded: &str, name: &str) -> AuthResult<Vec<u8>> {
    use base64ct::{Base64UrlUnpadded, Encoding};

    Base64UrlUnpadded::decode_vec(encoded)
        .map_err(|e| AuthError::KeyFormat(format!("`{name}` is not base64url: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{jwk_for, sign, test_key};

    #[test]
    fn three_byte_exponent_is_65537() {
        assert_eq!(decode_exponent(&[0x01, 0x00, 0x01]).unwrap(), 65537);
    }

    #[test]
    fn short_and_padded_exponents() {
        assert_eq!(decode_exponent(&[0x03]).unwrap(), 3);
        assert_eq!(decode_exponent(&[0x00, 0x01, 0x00, 0x01]).unwrap(), 65537);
        assert_eq!(decode_exponent(&[0x00, 0x00, 0x01, 0x00, 0x01]).unwrap(), 65537);
        assert_eq!(decode_exponent(&[0xff, 0xff, 0xff, 0xff]).unwrap(), u32::MAX);
    }

    #[test]
    fn oversized_or_empty_exponent_is_rejected() {
        assert!(matches!(decode_exponent(&[]), Err(AuthError::KeyFormat(_))));
        assert!(matches!(
            decode_exponent(&[0x01, 0x00, 0x00, 0x00, 0x01]),
            Err(AuthError::KeyFormat(_))
        ));
    }

    #[test]
    fn exponent_errors_report_significant_length() {
        let err = decode_exponent(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid RSA key material: exponent is empty");

        // Two leading zeros do not count towards the width
        let err = decode_exponent(&[0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid RSA key material: exponent has 5 significant bytes, at most 4 allowed"
        );
    }

    #[test]
    fn valid_signature_verifies() {
        let jwk = jwk_for("k1");
        let input = b"eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiJ4In0";
        let signature = sign(input);
        assert!(verify(input, &signature, &jwk).unwrap());
    }

    #[test]
    fn signature_over_other_bytes_fails() {
        let jwk = jwk_for("k1");
        let signature = sign(b"header.payload");
        assert!(!verify(b"header.payloaD", &signature, &jwk).unwrap());
    }

    #[test]
    fn garbage_signature_fails_without_error() {
        let jwk = jwk_for("k1");
        assert!(!verify(b"header.payload", b"", &jwk).unwrap());
        assert!(!verify(b"header.payload", &[0u8; 256], &jwk).unwrap());
        assert!(!verify(b"header.payload", &[1u8; 7], &jwk).unwrap());
    }

    #[test]
    fn wrong_key_fails() {
        let mut jwk = jwk_for("k1");
        // Same modulus, e = 3
        jwk.e = Some("Aw".to_string());
        let signature = sign(b"header.payload");
        assert!(!verify(b"header.payload", &signature, &jwk).unwrap());
    }

    #[test]
    fn jwk_components_rebuild_the_signing_key() {
        assert_eq!(public_key_from_jwk(&jwk_for("k1")).unwrap(), test_key().to_public_key());
    }

    #[test]
    fn non_rsa_key_is_a_format_error() {
        let mut jwk = jwk_for("k1");
        jwk.kty = "EC".to_string();
        assert!(matches!(
            verify(b"a.b", b"sig", &jwk),
            Err(AuthError::KeyFormat(_))
        ));
    }

    #[test]
    fn missing_or_bad_components_are_format_errors() {
        let mut jwk = jwk_for("k1");
        jwk.n = None;
        assert!(matches!(public_key_from_jwk(&jwk), Err(AuthError::KeyFormat(_))));

        let mut jwk = jwk_for("k1");
        jwk.e = Some("!!".to_string());
        assert!(matches!(public_key_from_jwk(&jwk), Err(AuthError::KeyFormat(_))));

        let mut jwk = jwk_for("k1");
        jwk.e = Some("AQ".to_string()); // e = 1
        assert!(matches!(public_key_from_jwk(&jwk), Err(AuthError::KeyFormat(_))));
    }
}
