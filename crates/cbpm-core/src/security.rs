//! # Security Module
//!
//! Password key derivation, credential verification and session tokens.
//!
//! ## Credential Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  users.salt           64 hex chars  (32 random bytes)                   │
//! │  users.password_hash  64 hex chars  (32-byte derived key)               │
//! │                                                                         │
//! │  derive(password, salt):                                                │
//! │    PBKDF2-HMAC-SHA256(password_utf8, salt_hex_utf8, 100_000) → 32 B    │
//! │                                                                         │
//! │  The KDF salt is the UTF-8 text of the hex salt, not the decoded       │
//! │  bytes. Rows written before this crate existed use the same layout     │
//! │  and keep verifying.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Argon2id can be selected instead through `security.kdf` in the config. The
//! choice is per installation: a stored `(hash, salt)` pair does not record
//! which scheme produced it.

use argon2::Argon2;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{SecurityError, SecurityResult, ValidationError};

/// Iteration floor for PBKDF2.
pub const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

const SALT_BYTES: usize = 32;
const HASH_BYTES: usize = 32;
const SESSION_TOKEN_LENGTH: usize = 64;
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// =============================================================================
// Algorithm Selection
// =============================================================================

/// Key derivation scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum KdfAlgorithm {
    /// PBKDF2-HMAC-SHA256, iterated.
    #[default]
    Pbkdf2Sha256,
    /// Argon2id with the crate's default cost parameters.
    Argon2id,
}

impl fmt::Display for KdfAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KdfAlgorithm::Pbkdf2Sha256 => write!(f, "pbkdf2_sha256"),
            KdfAlgorithm::Argon2id => write!(f, "argon2id"),
        }
    }
}

impl FromStr for KdfAlgorithm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pbkdf2_sha256" | "pbkdf2" => Ok(KdfAlgorithm::Pbkdf2Sha256),
            "argon2id" | "argon2" => Ok(KdfAlgorithm::Argon2id),
            _ => Err(ValidationError::NotAllowed {
                field: "kdf".to_string(),
                allowed: vec!["pbkdf2_sha256".to_string(), "argon2id".to_string()],
            }),
        }
    }
}

// =============================================================================
// Credential
// =============================================================================

/// A derived password hash and the salt it was derived with, both hex.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Credential {
    pub hash: String,
    pub salt: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("hash", &"<redacted>")
            .field("salt", &self.salt)
            .finish()
    }
}

/// Outcome of [`CredentialHasher::verify_detailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The password matches. `needs_rehash` is set for legacy unsalted rows.
    Valid { needs_rehash: bool },
    Invalid,
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid { .. })
    }
}

/// A password that must not end up in logs.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    /// The plaintext. Keep the borrow short.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

// =============================================================================
// Hasher
// =============================================================================

/// Derives and verifies password credentials.
///
/// ## Example
/// ```rust
/// use cbpm_core::security::CredentialHasher;
///
/// let hasher = CredentialHasher::default();
/// let credential = hasher.derive("Ciment@2025", None).unwrap();
///
/// assert!(hasher.verify("Ciment@2025", &credential.hash, &credential.salt));
/// assert!(!hasher.verify("ciment@2025", &credential.hash, &credential.salt));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialHasher {
    algorithm: KdfAlgorithm,
    iterations: u32,
}

impl CredentialHasher {
    /// Creates a hasher, rejecting PBKDF2 iteration counts below the floor.
    ///
    /// `iterations` is ignored for Argon2id.
    pub fn new(algorithm: KdfAlgorithm, iterations: u32) -> SecurityResult<Self> {
        if algorithm == KdfAlgorithm::Pbkdf2Sha256 && iterations < MIN_PBKDF2_ITERATIONS {
            return Err(SecurityError::IterationsTooLow {
                configured: iterations,
                minimum: MIN_PBKDF2_ITERATIONS,
            });
        }

        Ok(CredentialHasher {
            algorithm,
            iterations,
        })
    }

    pub fn algorithm(&self) -> KdfAlgorithm {
        self.algorithm
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Derives a credential for `password`.
    ///
    /// A fresh random salt is generated when `salt` is `None`. An explicitly
    /// supplied empty salt is rejected.
    pub fn derive(&self, password: &str, salt: Option<&str>) -> SecurityResult<Credential> {
        let salt = match salt {
            Some("") => return Err(SecurityError::EmptySalt),
            Some(salt) => salt.to_string(),
            None => generate_salt(),
        };

        let key = self.derive_key(password, &salt)?;

        Ok(Credential {
            hash: hex::encode(key),
            salt,
        })
    }

    /// Re-derives with the stored salt and compares in constant time.
    pub fn verify(&self, password: &str, stored_hash: &str, salt: &str) -> bool {
        self.verify_detailed(password, stored_hash, salt).is_valid()
    }

    /// Like [`verify`](Self::verify) but also reports legacy rows.
    ///
    /// A row with an empty salt is treated as a legacy unsalted SHA-256 hex
    /// digest. It verifies, but comes back with `needs_rehash: true` so the
    /// caller can replace it.
    pub fn verify_detailed(&self, password: &str, stored_hash: &str, salt: &str) -> Verification {
        let Ok(stored) = hex::decode(stored_hash.trim()) else {
            return Verification::Invalid;
        };

        if salt.is_empty() {
            let digest = Sha256::digest(password.as_bytes());
            return if constant_time_eq(&digest, &stored) {
                Verification::Valid { needs_rehash: true }
            } else {
                Verification::Invalid
            };
        }

        match self.derive_key(password, salt) {
            Ok(key) if constant_time_eq(&key, &stored) => Verification::Valid {
                needs_rehash: false,
            },
            _ => Verification::Invalid,
        }
    }

    fn derive_key(&self, password: &str, salt: &str) -> SecurityResult<[u8; HASH_BYTES]> {
        let mut key = [0u8; HASH_BYTES];

        match self.algorithm {
            KdfAlgorithm::Pbkdf2Sha256 => {
                pbkdf2_sha256(password.as_bytes(), salt.as_bytes(), self.iterations, &mut key);
            }
            KdfAlgorithm::Argon2id => {
                Argon2::default()
                    .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut key)
                    .map_err(|e| SecurityError::Derivation(e.to_string()))?;
            }
        }

        Ok(key)
    }
}

impl Default for CredentialHasher {
    /// PBKDF2-HMAC-SHA256 at the iteration floor.
    fn default() -> Self {
        CredentialHasher {
            algorithm: KdfAlgorithm::Pbkdf2Sha256,
            iterations: MIN_PBKDF2_ITERATIONS,
        }
    }
}

// =============================================================================
// Free Functions
// =============================================================================

/// Derives a credential with the default hasher.
pub fn derive_credential(password: &str, salt: Option<&str>) -> SecurityResult<Credential> {
    CredentialHasher::default().derive(password, salt)
}

/// Verifies a password with the default hasher.
pub fn verify(password: &str, stored_hash: &str, salt: &str) -> bool {
    CredentialHasher::default().verify(password, stored_hash, salt)
}

/// 32 random bytes from the thread-local CSPRNG, hex encoded.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// A 64-character alphanumeric session token.
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    (0..SESSION_TOKEN_LENGTH)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, out);
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pbkdf2_known_vector() {
        // RFC 7914 §11 test vector, 1 iteration
        let mut out = [0u8; 32];
        pbkdf2_sha256(b"password", b"salt", 1, &mut out);
        assert_eq!(
            hex::encode(out),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
    }

    #[test]
    fn test_derive_then_verify() {
        for password in ["Ciment@2025", "", "mot de passe très long avec accents é"] {
            let credential = derive_credential(password, None).unwrap();
            assert!(verify(password, &credential.hash, &credential.salt));
        }
    }

    #[test]
    fn test_wrong_password_fails() {
        let credential = derive_credential("Ciment@2025", None).unwrap();
        assert!(!verify("Ciment@2026", &credential.hash, &credential.salt));
        assert!(!verify("", &credential.hash, &credential.salt));
    }

    #[test]
    fn test_derivation_is_deterministic_for_a_given_salt() {
        let a = derive_credential("Bloc@20cm", Some("fixed-salt")).unwrap();
        let b = derive_credential("Bloc@20cm", Some("fixed-salt")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.salt, "fixed-salt");
        assert_eq!(a.hash.len(), HASH_BYTES * 2);
    }

    #[test]
    fn test_fresh_salts_differ() {
        let a = derive_credential("same", None).unwrap();
        let b = derive_credential("same", None).unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
        assert_eq!(a.salt.len(), SALT_BYTES * 2);
        assert!(a.salt.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_empty_salt_is_rejected() {
        assert!(matches!(
            derive_credential("pw", Some("")),
            Err(SecurityError::EmptySalt)
        ));
    }

    #[test]
    fn test_iteration_floor() {
        assert!(matches!(
            CredentialHasher::new(KdfAlgorithm::Pbkdf2Sha256, 10_000),
            Err(SecurityError::IterationsTooLow { configured: 10_000, .. })
        ));
        assert!(CredentialHasher::new(KdfAlgorithm::Pbkdf2Sha256, 150_000).is_ok());
        assert!(CredentialHasher::new(KdfAlgorithm::Argon2id, 0).is_ok());
    }

    #[test]
    fn test_iteration_count_changes_the_hash() {
        let floor = CredentialHasher::default();
        let higher = CredentialHasher::new(KdfAlgorithm::Pbkdf2Sha256, 100_001).unwrap();
        let a = floor.derive("pw", Some("salt")).unwrap();
        let b = higher.derive("pw", Some("salt")).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_argon2id_round_trip() {
        let hasher = CredentialHasher::new(KdfAlgorithm::Argon2id, 0).unwrap();
        let credential = hasher.derive("Tôle@ondulée1", None).unwrap();
        assert!(hasher.verify("Tôle@ondulée1", &credential.hash, &credential.salt));
        assert!(!hasher.verify("Tole@ondulee1", &credential.hash, &credential.salt));
        // Short salts are malformed for Argon2
        assert!(matches!(
            hasher.derive("pw", Some("abc")),
            Err(SecurityError::Derivation(_))
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_stored_data() {
        assert!(!verify("pw", "not-hex", "salt"));
        assert!(!verify("pw", "", "salt"));
        assert!(!verify("pw", "abcd", "salt"));
    }

    #[test]
    fn test_legacy_unsalted_sha256_rows() {
        let hasher = CredentialHasher::default();
        let legacy = "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9";

        assert_eq!(
            hasher.verify_detailed("admin123", legacy, ""),
            Verification::Valid { needs_rehash: true }
        );
        assert_eq!(
            hasher.verify_detailed("admin124", legacy, ""),
            Verification::Invalid
        );
    }

    #[test]
    fn test_session_tokens() {
        let tokens: HashSet<String> = (0..100).map(|_| generate_session_token()).collect();
        assert_eq!(tokens.len(), 100);
        for token in &tokens {
            assert_eq!(token.len(), SESSION_TOKEN_LENGTH);
            assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let secret = Secret::new("Admin@2025");
        assert_eq!(format!("{secret:?}"), "Secret(***)");

        let credential = derive_credential("pw", Some("salt")).unwrap();
        let shown = format!("{credential:?}");
        assert!(!shown.contains(&credential.hash));
    }

    #[test]
    fn test_kdf_algorithm_parsing() {
        assert_eq!("pbkdf2".parse::<KdfAlgorithm>().unwrap(), KdfAlgorithm::Pbkdf2Sha256);
        assert_eq!("Argon2id".parse::<KdfAlgorithm>().unwrap(), KdfAlgorithm::Argon2id);
        assert!("md5".parse::<KdfAlgorithm>().is_err());
        assert_eq!(KdfAlgorithm::Argon2id.to_string(), "argon2id");
    }
}
