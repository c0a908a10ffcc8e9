//! Admin credential verification.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::AdminSecret;

/// SHA-256 digest of a password, lower-case hex.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// The configured admin secret, held as its SHA-256 digest.
/// Uses `SecretString` so the digest is never logged and is zeroized on drop.
///
/// # Security features
/// - `Debug` prints `[REDACTED]` instead of the digest
/// - Only digests are compared, so the plaintext never stays in memory after startup
/// - Comparison is constant-time over equal-length digests
#[derive(Clone)]
pub struct AdminKey(Option<SecretString>);

impl AdminKey {
    /// Build from configuration. A missing secret rejects every credential.
    pub fn new(secret: Option<&AdminSecret>) -> Self {
        let digest = secret.map(|s| match s {
            AdminSecret::Hash(hash) => hash.trim().to_ascii_lowercase(),
            AdminSecret::Plain(plain) => hash_password(plain),
        });
        Self(digest.map(SecretString::from))
    }

    /// Build directly from a plaintext password.
    pub fn from_password(password: &str) -> Self {
        Self(Some(SecretString::from(hash_password(password))))
    }

    /// Securely compare the provided password with the stored digest.
    ///
    /// Both sides are 64-character hex digests, so `ConstantTimeEq` compares
    /// buffers of the same length and leaks nothing through early exit.
    pub fn verify(&self, provided: &str) -> bool {
        match &self.0 {
            Some(expected) => {
                let provided = hash_password(provided);
                expected
                    .expose_secret()
                    .as_bytes()
                    .ct_eq(provided.as_bytes())
                    .into()
            }
            None => false,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(_) => write!(f, "AdminKey([REDACTED])"),
            None => write!(f, "AdminKey(None)"),
        }
    }
}
