//! Wipe-on-drop buffers for secret material.
//!
//! Every secret-carrying intermediate in this crate (generated secrets,
//! shares, unwrapped payloads, protector passwords) lives in one of these
//! types. The backing memory is overwritten on drop via `zeroize`, which
//! guarantees the wipe cannot be elided by the optimizer; there is no
//! explicit acquire/release pair to forget on an error path.
//!
//! # Security
//! - `Debug` implementations redact contents.
//! - No `Clone` for `SecretBytes`: duplication of secrets is explicit.

use core::fmt;
use zeroize::{Zeroize, Zeroizing};

use crate::entropy::EntropySource;
use crate::error::Error;

/// An owned secret byte buffer, wiped on drop.
pub struct SecretBytes {
    bytes: Zeroizing<Vec<u8>>,
}

impl SecretBytes {
    /// Takes ownership of `bytes` as secret material.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Copies a slice into a fresh secret buffer.
    pub fn copy_of(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }

    /// Draws `len` random bytes from `rng`.
    pub fn random<R: EntropySource + ?Sized>(rng: &mut R, len: usize) -> Result<Self, Error> {
        let mut bytes = Zeroizing::new(vec![0u8; len]);
        rng.fill(&mut bytes)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Explicit early wipe. Dropping has the same effect.
    pub fn wipe(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBytes")
            .field("length", &self.bytes.len())
            .field("bytes", &"***SENSITIVE***")
            .finish()
    }
}

/// A secret password: printable, null-free text in a wiped buffer.
///
/// Either a literal passphrase or the hex rendering of a generated secret.
pub struct SecretPassword {
    text: Zeroizing<String>,
}

impl SecretPassword {
    /// Wraps literal passphrase text.
    ///
    /// Rejects empty text and text containing NUL or other control bytes,
    /// which keeps the "non-null implies valid printable text" invariant.
    pub fn from_text(text: &str) -> Result<Self, Error> {
        if text.is_empty() || text.chars().any(|c| c.is_control()) {
            return Err(Error::Parameter);
        }
        Ok(Self {
            text: Zeroizing::new(text.to_owned()),
        })
    }

    /// Hex-encodes a generated secret into password form.
    pub fn from_hex_of(secret: &[u8]) -> Self {
        Self {
            text: Zeroizing::new(hex::encode(secret)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

impl fmt::Debug for SecretPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPassword")
            .field("length", &self.text.len())
            .field("text", &"***SENSITIVE***")
            .finish()
    }
}
