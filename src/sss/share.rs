//! One indexed fragment of a split secret.
//!
//! A share is a point (x, y-vector) on the sharing polynomial: the index is
//! the x-coordinate (1-based, public), the value holds one polynomial
//! evaluation per secret byte. On the wire a share is `index || value`,
//! `len + 1` bytes for a `len`-byte secret.
//!
//! # Security
//! - `Zeroize` / `ZeroizeOnDrop` wipe the value on release.
//! - `Debug` redacts the value.

use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::SssError;

/// A share of a secret.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Share {
    /// The x-coordinate (1..=255). Public information.
    #[zeroize(skip)]
    index: u8,

    /// The y-coordinates, one per secret byte. Highly sensitive.
    value: Vec<u8>,
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("index", &self.index)
            .field("length", &self.value.len())
            .field("value", &"***SENSITIVE***")
            .finish()
    }
}

impl Share {
    /// Creates a share with validation.
    pub fn new(index: u8, value: Vec<u8>) -> Result<Self, SssError> {
        if index == 0 {
            return Err(SssError::InvalidShareIndex);
        }
        if value.is_empty() {
            return Err(SssError::EmptySecret);
        }
        Ok(Self { index, value })
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Wire form: `index || value`, one byte longer than the secret.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(Vec::with_capacity(1 + self.value.len()));
        out.push(self.index);
        out.extend_from_slice(&self.value);
        out
    }

    /// Parses the wire form produced by [`Share::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SssError> {
        if bytes.len() < 2 {
            return Err(SssError::EmptySecret);
        }
        Self::new(bytes[0], bytes[1..].to_vec())
    }
}
