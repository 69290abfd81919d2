//! Operating-system entropy source.
//!
//! Pulls from the platform RNG (`getrandom` under the hood). Treated as
//! strong but not as a physical TRNG by the assurance policy, so on its own
//! it does not satisfy the one-strong-source rule.

use rand_core::{OsRng, RngCore};

use super::{EntropyError, EntropySource};

/// The OS random source.
pub struct SystemSource {
    _private: (),
}

impl SystemSource {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for SystemSource {
    fn name(&self) -> &'static str {
        "system"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|_| EntropyError::CollectionFailed)
    }

    fn entropy_estimate(&self) -> f64 {
        7.5
    }
}
