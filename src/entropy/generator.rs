//! The random generator context object.
//!
//! A `Generator` is created once per run from the healthy entropy sources,
//! stays valid until explicitly closed, and is passed by the caller into
//! every operation that draws randomness. There is no process-global
//! instance; callers serialize their own use (the type is deliberately not
//! `Sync`-shared behind locks here).
//!
//! # Design
//! - Seed: XOR aggregation across sources, so any one good independent
//!   source makes the seed good.
//! - Output: keyed BLAKE3 XOF over a counter, with forward-secure rekeying
//!   after every extraction.
//! - `close()` wipes the key; a closed generator refuses extraction.

use core::fmt;

use zeroize::Zeroizing;

use super::{EntropyError, EntropySource};

const SEED_LEN: usize = 32;
const SEED_CONTEXT: &str = "pwdshard v1 generator seed";

/// Process-lifetime random generator. Lifecycle: created → valid → closed.
pub struct Generator {
    state: State,
}

enum State {
    Valid {
        key: Zeroizing<[u8; SEED_LEN]>,
        counter: u64,
    },
    Closed,
}

impl Generator {
    /// Creates a valid generator by aggregating the given sources.
    ///
    /// Each source contributes a full seed-length block, XORed together;
    /// a source that fails to fill contributes nothing. At least one
    /// source must succeed.
    pub fn from_sources(sources: &mut [Box<dyn EntropySource>]) -> Result<Self, EntropyError> {
        if sources.is_empty() {
            return Err(EntropyError::InitFailed);
        }

        let mut seed = Zeroizing::new([0u8; SEED_LEN]);
        let mut block = Zeroizing::new([0u8; SEED_LEN]);
        let mut contributed = 0usize;

        for source in sources.iter_mut() {
            match source.fill(&mut *block) {
                Ok(()) => {
                    for (s, b) in seed.iter_mut().zip(block.iter()) {
                        *s ^= *b;
                    }
                    contributed += 1;
                }
                Err(_) => {
                    log::warn!("entropy source {} dropped out during seeding", source.name());
                }
            }
        }

        if contributed == 0 {
            return Err(EntropyError::CollectionFailed);
        }

        Ok(Self::from_seed(&seed))
    }

    /// Creates a valid generator from raw seed material.
    ///
    /// Deterministic; intended for tests and for embedders that manage
    /// their own seeding.
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Self {
        let key = blake3::derive_key(SEED_CONTEXT, seed);
        Self {
            state: State::Valid {
                key: Zeroizing::new(key),
                counter: 0,
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.state, State::Valid { .. })
    }

    /// Fills `dest` with generator output and rekeys.
    pub fn extract(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        match &mut self.state {
            State::Valid { key, counter } => {
                let mut hasher = blake3::Hasher::new_keyed(key);
                hasher.update(&counter.to_le_bytes());
                hasher.update(b"output");
                hasher.finalize_xof().fill(dest);

                // Forward security: the old key is unrecoverable from the
                // new one.
                let next: [u8; SEED_LEN] = blake3::Hasher::new_keyed(key)
                    .update(b"rekey")
                    .finalize()
                    .into();
                key.copy_from_slice(&next);
                *counter += 1;
                Ok(())
            }
            State::Closed => Err(EntropyError::GeneratorClosed),
        }
    }

    /// Closes the generator and wipes its key. Idempotent.
    pub fn close(&mut self) {
        self.state = State::Closed;
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Valid { counter, .. } => f
                .debug_struct("Generator")
                .field("state", &"valid")
                .field("counter", counter)
                .field("key", &"***SENSITIVE***")
                .finish(),
            State::Closed => f
                .debug_struct("Generator")
                .field("state", &"closed")
                .finish(),
        }
    }
}

impl EntropySource for Generator {
    fn name(&self) -> &'static str {
        "generator"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        self.extract(dest)
    }

    fn entropy_estimate(&self) -> f64 {
        8.0
    }
}
