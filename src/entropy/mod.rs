//! Entropy collection and generator bring-up.
//!
//! Enumerates the fixed source set (`primary-trng`, `secondary-trng`,
//! `system`, `timer`), runs per-source health probes, enforces the
//! minimum-assurance policy, and owns the lifecycle of the random
//! [`generator::Generator`] every secret-producing operation requires.
//!
//! # Design
//! - **Multi-source**: healthy sources are XOR-aggregated into the seed, so
//!   one good independent source makes the seed good.
//! - **Explicit context**: the generator is a value passed into operations,
//!   never process-global state.
//! - **Fallback**: when the policy verdict is insufficient entropy (and only
//!   then), the keystroke-timing collector joins as an auxiliary source.

pub mod generator;
pub mod health;
pub mod jitter;
pub mod keystroke;
pub mod selftest;
pub mod system;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod trng;

/// Error types for entropy collection and generator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyError {
    /// No sources configured or source initialization failed.
    InitFailed,
    /// Failed to collect entropy bytes.
    CollectionFailed,
    /// Source is exhausted (fixed buffer drained).
    Exhausted,
    /// A physical source failed its SP 800-90B startup tests. Fatal; no
    /// fallback is attempted.
    HealthTestFailed,
    /// Platform or source not supported here.
    NotSupported,
    /// Healthy sources exist but do not meet the assurance policy. The
    /// one verdict that permits the keystroke fallback.
    InsufficientEntropy,
    /// Keystroke collection timed out.
    Timeout,
    /// The generator has been closed.
    GeneratorClosed,
}

impl From<keystroke::KeystrokeError> for EntropyError {
    fn from(err: keystroke::KeystrokeError) -> Self {
        match err {
            keystroke::KeystrokeError::Timeout { .. } => EntropyError::Timeout,
            keystroke::KeystrokeError::Unavailable => EntropyError::NotSupported,
            keystroke::KeystrokeError::Backend => EntropyError::CollectionFailed,
        }
    }
}

/// A source of randomness.
pub trait EntropySource {
    /// Unique identifier, one of the fixed set for platform sources.
    fn name(&self) -> &'static str;

    /// Fills `dest` with random bytes from the source.
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError>;

    /// Conservative estimate of min-entropy per byte, in bits (0.0–8.0).
    /// Sources at 8.0 are treated as strong physical sources by the
    /// assurance policy.
    fn entropy_estimate(&self) -> f64;
}
