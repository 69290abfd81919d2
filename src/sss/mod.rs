//! Threshold secret sharing (Shamir over GF(256)).
//!
//! A secret of `len` bytes splits into N shares of `len + 1` bytes each
//! (one index byte plus one polynomial evaluation per secret byte); any
//! `threshold` of them reconstruct it, fewer reveal nothing.
//!
//! # Security
//! - All field operations are constant-time (`gf256`).
//! - Shares, secrets and polynomial coefficients are zeroized on drop.

pub mod recombine;
pub mod share;
pub mod split;

pub use recombine::recombine;
pub use share::Share;
pub use split::split;

/// Errors for sharing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SssError {
    /// Share index must be 1..=255.
    InvalidShareIndex,
    /// Secret or share payload is empty.
    EmptySecret,
    /// Threshold configuration error (t > n, t < 2).
    InvalidThreshold,
    /// No shares supplied for reconstruction.
    InsufficientShares,
    /// Two shares carry the same index.
    DuplicateShareIndex,
    /// Shares differ in length.
    ShareLengthMismatch,
    /// Random number generator failure while drawing coefficients.
    RngFailure,
}
