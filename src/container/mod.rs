//! Password-encrypted containers.
//!
//! A container wraps a secret payload under a password-derived key:
//!
//! ```text
//! salt (8) || iterations (LEB128 varint) || ciphertext (len) || tag (16)
//! ```
//!
//! The payload length is deliberately not encoded; combined with the
//! variable-width iteration field, a container's byte length lies in
//! `[min_size(len), max_size(len)]` and readers recover the payload length
//! by probing (`probe`).
//!
//! # Security
//! - Scrypt key derivation, cost scaled from the iteration count.
//! - ChaCha20-Poly1305 with the whole header as associated data, so a
//!   tampered salt or iteration field fails authentication.
//! - Unwrap failures never yield partial plaintext.

pub mod codec;
pub mod probe;

pub use codec::{max_size, min_size, unwrap, wrap};
pub use probe::ProbeTable;

/// Salt length in bytes.
pub const SALT_LEN: usize = 8;

/// Poly1305 tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Lowest accepted KDF iteration count; also the write-path default.
pub const ITERATIONS_MIN: u32 = 10_000;

/// Highest expressible iteration count.
pub const ITERATIONS_MAX: u32 = u32::MAX;

/// Errors for container operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerError {
    /// Iteration count below the accepted floor.
    BadIterations,
    /// Blob too short, header unparsable, or size out of bounds.
    Malformed,
    /// Authentication failed: wrong password or tampered container.
    AuthFailed,
    /// Key derivation failed.
    Kdf,
}
