//! pwdshard — credential-management core.
//!
//! Generates, protects, persists and recovers sensitive secrets (symmetric
//! passwords and raw private keys) under one of two protection schemes:
//! a literal passphrase, or an M-of-N threshold split in which a randomly
//! generated secret is sharded across N files, any threshold T of which
//! reconstruct it. Every share, and every standalone key, is stored as a
//! password-encrypted container whose length is not self-describing and is
//! inferred by probing.
//!
//! # Layout
//! - `secure`: wipe-on-drop buffers for all secret material.
//! - `gf256` / `sss`: constant-time field arithmetic and Shamir sharing.
//! - `entropy`: source enumeration, health policy, the `Generator` context
//!   object, and the keystroke-timing fallback collector.
//! - `container`: password-encrypted container codec plus length probing.
//! - `scheme`: the recursive `pass:`/`share:` descriptor resolver and the
//!   share/key orchestration built on everything above.
//!
//! # Security
//! - Secrets only ever live in zeroizing buffers; `Debug` output is redacted.
//! - The `Generator` is an explicit context object, never global state; it
//!   must be brought up through the entropy health policy before any secret
//!   is generated.

pub mod config;
pub mod container;
pub mod entropy;
pub mod error;
pub mod gf256;
pub mod scheme;
pub mod secure;
pub mod sss;
pub mod storage;

pub use config::Config;
pub use entropy::generator::Generator;
pub use error::Error;
pub use scheme::{Scheme, SecurityLevel};
pub use secure::{SecretBytes, SecretPassword};
