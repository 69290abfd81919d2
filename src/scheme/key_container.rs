//! Password-protected storage for raw private keys.
//!
//! A key container is an ordinary container whose payload is a raw private
//! key of one of the supported lengths (32/48/64 bytes). The length is not
//! recorded in the file; a reader either knows the security level or infers
//! it from the file size through the probe table.

use crate::config::Config;
use crate::container::{self, max_size, min_size, ProbeTable, SALT_LEN};
use crate::entropy::generator::Generator;
use crate::error::Error;
use crate::scheme::SecurityLevel;
use crate::secure::{SecretBytes, SecretPassword};
use crate::storage::{self, OverwritePrompt};

use std::path::Path;

/// Wraps `key` under `password` and writes it to `path`.
///
/// The key length must match one of the supported security levels.
pub fn write_key(
    key: &SecretBytes,
    password: &SecretPassword,
    path: &Path,
    cfg: &Config,
    gen: &mut Generator,
    prompt: &mut dyn OverwritePrompt,
) -> Result<(), Error> {
    let level = SecurityLevel::from_key_len(key.len()).ok_or(Error::Parameter)?;
    if !gen.is_valid() {
        return Err(Error::RngUnavailable);
    }

    let mut salt = [0u8; SALT_LEN];
    gen.extract(&mut salt)?;
    let blob = container::wrap(key.as_bytes(), password.as_bytes(), &salt, cfg.iterations)?;
    storage::write_new(path, &blob, prompt)?;

    log::info!("wrote key container at level {}", level.bits());
    Ok(())
}

/// Reads and unwraps the key container at `path`.
///
/// With a `level` hint the file size must fall inside that level's bounds;
/// without one the level is inferred from the file size.
pub fn read_key(
    path: &Path,
    password: &SecretPassword,
    level: Option<SecurityLevel>,
) -> Result<SecretBytes, Error> {
    let observed = storage::file_size(path)?;

    let key_len = match level {
        Some(level) => {
            let len = level.key_len();
            if observed < min_size(len) || observed > max_size(len) {
                return Err(Error::BadFormat);
            }
            len
        }
        None => ProbeTable::key_payloads()
            .lookup(observed)
            .ok_or(Error::BadFormat)?,
    };

    let blob = storage::read_file(path)?;
    let key = container::unwrap(&blob, password.as_bytes())?;
    if key.len() != key_len {
        return Err(Error::BadFormat);
    }
    Ok(key)
}
