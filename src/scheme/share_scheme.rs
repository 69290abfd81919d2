//! M-of-N share-set generation and recovery.
//!
//! Generation draws a fresh secret, splits it, and writes one protected
//! container per share file; recovery unwraps the supplied containers and
//! recombines. Parameter validation happens before any file is opened or
//! created.
//!
//! # Failure semantics
//! The first error aborts the whole operation. Containers already written
//! stay on disk — there is no rollback — and every secret buffer is
//! released on success and failure alike (wipe-on-drop).

use crate::config::Config;
use crate::container::{self, ProbeTable, SALT_LEN};
use crate::entropy::generator::Generator;
use crate::error::Error;
use crate::scheme::{self, SecurityLevel, ShareParams};
use crate::secure::{SecretBytes, SecretPassword};
use crate::sss::{self, Share};
use crate::storage::{self, OverwritePrompt};

/// Generates a share set, returning the secret as hex.
pub(crate) fn generate(
    params: &ShareParams,
    cfg: &Config,
    gen: &mut Generator,
    prompt: &mut dyn OverwritePrompt,
) -> Result<SecretPassword, Error> {
    let n = params.files.len();
    if n < 2 || n < params.threshold as usize || n > u8::MAX as usize {
        return Err(Error::Parameter);
    }
    // A path listed twice would leave one share clobbering the other and
    // the set short of its threshold.
    for (i, path) in params.files.iter().enumerate() {
        if params.files[..i].contains(path) {
            return Err(Error::Parameter);
        }
    }
    if !gen.is_valid() {
        return Err(Error::RngUnavailable);
    }

    // Refuse to clobber existing files unless confirmed, before anything
    // is generated or written.
    for path in &params.files {
        if storage::exists(path) && !prompt.confirm_overwrite(path) {
            return Err(Error::FileExists);
        }
    }

    // A nested share protector generates its own share set here.
    let protector = scheme::generate(&params.protector, cfg, gen, prompt)?;

    let level = params.level.unwrap_or(SecurityLevel::L256);
    let secret = SecretBytes::random(gen, level.secret_len())?;
    let shares = sss::split(secret.as_bytes(), n as u8, params.threshold, gen)?;

    for (share, path) in shares.iter().zip(&params.files) {
        let mut salt = [0u8; SALT_LEN];
        gen.extract(&mut salt)?;
        let blob = container::wrap(
            &share.to_bytes(),
            protector.as_bytes(),
            &salt,
            cfg.iterations,
        )?;
        storage::write_file(path, &blob)?;
    }

    log::info!(
        "wrote {}-of-{} share set at level {}",
        params.threshold,
        n,
        level.bits()
    );
    Ok(SecretPassword::from_hex_of(secret.as_bytes()))
}

/// Recovers the secret from at least `threshold` share files, in any
/// order, returning it as hex.
pub(crate) fn recover(params: &ShareParams) -> Result<SecretPassword, Error> {
    let count = params.files.len();
    if count < 2 || count < params.threshold as usize {
        return Err(Error::Parameter);
    }

    let protector = scheme::read(&params.protector)?;

    // Level given, or inferred from the first file's size.
    let payload_len = match params.level {
        Some(level) => level.share_payload_len(),
        None => {
            let observed = storage::file_size(&params.files[0])?;
            ProbeTable::share_payloads()
                .lookup(observed)
                .ok_or(Error::BadFormat)?
        }
    };

    let mut shares: Vec<Share> = Vec::with_capacity(count);
    for path in &params.files {
        let blob = storage::read_file(path)?;
        let payload = container::unwrap(&blob, protector.as_bytes())?;
        if payload.len() != payload_len {
            return Err(Error::BadFormat);
        }
        shares.push(Share::from_bytes(payload.as_bytes())?);
    }

    let secret = sss::recombine(&shares)?;
    log::info!("recovered secret from {} shares", count);
    Ok(SecretPassword::from_hex_of(secret.as_bytes()))
}
