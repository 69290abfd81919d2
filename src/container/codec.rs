//! Container wrap/unwrap and the size bound functions.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use zeroize::Zeroizing;

use crate::secure::SecretBytes;

use super::{ContainerError, ITERATIONS_MAX, ITERATIONS_MIN, SALT_LEN, TAG_LEN};

const NONCE_LEN: usize = 12;
const NONCE_CONTEXT: &str = "pwdshard v1 container nonce";

// Scrypt cost exponent bounds. log2(10_000) rounds up to 14; the cap keeps
// absurd iteration counts from turning reads into a denial of service.
const SCRYPT_LOG_N_MIN: u8 = 14;
const SCRYPT_LOG_N_MAX: u8 = 20;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Smallest possible container for a payload of `len` bytes (iteration
/// floor). Monotone non-decreasing in the iteration count.
pub fn min_size(len: usize) -> usize {
    SALT_LEN + varint_len(ITERATIONS_MIN) + len + TAG_LEN
}

/// Largest possible container for a payload of `len` bytes (iteration
/// ceiling).
pub fn max_size(len: usize) -> usize {
    SALT_LEN + varint_len(ITERATIONS_MAX) + len + TAG_LEN
}

/// Wraps `payload` under `password` into a fresh container blob.
pub fn wrap(
    payload: &[u8],
    password: &[u8],
    salt: &[u8; SALT_LEN],
    iterations: u32,
) -> Result<Vec<u8>, ContainerError> {
    if iterations < ITERATIONS_MIN {
        return Err(ContainerError::BadIterations);
    }

    let mut header = Vec::with_capacity(SALT_LEN + 5);
    header.extend_from_slice(salt);
    push_varint(iterations, &mut header);

    let key = derive_key(password, salt, iterations)?;
    let nonce = derive_nonce(salt);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key));
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: payload,
                aad: &header,
            },
        )
        .map_err(|_| ContainerError::AuthFailed)?;

    let mut blob = header;
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Unwraps a container blob, returning the payload.
pub fn unwrap(blob: &[u8], password: &[u8]) -> Result<SecretBytes, ContainerError> {
    if blob.len() < SALT_LEN + 1 + TAG_LEN {
        return Err(ContainerError::Malformed);
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&blob[..SALT_LEN]);

    let (iterations, varint_bytes) =
        read_varint(&blob[SALT_LEN..]).ok_or(ContainerError::Malformed)?;
    if iterations < ITERATIONS_MIN {
        return Err(ContainerError::Malformed);
    }

    let header_len = SALT_LEN + varint_bytes;
    if blob.len() < header_len + TAG_LEN {
        return Err(ContainerError::Malformed);
    }
    let header = &blob[..header_len];
    let ciphertext = &blob[header_len..];

    let key = derive_key(password, &salt, iterations)?;
    let nonce = derive_nonce(&salt);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key));
    let payload = cipher
        .decrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: ciphertext,
                aad: header,
            },
        )
        .map_err(|_| ContainerError::AuthFailed)?;

    Ok(SecretBytes::new(payload))
}

/// Scrypt with the cost exponent scaled from the iteration count.
fn derive_key(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    iterations: u32,
) -> Result<Zeroizing<[u8; 32]>, ContainerError> {
    let bits = 32 - iterations.leading_zeros() as u8;
    let log_n = bits.clamp(SCRYPT_LOG_N_MIN, SCRYPT_LOG_N_MAX);

    let params = scrypt::Params::new(log_n, SCRYPT_R, SCRYPT_P, scrypt::Params::RECOMMENDED_LEN)
        .map_err(|_| ContainerError::Kdf)?;

    let mut key = Zeroizing::new([0u8; 32]);
    scrypt::scrypt(password, salt, &params, &mut *key).map_err(|_| ContainerError::Kdf)?;
    Ok(key)
}

/// Per-container nonce. The key is derived from the fresh per-container
/// salt, so each (key, nonce) pair is used exactly once.
fn derive_nonce(salt: &[u8; SALT_LEN]) -> [u8; NONCE_LEN] {
    let digest: [u8; 32] = blake3::Hasher::new_derive_key(NONCE_CONTEXT)
        .update(salt)
        .finalize()
        .into();
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&digest[..NONCE_LEN]);
    nonce
}

fn varint_len(mut value: u32) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

fn push_varint(mut value: u32, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// LEB128 decode, bounded to the 5 bytes a u32 can need.
fn read_varint(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut value: u32 = 0;
    for (i, &byte) in bytes.iter().take(5).enumerate() {
        let chunk = (byte & 0x7F) as u64;
        let shifted = chunk.checked_shl(7 * i as u32)?;
        if shifted > u32::MAX as u64 {
            return None;
        }
        value |= shifted as u32;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PW: &[u8] = b"correct-horse-battery-staple";
    const SALT: [u8; SALT_LEN] = [1, 2, 3, 4, 5, 6, 7, 8];

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let payload = b"seventeen bytes!!";
        let blob = wrap(payload, PW, &SALT, ITERATIONS_MIN).unwrap();

        assert_eq!(blob.len(), SALT_LEN + 2 + payload.len() + TAG_LEN);
        assert!(blob.len() >= min_size(payload.len()));
        assert!(blob.len() <= max_size(payload.len()));

        let recovered = unwrap(&blob, PW).unwrap();
        assert_eq!(recovered.as_bytes(), payload);
    }

    #[test]
    fn test_wrong_password_fails_closed() {
        let blob = wrap(b"secret", PW, &SALT, ITERATIONS_MIN).unwrap();
        assert_eq!(unwrap(&blob, b"wrong").unwrap_err(), ContainerError::AuthFailed);
    }

    #[test]
    fn test_tampering_detected() {
        let mut blob = wrap(b"secret", PW, &SALT, ITERATIONS_MIN).unwrap();

        // Flip a ciphertext bit.
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert_eq!(unwrap(&blob, PW).unwrap_err(), ContainerError::AuthFailed);
        blob[last] ^= 0x01;

        // Header is authenticated too.
        blob[0] ^= 0x01;
        assert_eq!(unwrap(&blob, PW).unwrap_err(), ContainerError::AuthFailed);
    }

    #[test]
    fn test_iteration_floor_enforced() {
        assert_eq!(
            wrap(b"x", PW, &SALT, ITERATIONS_MIN - 1).unwrap_err(),
            ContainerError::BadIterations
        );

        // A forged header advertising a sub-floor count is malformed.
        let mut blob = Vec::new();
        blob.extend_from_slice(&SALT);
        push_varint(1, &mut blob);
        blob.extend_from_slice(&[0u8; TAG_LEN + 4]);
        assert_eq!(unwrap(&blob, PW).unwrap_err(), ContainerError::Malformed);
    }

    #[test]
    fn test_truncated_blob_is_malformed() {
        assert_eq!(unwrap(&[0u8; 5], PW).unwrap_err(), ContainerError::Malformed);
    }

    #[test]
    fn test_size_bounds_monotone() {
        for len in [17usize, 25, 33, 32, 48, 64] {
            assert!(min_size(len) <= max_size(len));
            assert_eq!(min_size(len), len + SALT_LEN + 2 + TAG_LEN);
            assert_eq!(max_size(len), len + SALT_LEN + 5 + TAG_LEN);
        }
        // Larger payloads never produce smaller bounds.
        assert!(min_size(25) > max_size(17) || min_size(25) > min_size(17));
    }

    #[test]
    fn test_varint_roundtrip() {
        for value in [0u32, 1, 127, 128, 10_000, 16_383, 16_384, u32::MAX] {
            let mut out = Vec::new();
            push_varint(value, &mut out);
            assert_eq!(out.len(), varint_len(value));
            assert_eq!(read_varint(&out), Some((value, out.len())));
        }
        assert_eq!(varint_len(ITERATIONS_MIN), 2);
        assert_eq!(varint_len(ITERATIONS_MAX), 5);
        // Unterminated varint.
        assert_eq!(read_varint(&[0x80, 0x80, 0x80, 0x80, 0x80]), None);
    }
}
