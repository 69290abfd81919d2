//! Secret splitting: polynomial generation and share evaluation.
//!
//! For each secret byte a fresh random polynomial of degree `threshold - 1`
//! is built with the secret byte as intercept; share i holds the evaluation
//! at x = i.
//!
//! # Security
//! - Polynomial coefficients live in `Zeroizing` buffers and are wiped.
//! - Coefficients are drawn from the caller's entropy source; a failing
//!   source aborts the split with `RngFailure`, never a weaker polynomial.

use zeroize::Zeroizing;

use crate::entropy::EntropySource;
use crate::gf256::GF256;
use crate::sss::{share::Share, SssError};

/// Splits `secret` into `n` shares, any `threshold` of which reconstruct it.
pub fn split<R: EntropySource + ?Sized>(
    secret: &[u8],
    n: u8,
    threshold: u8,
    rng: &mut R,
) -> Result<Vec<Share>, SssError> {
    if secret.is_empty() {
        return Err(SssError::EmptySecret);
    }
    if threshold < 2 || threshold > n {
        return Err(SssError::InvalidThreshold);
    }

    // share_values[i] collects the evaluations for index i + 1.
    let mut share_values: Vec<Zeroizing<Vec<u8>>> = Vec::with_capacity(n as usize);
    for _ in 0..n {
        share_values.push(Zeroizing::new(Vec::with_capacity(secret.len())));
    }

    // Reused buffer for the threshold - 1 random coefficients per byte.
    let mut random_buf = Zeroizing::new(vec![0u8; (threshold - 1) as usize]);

    for &byte in secret {
        if rng.fill(&mut random_buf).is_err() {
            return Err(SssError::RngFailure);
        }

        // f(x) = secret + a1*x + ... + a(t-1)*x^(t-1)
        let mut coeffs = Zeroizing::new(Vec::with_capacity(threshold as usize));
        coeffs.push(GF256(byte));
        for &r in random_buf.iter() {
            coeffs.push(GF256(r));
        }

        for i in 0..n {
            let x = GF256(i + 1);
            let y = evaluate_polynomial(&coeffs, x);
            share_values[i as usize].push(y.0);
        }
    }

    let mut shares = Vec::with_capacity(n as usize);
    for (i, value) in share_values.into_iter().enumerate() {
        shares.push(Share::new((i + 1) as u8, value.to_vec())?);
    }

    Ok(shares)
}

/// Horner's rule over GF(256).
#[inline(always)]
fn evaluate_polynomial(coeffs: &[GF256], x: GF256) -> GF256 {
    let mut result = match coeffs.last() {
        Some(&c) => c,
        None => return GF256(0),
    };
    for coeff in coeffs.iter().rev().skip(1) {
        result = result * x + *coeff;
    }
    result
}
