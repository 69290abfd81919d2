//! Secret reconstruction via Lagrange interpolation at x = 0.
//!
//! Defined for any share count at or above the original threshold; the
//! caller is responsible for supplying enough genuine shares. With fewer
//! than threshold shares interpolation still produces a value, but one
//! unrelated to the secret — that is the sharing scheme's privacy property,
//! not an error this layer can detect.

use crate::gf256::GF256;
use crate::secure::SecretBytes;
use crate::sss::{share::Share, SssError};

/// Reconstructs the secret from the supplied shares.
pub fn recombine(shares: &[Share]) -> Result<SecretBytes, SssError> {
    if shares.is_empty() {
        return Err(SssError::InsufficientShares);
    }

    let num_shares = shares.len();
    let share_len = shares[0].value().len();

    for share in shares {
        if share.value().len() != share_len {
            return Err(SssError::ShareLengthMismatch);
        }
    }

    // Duplicate index check; N <= 255 so O(N^2) is fine.
    for i in 0..num_shares {
        for j in (i + 1)..num_shares {
            if shares[i].index() == shares[j].index() {
                return Err(SssError::DuplicateShareIndex);
            }
        }
    }

    // Lagrange basis at x = 0. In GF(2^8) subtraction is XOR, so
    // lambda_j = product_{m != j} x_m / (x_m + x_j).
    let mut lambdas = Vec::with_capacity(num_shares);
    for j in 0..num_shares {
        let xj = GF256(shares[j].index());
        let mut numerator = GF256(1);
        let mut denominator = GF256(1);

        for m in 0..num_shares {
            if j == m {
                continue;
            }
            let xm = GF256(shares[m].index());
            numerator *= xm;
            denominator *= xm + xj;
        }

        lambdas.push(numerator * denominator.inv());
    }

    // S[p] = sum_j share_j[p] * lambda_j
    let mut secret = Vec::with_capacity(share_len);
    for p in 0..share_len {
        let mut sum = GF256(0);
        for j in 0..num_shares {
            sum += GF256(shares[j].value()[p]) * lambdas[j];
        }
        secret.push(sum.0);
    }

    Ok(SecretBytes::new(secret))
}
