//! Hardware TRNG sources on x86/x86_64.
//!
//! `primary-trng` reads RDSEED (direct conditioned noise-source output),
//! `secondary-trng` reads RDRAND (DRBG reseeded from the same noise
//! source). Either counts as a strong physical source for the assurance
//! policy; a health-test failure on one of these is fatal.

use super::{EntropyError, EntropySource};

#[cfg(target_arch = "x86")]
use core::arch::x86::{_rdrand32_step, _rdseed32_step};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{_rdrand64_step, _rdseed64_step};

const MAX_RETRIES: usize = 10;

/// RDSEED-backed source.
pub struct RdSeedSource {
    _private: (),
}

impl RdSeedSource {
    /// Returns the source when the CPU advertises RDSEED.
    pub fn new() -> Option<Self> {
        if std::arch::is_x86_feature_detected!("rdseed") {
            Some(Self { _private: () })
        } else {
            None
        }
    }
}

impl EntropySource for RdSeedSource {
    fn name(&self) -> &'static str {
        "primary-trng"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        let mut i = 0;
        let mut retries = 0;

        while i < dest.len() {
            #[cfg(target_arch = "x86_64")]
            let step = {
                let mut val: u64 = 0;
                // Safety: presence checked in new().
                let ok = unsafe { _rdseed64_step(&mut val) };
                (ok, val.to_le_bytes().to_vec())
            };
            #[cfg(target_arch = "x86")]
            let step = {
                let mut val: u32 = 0;
                // Safety: presence checked in new().
                let ok = unsafe { _rdseed32_step(&mut val) };
                (ok, val.to_le_bytes().to_vec())
            };

            let (ok, bytes) = step;
            if ok == 1 {
                let copy_len = core::cmp::min(bytes.len(), dest.len() - i);
                dest[i..i + copy_len].copy_from_slice(&bytes[..copy_len]);
                i += copy_len;
                retries = 0;
            } else {
                // RDSEED underflows under load; bounded retry then report.
                retries += 1;
                if retries > MAX_RETRIES {
                    return Err(EntropyError::CollectionFailed);
                }
                core::hint::spin_loop();
            }
        }
        Ok(())
    }

    fn entropy_estimate(&self) -> f64 {
        8.0
    }
}

/// RDRAND-backed source.
pub struct RdRandSource {
    _private: (),
}

impl RdRandSource {
    /// Returns the source when the CPU advertises RDRAND.
    pub fn new() -> Option<Self> {
        if std::arch::is_x86_feature_detected!("rdrand") {
            Some(Self { _private: () })
        } else {
            None
        }
    }
}

impl EntropySource for RdRandSource {
    fn name(&self) -> &'static str {
        "secondary-trng"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        let mut i = 0;
        let mut retries = 0;

        while i < dest.len() {
            #[cfg(target_arch = "x86_64")]
            let step = {
                let mut val: u64 = 0;
                // Safety: presence checked in new().
                let ok = unsafe { _rdrand64_step(&mut val) };
                (ok, val.to_le_bytes().to_vec())
            };
            #[cfg(target_arch = "x86")]
            let step = {
                let mut val: u32 = 0;
                // Safety: presence checked in new().
                let ok = unsafe { _rdrand32_step(&mut val) };
                (ok, val.to_le_bytes().to_vec())
            };

            let (ok, bytes) = step;
            if ok == 1 {
                let copy_len = core::cmp::min(bytes.len(), dest.len() - i);
                dest[i..i + copy_len].copy_from_slice(&bytes[..copy_len]);
                i += copy_len;
                retries = 0;
            } else {
                retries += 1;
                if retries > MAX_RETRIES {
                    return Err(EntropyError::CollectionFailed);
                }
                core::hint::spin_loop();
            }
        }
        Ok(())
    }

    fn entropy_estimate(&self) -> f64 {
        8.0
    }
}
