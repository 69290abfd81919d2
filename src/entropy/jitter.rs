//! CPU timing-jitter entropy source (`timer`).
//!
//! Harvests entropy from execution-timing variance: cache misses, pipeline
//! stalls, branch mispredictions, scheduler interference. The weakest source
//! in the fixed set; it only ever counts as one of the two independent
//! sources the assurance policy accepts, never as a strong source on its
//! own.
//!
//! # Design
//! - Timestamps come from `rdtsc` (x86) or `cntvct_el0` (aarch64).
//! - Each output bit is the parity of eight XOR-folded timing deltas, an
//!   8x oversampling that whitens the raw bias.

use super::{EntropyError, EntropySource};

/// Timing-jitter source.
pub struct JitterSource {
    _private: (),
}

impl JitterSource {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// High-resolution timestamp, 0 on unsupported architectures.
    #[inline(always)]
    fn timestamp() -> u64 {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            #[cfg(target_arch = "x86")]
            use core::arch::x86::_rdtsc;
            #[cfg(target_arch = "x86_64")]
            use core::arch::x86_64::_rdtsc;

            // Safety: rdtsc is unprivileged on all targets we build for.
            unsafe { _rdtsc() }
        }

        #[cfg(target_arch = "aarch64")]
        {
            let mut cnt: u64;
            unsafe {
                core::arch::asm!("mrs {}, cntvct_el0", out(reg) cnt);
            }
            cnt
        }

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
        {
            0
        }
    }

    /// Small fixed workload to induce measurable jitter.
    #[inline(always)]
    fn workload() {
        let mut x = 0u64;
        for i in 0..10 {
            x = x.wrapping_add(i);
            core::hint::black_box(x);
        }
    }
}

impl Default for JitterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for JitterSource {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        // No usable counter on this platform.
        let t1 = Self::timestamp();
        Self::workload();
        let t2 = Self::timestamp();
        if t1 == t2 && t1 == 0 {
            return Err(EntropyError::NotSupported);
        }

        for byte in dest.iter_mut() {
            let mut acc = 0u8;
            for _ in 0..8 {
                let mut folded = 0u64;
                for _ in 0..8 {
                    let start = Self::timestamp();
                    Self::workload();
                    let end = Self::timestamp();
                    folded ^= end.wrapping_sub(start);
                }
                let bit = (folded.count_ones() % 2) as u8;
                acc = (acc << 1) | bit;
            }
            *byte = acc;
        }

        Ok(())
    }

    fn entropy_estimate(&self) -> f64 {
        // Jitter quality varies wildly between machines; assume half a bit
        // of min-entropy per output bit after oversampling.
        4.0
    }
}
