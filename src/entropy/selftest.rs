//! SP 800-90B startup health tests.
//!
//! Run against a sample block from every source during bring-up.
//!
//! # Tests
//! - Repetition Count Test: catches a source stuck on one value.
//! - Adaptive Proportion Test: catches a value becoming too common.

use super::EntropyError;

/// Health tester fed one sample byte at a time.
pub struct HealthTester {
    // Repetition Count Test state
    last_sample: u8,
    repetition_count: usize,

    // Adaptive Proportion Test state
    window_count: usize,
    sample_value: u8,
    sample_count: usize,
}

impl HealthTester {
    pub fn new() -> Self {
        Self {
            last_sample: 0,
            repetition_count: 0,
            window_count: 0,
            sample_value: 0,
            sample_count: 0,
        }
    }

    /// Feeds a sample; fails with `HealthTestFailed` on detection.
    pub fn feed(&mut self, sample: u8) -> Result<(), EntropyError> {
        self.check_repetition_count(sample)?;
        self.check_adaptive_proportion(sample)?;
        Ok(())
    }

    fn check_repetition_count(&mut self, sample: u8) -> Result<(), EntropyError> {
        // For H=4.0 min-entropy per byte at alpha=2^-20:
        // C = 1 + ceil(20/4) = 6; with margin, 10.
        const RCT_CUTOFF: usize = 10;

        if sample == self.last_sample {
            self.repetition_count += 1;
            if self.repetition_count >= RCT_CUTOFF {
                return Err(EntropyError::HealthTestFailed);
            }
        } else {
            self.last_sample = sample;
            self.repetition_count = 1;
        }
        Ok(())
    }

    fn check_adaptive_proportion(&mut self, sample: u8) -> Result<(), EntropyError> {
        const W: usize = 512;
        // For H=4.0, alpha=2^-20 the cutoff computes to ~39; use 50.
        const C: usize = 50;

        if self.window_count == 0 {
            self.sample_value = sample;
            self.sample_count = 1;
            self.window_count = 1;
        } else {
            if sample == self.sample_value {
                self.sample_count += 1;
            }
            self.window_count += 1;

            if self.window_count >= W {
                if self.sample_count >= C {
                    return Err(EntropyError::HealthTestFailed);
                }
                self.window_count = 0;
            }
        }
        Ok(())
    }
}

impl Default for HealthTester {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repetition_failure() {
        let mut tester = HealthTester::new();
        for _ in 0..9 {
            assert!(tester.feed(0).is_ok());
        }
        assert_eq!(tester.feed(0), Err(EntropyError::HealthTestFailed));
    }

    #[test]
    fn test_varied_samples_pass() {
        let mut tester = HealthTester::new();
        for i in 0..1024u32 {
            assert!(tester.feed((i % 251) as u8).is_ok());
        }
    }
}
