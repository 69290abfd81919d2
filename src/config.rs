//! Configuration for the credential core.
//!
//! Populated by the host application (CLI/GUI) and passed into the scheme
//! operations and the entropy bring-up.

use crate::container;

/// Timing and sizing constants for the keystroke-timing collector.
#[derive(Debug, Clone, Copy)]
pub struct KeystrokeConfig {
    /// Minimum spacing between accepted keystrokes, in milliseconds.
    pub min_interval_ms: u64,
    /// Maximum wait between accepted keystrokes before giving up.
    pub timeout_ms: u64,
    /// Accepted inter-arrival differences absorbed per 32-byte output
    /// block. Zero is treated as 1.
    pub block_deltas: u32,
}

impl Default for KeystrokeConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 50,
            timeout_ms: 5_000,
            block_deltas: 128,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// KDF iteration count used when writing containers. Reads honor
    /// whatever the container header declares.
    pub iterations: u32,
    /// Keystroke collector tuning.
    pub keystroke: KeystrokeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iterations: container::ITERATIONS_MIN,
            keystroke: KeystrokeConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_container_floor() {
        let cfg = Config::default();
        assert_eq!(cfg.iterations, container::ITERATIONS_MIN);
        assert_eq!(cfg.keystroke.min_interval_ms, 50);
        assert_eq!(cfg.keystroke.timeout_ms, 5_000);
        assert_eq!(cfg.keystroke.block_deltas, 128);
    }
}
