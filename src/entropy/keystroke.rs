//! Keystroke-timing entropy collector.
//!
//! The last-resort source: when the assurance policy reports insufficient
//! entropy, inter-keystroke timing differences are absorbed into a BLAKE3
//! pool and squeezed out in 32-byte blocks.
//!
//! # State machine
//! - A keystroke is accepted only if it differs from the previous one and
//!   arrives at least the configured interval (50 ms) after it.
//! - Each accepted tick-count difference is absorbed into the pool; after
//!   128 accepted differences a block of up to 32 bytes is squeezed into
//!   the caller's buffer, and absorption continues for the next block.
//! - More than the timeout (5 s) between accepted keystrokes aborts with a
//!   timeout error carrying the number of fully produced blocks.
//! - Terminal echo is restored on every exit path.
//!
//! Raw-terminal handling is platform-specific, so the collector talks to a
//! [`KeystrokeBackend`] capability; a termios backend is provided on Unix
//! and hosts on other platforms supply their own.

use core::time::Duration;

use crate::config::KeystrokeConfig;

use super::{EntropyError, EntropySource};
use zeroize::Zeroizing;

/// Bytes squeezed per completed block.
pub const BLOCK_LEN: usize = 32;

/// Minimum usable tick resolution: 1 GHz equivalent. Coarser clocks make
/// the timing differences too predictable to harvest.
pub const MIN_TICK_FREQUENCY: u64 = 1_000_000_000;

const POOL_CONTEXT: &str = "pwdshard v1 keystroke pool";

/// Errors from keystroke collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeystrokeError {
    /// No accepted keystroke within the timeout. `completed_blocks` counts
    /// the fully produced 32-byte blocks before the abort.
    Timeout { completed_blocks: usize },
    /// The platform has no usable keystroke backend or its tick resolution
    /// is below [`MIN_TICK_FREQUENCY`].
    Unavailable,
    /// The backend failed to read or to switch terminal modes.
    Backend,
}

/// One observed keystroke.
#[derive(Debug, Clone, Copy)]
pub struct Keystroke {
    pub byte: u8,
    /// Backend tick count at arrival.
    pub ticks: u64,
}

/// Platform capability for raw keystroke input.
pub trait KeystrokeBackend {
    /// Ticks per second of the `Keystroke::ticks` clock.
    fn tick_frequency(&self) -> u64;

    /// Disables terminal echo (and line buffering).
    fn echo_off(&mut self) -> Result<(), KeystrokeError>;

    /// Restores the terminal. Must be safe to call unconditionally.
    fn echo_on(&mut self);

    /// Waits up to `timeout` for one keystroke; `Ok(None)` on timeout.
    fn read_key(&mut self, timeout: Duration) -> Result<Option<Keystroke>, KeystrokeError>;
}

/// The collector state machine.
pub struct KeystrokeCollector<'a, B: KeystrokeBackend> {
    backend: &'a mut B,
    cfg: KeystrokeConfig,
}

impl<'a, B: KeystrokeBackend> KeystrokeCollector<'a, B> {
    pub fn new(backend: &'a mut B, cfg: KeystrokeConfig) -> Self {
        Self { backend, cfg }
    }

    /// Fills `dest` with collected entropy, 32 bytes per 128 accepted
    /// inter-keystroke differences.
    pub fn gather(&mut self, dest: &mut [u8]) -> Result<(), KeystrokeError> {
        if self.backend.tick_frequency() < MIN_TICK_FREQUENCY {
            return Err(KeystrokeError::Unavailable);
        }

        self.backend.echo_off()?;
        let result = self.gather_inner(dest);
        // Echo restored on success, timeout and backend failure alike.
        self.backend.echo_on();
        result
    }

    fn gather_inner(&mut self, dest: &mut [u8]) -> Result<(), KeystrokeError> {
        let freq = self.backend.tick_frequency();
        let min_ticks = (freq / 1_000) * self.cfg.min_interval_ms;
        let timeout_ticks = (freq / 1_000) * self.cfg.timeout_ms;
        let timeout = Duration::from_millis(self.cfg.timeout_ms);
        // A zero block size would divide by zero below; treat it as 1.
        let block_deltas = self.cfg.block_deltas.max(1);

        let mut hasher = blake3::Hasher::new_derive_key(POOL_CONTEXT);
        let mut prev: Option<Keystroke> = None;
        // Baseline for the accepted-keystroke timeout; set by the first
        // keystroke, moved forward by every accepted one.
        let mut deadline_base: Option<u64> = None;
        let mut accepted: u32 = 0;
        let mut filled = 0usize;
        let mut blocks = 0usize;

        while filled < dest.len() {
            let key = match self.backend.read_key(timeout)? {
                Some(key) => key,
                None => {
                    return Err(KeystrokeError::Timeout {
                        completed_blocks: blocks,
                    })
                }
            };

            if let Some(base) = deadline_base {
                if key.ticks.wrapping_sub(base) > timeout_ticks {
                    return Err(KeystrokeError::Timeout {
                        completed_blocks: blocks,
                    });
                }
            } else {
                deadline_base = Some(key.ticks);
            }

            // The first keystroke only establishes the baseline.
            if let Some(p) = prev {
                let delta = key.ticks.wrapping_sub(p.ticks);
                if key.byte != p.byte && delta >= min_ticks {
                    hasher.update(&delta.to_le_bytes());
                    accepted += 1;
                    deadline_base = Some(key.ticks);

                    if accepted % block_deltas == 0 {
                        let take = core::cmp::min(BLOCK_LEN, dest.len() - filled);
                        hasher.finalize_xof().fill(&mut dest[filled..filled + take]);
                        filled += take;
                        blocks += 1;
                    }
                }
            }

            prev = Some(key);
        }

        Ok(())
    }
}

/// One-shot source serving bytes already harvested from the collector, so
/// they can join the seed aggregation like any other source.
pub struct HarvestedSource {
    buffer: Zeroizing<Vec<u8>>,
}

impl HarvestedSource {
    pub fn new(bytes: Zeroizing<Vec<u8>>) -> Self {
        Self { buffer: bytes }
    }
}

impl EntropySource for HarvestedSource {
    fn name(&self) -> &'static str {
        "keystroke"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        if self.buffer.len() < dest.len() {
            return Err(EntropyError::Exhausted);
        }
        let drained: Vec<u8> = self.buffer.drain(0..dest.len()).collect();
        dest.copy_from_slice(&drained);
        Ok(())
    }

    fn entropy_estimate(&self) -> f64 {
        // 128 timing deltas per 32 output bytes; conservative.
        6.0
    }
}

/// Termios-based backend reading raw keystrokes from stdin.
#[cfg(unix)]
pub mod terminal {
    use super::{Keystroke, KeystrokeBackend, KeystrokeError};
    use core::time::Duration;
    use std::os::unix::io::RawFd;
    use std::time::Instant;

    /// Raw-mode stdin backend. Ticks are nanoseconds from creation.
    pub struct TerminalBackend {
        fd: RawFd,
        saved: Option<libc::termios>,
        origin: Instant,
    }

    impl TerminalBackend {
        pub fn stdin() -> Self {
            Self {
                fd: libc::STDIN_FILENO,
                saved: None,
                origin: Instant::now(),
            }
        }

        fn ticks_now(&self) -> u64 {
            self.origin.elapsed().as_nanos() as u64
        }
    }

    impl Drop for TerminalBackend {
        fn drop(&mut self) {
            self.echo_on();
        }
    }

    impl KeystrokeBackend for TerminalBackend {
        fn tick_frequency(&self) -> u64 {
            // Instant counts nanoseconds.
            1_000_000_000
        }

        fn echo_off(&mut self) -> Result<(), KeystrokeError> {
            // Safety: plain termios calls on a file descriptor we hold.
            unsafe {
                let mut term: libc::termios = core::mem::zeroed();
                if libc::tcgetattr(self.fd, &mut term) != 0 {
                    return Err(KeystrokeError::Unavailable);
                }
                self.saved = Some(term);

                let mut raw = term;
                raw.c_lflag &= !(libc::ECHO | libc::ICANON);
                raw.c_cc[libc::VMIN] = 0;
                raw.c_cc[libc::VTIME] = 0;
                if libc::tcsetattr(self.fd, libc::TCSANOW, &raw) != 0 {
                    self.saved = None;
                    return Err(KeystrokeError::Backend);
                }
            }
            Ok(())
        }

        fn echo_on(&mut self) {
            if let Some(saved) = self.saved.take() {
                // Safety: restoring attributes captured in echo_off.
                unsafe {
                    let _ = libc::tcsetattr(self.fd, libc::TCSANOW, &saved);
                }
            }
        }

        fn read_key(&mut self, timeout: Duration) -> Result<Option<Keystroke>, KeystrokeError> {
            // VTIME is in deciseconds, capped at 255.
            let deciseconds = (timeout.as_millis() / 100).clamp(1, 255) as u8;

            // Safety: termios + read on our descriptor; buffer is one byte.
            unsafe {
                let mut term: libc::termios = core::mem::zeroed();
                if libc::tcgetattr(self.fd, &mut term) != 0 {
                    return Err(KeystrokeError::Backend);
                }
                term.c_cc[libc::VMIN] = 0;
                term.c_cc[libc::VTIME] = deciseconds;
                if libc::tcsetattr(self.fd, libc::TCSANOW, &term) != 0 {
                    return Err(KeystrokeError::Backend);
                }

                let mut byte = 0u8;
                let n = libc::read(self.fd, &mut byte as *mut u8 as *mut libc::c_void, 1);
                match n {
                    1 => Ok(Some(Keystroke {
                        byte,
                        ticks: self.ticks_now(),
                    })),
                    0 => Ok(None),
                    _ => Err(KeystrokeError::Backend),
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;
    use crate::config::KeystrokeConfig;

    const MS: u64 = 1_000_000; // ticks per millisecond at 1 GHz

    /// Alternating bytes spaced 60 ms apart; every keystroke after the
    /// first is accepted.
    fn steady_script(count: usize) -> Vec<Option<Keystroke>> {
        (0..count)
            .map(|i| {
                Some(Keystroke {
                    byte: if i % 2 == 0 { b'a' } else { b'b' },
                    ticks: (i as u64) * 60 * MS,
                })
            })
            .collect()
    }

    #[test]
    fn test_one_block_collection() {
        // 128 accepted differences need 129 keystrokes.
        let mut backend = ScriptedBackend::new(steady_script(129));
        let mut collector = KeystrokeCollector::new(&mut backend, KeystrokeConfig::default());

        let mut out = [0u8; 32];
        collector.gather(&mut out).unwrap();
        assert!(out.iter().any(|&b| b != 0));
        assert_eq!(backend.echo_off_calls, 1);
        assert_eq!(backend.echo_on_calls, 1);
    }

    #[test]
    fn test_two_blocks_differ() {
        let mut backend = ScriptedBackend::new(steady_script(257));
        let mut collector = KeystrokeCollector::new(&mut backend, KeystrokeConfig::default());

        let mut out = [0u8; 64];
        collector.gather(&mut out).unwrap();
        assert_ne!(out[..32], out[32..]);
    }

    #[test]
    fn test_repeated_and_rapid_keys_rejected() {
        // Same byte every time: never accepted, script runs out, timeout
        // with zero completed blocks.
        let script: Vec<_> = (0..20)
            .map(|i| {
                Some(Keystroke {
                    byte: b'x',
                    ticks: (i as u64) * 60 * MS,
                })
            })
            .collect();
        let mut backend = ScriptedBackend::new(script);
        let mut collector = KeystrokeCollector::new(&mut backend, KeystrokeConfig::default());

        let mut out = [0u8; 32];
        assert_eq!(
            collector.gather(&mut out),
            Err(KeystrokeError::Timeout { completed_blocks: 0 })
        );
        // Echo restored on the error path too.
        assert_eq!(backend.echo_on_calls, 1);

        // Distinct bytes but 10 ms apart: under the 50 ms floor, rejected.
        let script: Vec<_> = (0..20)
            .map(|i| {
                Some(Keystroke {
                    byte: (b'a' + (i % 2) as u8),
                    ticks: (i as u64) * 10 * MS,
                })
            })
            .collect();
        let mut backend = ScriptedBackend::new(script);
        let mut collector = KeystrokeCollector::new(&mut backend, KeystrokeConfig::default());
        let mut out = [0u8; 32];
        // Nothing is ever accepted, so the script drains into a timeout.
        assert!(matches!(
            collector.gather(&mut out),
            Err(KeystrokeError::Timeout { .. })
        ));
    }

    #[test]
    fn test_zero_block_size_treated_as_one() {
        let cfg = KeystrokeConfig {
            block_deltas: 0,
            ..KeystrokeConfig::default()
        };
        // One accepted difference per block: two keystrokes fill 32 bytes.
        let mut backend = ScriptedBackend::new(steady_script(2));
        let mut collector = KeystrokeCollector::new(&mut backend, cfg);

        let mut out = [0u8; 32];
        collector.gather(&mut out).unwrap();
        assert!(out.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_timeout_reports_completed_blocks() {
        // One full block, then silence.
        let mut script = steady_script(129);
        script.push(None);
        let mut backend = ScriptedBackend::new(script);
        let mut collector = KeystrokeCollector::new(&mut backend, KeystrokeConfig::default());

        let mut out = [0u8; 64];
        assert_eq!(
            collector.gather(&mut out),
            Err(KeystrokeError::Timeout { completed_blocks: 1 })
        );
    }

    #[test]
    fn test_coarse_clock_unavailable() {
        let mut backend = ScriptedBackend::new(steady_script(4)).with_frequency(1_000_000);
        let mut collector = KeystrokeCollector::new(&mut backend, KeystrokeConfig::default());
        let mut out = [0u8; 32];
        assert_eq!(collector.gather(&mut out), Err(KeystrokeError::Unavailable));
        // Never switched modes on an unusable backend.
        assert_eq!(backend.echo_off_calls, 0);
    }

    #[test]
    fn test_harvested_source_drains_once() {
        use crate::entropy::{EntropyError, EntropySource};
        use zeroize::Zeroizing;

        let mut src = HarvestedSource::new(Zeroizing::new(vec![1, 2, 3, 4]));
        let mut buf = [0u8; 4];
        src.fill(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(src.fill(&mut buf), Err(EntropyError::Exhausted));
    }
}
