//! Source health policy and generator bring-up.
//!
//! Enumerates the fixed ordered source set, probes each one through the
//! SP 800-90B startup tests, and applies the assurance policy:
//!
//! - one healthy strong physical source (estimate 8.0), or two healthy
//!   independent sources, is sufficient — the generator seeds from the
//!   healthy set alone;
//! - a verdict of insufficient entropy permits exactly one fallback, the
//!   keystroke-timing collector, joining as an auxiliary source;
//! - a failed startup test on a physical source is fatal and propagates
//!   unchanged; no fallback is attempted over broken hardware.

use zeroize::Zeroizing;

use crate::config::KeystrokeConfig;

use super::generator::Generator;
use super::jitter::JitterSource;
use super::keystroke::{HarvestedSource, KeystrokeBackend, KeystrokeCollector, BLOCK_LEN};
use super::selftest::HealthTester;
use super::system::SystemSource;
use super::{EntropyError, EntropySource};

/// Sample size drawn from each source during the startup probe.
const PROBE_LEN: usize = 64;

/// Estimate at or above which a source counts as a strong physical source.
const STRONG_ESTIMATE: f64 = 8.0;

/// The fixed ordered source set for this platform.
pub fn platform_sources() -> Vec<Box<dyn EntropySource>> {
    let mut sources: Vec<Box<dyn EntropySource>> = Vec::new();

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        use super::trng::{RdRandSource, RdSeedSource};
        if let Some(primary) = RdSeedSource::new() {
            sources.push(Box::new(primary));
        }
        if let Some(secondary) = RdRandSource::new() {
            sources.push(Box::new(secondary));
        }
    }

    sources.push(Box::new(SystemSource::new()));
    sources.push(Box::new(JitterSource::new()));
    sources
}

/// Probes one source. `Ok(true)` healthy, `Ok(false)` unavailable or too
/// poor to count, `Err` only for the fatal case: a strong physical source
/// failing its startup tests.
fn probe(source: &mut dyn EntropySource) -> Result<bool, EntropyError> {
    let mut sample = Zeroizing::new([0u8; PROBE_LEN]);
    if let Err(err) = source.fill(&mut *sample) {
        log::warn!("entropy source {} unavailable: {:?}", source.name(), err);
        return Ok(false);
    }

    let mut tester = HealthTester::new();
    for &byte in sample.iter() {
        if tester.feed(byte).is_err() {
            if source.entropy_estimate() >= STRONG_ESTIMATE {
                log::warn!("physical source {} failed startup tests", source.name());
                return Err(EntropyError::HealthTestFailed);
            }
            log::warn!("entropy source {} failed startup tests, dropped", source.name());
            return Ok(false);
        }
    }

    Ok(true)
}

/// Probes every source, returning the healthy subset. Fatal probe results
/// propagate unchanged.
fn probe_all(
    sources: Vec<Box<dyn EntropySource>>,
) -> Result<Vec<Box<dyn EntropySource>>, EntropyError> {
    let mut healthy = Vec::with_capacity(sources.len());
    for mut source in sources {
        if probe(source.as_mut())? {
            healthy.push(source);
        }
    }
    Ok(healthy)
}

fn sufficient(healthy: &[Box<dyn EntropySource>]) -> bool {
    healthy.len() >= 2 || healthy.iter().any(|s| s.entropy_estimate() >= STRONG_ESTIMATE)
}

/// Brings up a generator from the given sources, no fallback.
pub fn bring_up_from(sources: Vec<Box<dyn EntropySource>>) -> Result<Generator, EntropyError> {
    let mut healthy = probe_all(sources)?;
    if !sufficient(&healthy) {
        return Err(EntropyError::InsufficientEntropy);
    }
    log::info!("seeding generator from {} healthy sources", healthy.len());
    Generator::from_sources(&mut healthy)
}

/// Brings up a generator from the platform source set, no fallback.
pub fn bring_up() -> Result<Generator, EntropyError> {
    bring_up_from(platform_sources())
}

/// Brings up a generator from the given sources, falling back to keystroke
/// collection when — and only when — the verdict is insufficient entropy.
pub fn bring_up_from_with_collector<B: KeystrokeBackend>(
    sources: Vec<Box<dyn EntropySource>>,
    cfg: KeystrokeConfig,
    backend: &mut B,
) -> Result<Generator, EntropyError> {
    let mut healthy = probe_all(sources)?;
    if !sufficient(&healthy) {
        log::warn!(
            "insufficient entropy assurance ({} healthy sources), collecting keystrokes",
            healthy.len()
        );
        let mut harvested = Zeroizing::new(vec![0u8; BLOCK_LEN]);
        KeystrokeCollector::new(backend, cfg).gather(&mut harvested)?;
        healthy.push(Box::new(HarvestedSource::new(harvested)));
    }
    Generator::from_sources(&mut healthy)
}

/// Platform source set with keystroke fallback.
pub fn bring_up_with_collector<B: KeystrokeBackend>(
    cfg: KeystrokeConfig,
    backend: &mut B,
) -> Result<Generator, EntropyError> {
    bring_up_from_with_collector(platform_sources(), cfg, backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::keystroke::testing::ScriptedBackend;
    use crate::entropy::keystroke::Keystroke;
    use crate::entropy::testing::ScriptedSource;

    fn boxed(sources: Vec<ScriptedSource>) -> Vec<Box<dyn EntropySource>> {
        sources
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn EntropySource>)
            .collect()
    }

    #[test]
    fn test_one_strong_source_suffices() {
        let gen = bring_up_from(boxed(vec![ScriptedSource::counter(3)])).unwrap();
        assert!(gen.is_valid());
    }

    #[test]
    fn test_two_weak_sources_suffice() {
        let sources = vec![
            ScriptedSource::counter(1).with_estimate(4.0),
            ScriptedSource::counter(9).with_estimate(4.0),
        ];
        let gen = bring_up_from(boxed(sources)).unwrap();
        assert!(gen.is_valid());
    }

    #[test]
    fn test_single_weak_source_is_insufficient() {
        let sources = vec![ScriptedSource::counter(1).with_estimate(4.0)];
        assert_eq!(
            bring_up_from(boxed(sources)).unwrap_err(),
            EntropyError::InsufficientEntropy
        );
    }

    #[test]
    fn test_stuck_physical_source_is_fatal() {
        // A stuck strong source fails RCT; even with a healthy companion,
        // the failure propagates and no generator is produced.
        let sources = vec![ScriptedSource::stuck(0xAA), ScriptedSource::counter(0)];
        assert_eq!(
            bring_up_from(boxed(sources)).unwrap_err(),
            EntropyError::HealthTestFailed
        );
    }

    #[test]
    fn test_stuck_weak_source_is_just_dropped() {
        let sources = vec![
            ScriptedSource::stuck(0x55).with_estimate(4.0),
            ScriptedSource::counter(0),
        ];
        let gen = bring_up_from(boxed(sources)).unwrap();
        assert!(gen.is_valid());
    }

    #[test]
    fn test_unavailable_sources_do_not_abort() {
        let sources = vec![ScriptedSource::failing(), ScriptedSource::counter(0)];
        let gen = bring_up_from(boxed(sources)).unwrap();
        assert!(gen.is_valid());
    }

    #[test]
    fn test_keystroke_fallback_engages_only_when_insufficient() {
        const MS: u64 = 1_000_000;
        let script: Vec<_> = (0..129)
            .map(|i| {
                Some(Keystroke {
                    byte: if i % 2 == 0 { b'j' } else { b'k' },
                    ticks: (i as u64) * 70 * MS,
                })
            })
            .collect();

        // One weak source: fallback engages and the collector runs.
        let mut backend = ScriptedBackend::new(script.clone());
        let sources = vec![ScriptedSource::counter(1).with_estimate(4.0)];
        let gen =
            bring_up_from_with_collector(boxed(sources), KeystrokeConfig::default(), &mut backend)
                .unwrap();
        assert!(gen.is_valid());
        assert_eq!(backend.echo_off_calls, 1);

        // A strong source: no keystrokes consumed.
        let mut backend = ScriptedBackend::new(script);
        let sources = vec![ScriptedSource::counter(1)];
        let gen =
            bring_up_from_with_collector(boxed(sources), KeystrokeConfig::default(), &mut backend)
                .unwrap();
        assert!(gen.is_valid());
        assert_eq!(backend.echo_off_calls, 0);
    }

    #[test]
    fn test_fallback_timeout_propagates() {
        let mut backend = ScriptedBackend::new(vec![None]);
        let sources = vec![ScriptedSource::counter(1).with_estimate(4.0)];
        let err =
            bring_up_from_with_collector(boxed(sources), KeystrokeConfig::default(), &mut backend)
                .unwrap_err();
        assert_eq!(err, EntropyError::Timeout);
    }
}
