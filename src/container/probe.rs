//! Length probing for containers.
//!
//! Containers do not encode their payload length, so readers recover it
//! from the observed file size: each candidate payload length maps to a
//! size interval `[min_size, max_size]` spanning the iteration-count range.
//! Candidate lengths at least 8 bytes apart keep the intervals disjoint
//! (the iteration field varies by at most 3 bytes), so the first interval
//! containing the observed size identifies the payload length.

use super::codec::{max_size, min_size};

/// Ordered table of candidate payload lengths with their size bounds.
#[derive(Debug, Clone)]
pub struct ProbeTable {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    payload_len: usize,
    min: usize,
    max: usize,
}

impl ProbeTable {
    /// Builds a table from ascending candidate payload lengths.
    pub fn new(candidates: &[usize]) -> Self {
        debug_assert!(candidates.windows(2).all(|w| w[0] < w[1]));
        let entries = candidates
            .iter()
            .map(|&payload_len| Entry {
                payload_len,
                min: min_size(payload_len),
                max: max_size(payload_len),
            })
            .collect();
        Self { entries }
    }

    /// Candidates for share containers: one share per security level
    /// 128/192/256, payload `level/8 + 1` bytes.
    pub fn share_payloads() -> Self {
        Self::new(&[17, 25, 33])
    }

    /// Candidates for private-key containers: key lengths at the three
    /// security levels.
    pub fn key_payloads() -> Self {
        Self::new(&[32, 48, 64])
    }

    /// Returns the payload length whose interval contains `observed_size`,
    /// or `None` when no candidate matches.
    pub fn lookup(&self, observed_size: usize) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| observed_size >= e.min && observed_size <= e.max)
            .map(|e| e.payload_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ITERATIONS_MIN, SALT_LEN};

    #[test]
    fn test_every_candidate_maps_back() {
        let table = ProbeTable::share_payloads();
        for payload_len in [17usize, 25, 33] {
            for size in min_size(payload_len)..=max_size(payload_len) {
                assert_eq!(table.lookup(size), Some(payload_len), "size {}", size);
            }
        }
    }

    #[test]
    fn test_real_container_size_probes_correctly() {
        let payload = [0u8; 17];
        let salt = [9u8; SALT_LEN];
        let blob =
            crate::container::wrap(&payload, b"pw", &salt, ITERATIONS_MIN).unwrap();
        assert_eq!(ProbeTable::share_payloads().lookup(blob.len()), Some(17));
    }

    #[test]
    fn test_out_of_band_sizes_rejected() {
        let table = ProbeTable::share_payloads();
        assert_eq!(table.lookup(0), None);
        assert_eq!(table.lookup(min_size(17) - 1), None);
        assert_eq!(table.lookup(max_size(17) + 1), None); // gap before 25
        assert_eq!(table.lookup(max_size(33) + 1), None);
        assert_eq!(table.lookup(10_000), None);
    }

    #[test]
    fn test_key_table_is_disjoint() {
        let table = ProbeTable::key_payloads();
        assert_eq!(table.lookup(min_size(32)), Some(32));
        assert_eq!(table.lookup(max_size(48)), Some(48));
        assert_eq!(table.lookup(min_size(64)), Some(64));
        // Intervals must not bleed into each other.
        assert!(max_size(32) < min_size(48));
        assert!(max_size(48) < min_size(64));
    }
}
