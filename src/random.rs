//! Splittable pseudorandom number generation.
//!
//! Every stateful search component owns its own [`SplittableRng`]. When a
//! component is split for use on another thread, its generator is split as
//! well, so no two threads ever contend for one generator.
//!
//! # Global seeding
//!
//! [`configure_seed`] installs a process-wide master stream. Generators
//! created with [`SplittableRng::new`] *after* the call are split off that
//! master, which makes a single-threaded program reproducible. Components
//! constructed before the call keep whatever seed they already had.
//!
//! # References
//!
//! - Steele, Lea & Flood (2014), "Fast Splittable Pseudorandom Number Generators"

use parking_lot::Mutex;
use rand::{RngCore, SeedableRng};

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

static MASTER: Mutex<Option<SplittableRng>> = Mutex::new(None);

/// Seeds the process-wide master stream.
///
/// Affects only generators created by [`SplittableRng::new`] after this
/// call returns.
pub fn configure_seed(seed: u64) {
    *MASTER.lock() = Some(SplittableRng::seed_from_u64(seed));
    tracing::debug!(seed, "configured global random seed");
}

/// Removes the process-wide master stream; later generators are seeded
/// from system entropy again.
pub fn clear_seed() {
    *MASTER.lock() = None;
}

/// SplitMix64 generator with a per-stream gamma.
///
/// `split` derives a child stream from two outputs of the parent: one
/// becomes the child's seed, the other is mixed into an odd gamma with
/// enough bit transitions. Parent and child continue on statistically
/// independent sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplittableRng {
    seed: u64,
    gamma: u64,
}

impl SplittableRng {
    /// Creates a generator from the global master stream if one is
    /// configured, otherwise from system entropy.
    pub fn new() -> Self {
        match MASTER.lock().as_mut() {
            Some(master) => master.split(),
            None => Self::seed_from_u64(rand::random()),
        }
    }

    /// Derives an independent generator, advancing this one.
    pub fn split(&mut self) -> Self {
        let seed = mix64(self.next_seed());
        let gamma = mix_gamma(self.next_seed());
        Self { seed, gamma }
    }

    fn next_seed(&mut self) -> u64 {
        self.seed = self.seed.wrapping_add(self.gamma);
        self.seed
    }
}

impl Default for SplittableRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for SplittableRng {
    fn next_u32(&mut self) -> u32 {
        mix32(self.next_seed())
    }

    fn next_u64(&mut self) -> u64 {
        mix64(self.next_seed())
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut chunks = dst.chunks_exact_mut(8);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.next_u64().to_le_bytes());
        }
        let rest = chunks.into_remainder();
        if !rest.is_empty() {
            let bytes = self.next_u64().to_le_bytes();
            rest.copy_from_slice(&bytes[..rest.len()]);
        }
    }
}

impl SeedableRng for SplittableRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::seed_from_u64(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(seed: u64) -> Self {
        Self {
            seed,
            gamma: GOLDEN_GAMMA,
        }
    }
}

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn mix32(mut z: u64) -> u32 {
    z = (z ^ (z >> 33)).wrapping_mul(0x62a9_d9ed_7997_05f5);
    ((z ^ (z >> 28)).wrapping_mul(0xcb24_d0a5_c88c_35b3) >> 32) as u32
}

/// Odd gamma with at least 24 bit transitions.
fn mix_gamma(mut z: u64) -> u64 {
    z = (z ^ (z >> 33)).wrapping_mul(0xff51_afd7_ed55_8ccd);
    z = (z ^ (z >> 33)).wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    z = (z ^ (z >> 33)) | 1;
    if (z ^ (z >> 1)).count_ones() < 24 {
        z ^ 0xaaaa_aaaa_aaaa_aaaa
    } else {
        z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SplittableRng::seed_from_u64(42);
        let mut b = SplittableRng::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_known_splitmix_output() {
        // Reference value of SplitMix64 seeded with 0.
        let mut rng = SplittableRng::seed_from_u64(0);
        assert_eq!(rng.next_u64(), 0xe220_a839_7b1d_cdaf);
    }

    #[test]
    fn test_split_is_deterministic() {
        let mut a = SplittableRng::seed_from_u64(7);
        let mut b = SplittableRng::seed_from_u64(7);
        let mut ca = a.split();
        let mut cb = b.split();
        for _ in 0..50 {
            assert_eq!(ca.next_u64(), cb.next_u64());
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_split_diverges_from_parent() {
        let mut parent = SplittableRng::seed_from_u64(7);
        let mut child = parent.split();
        let p: Vec<u64> = (0..16).map(|_| parent.next_u64()).collect();
        let c: Vec<u64> = (0..16).map(|_| child.next_u64()).collect();
        assert_ne!(p, c);
    }

    #[test]
    fn test_split_gamma_is_odd() {
        let mut rng = SplittableRng::seed_from_u64(123);
        for _ in 0..20 {
            let child = rng.split();
            assert_eq!(child.gamma & 1, 1);
        }
    }

    #[test]
    fn test_fill_bytes_partial_chunk() {
        let mut rng = SplittableRng::seed_from_u64(5);
        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = SplittableRng::seed_from_u64(99);
        for _ in 0..1000 {
            let u: f64 = rng.random();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
