use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_core::RngCore;
use rand_distr::{Distribution, Normal};

/// Deterministic randomness source backed by ChaCha8.
pub struct Source {
    source: ChaCha8Rng,
}

/// Returns a fresh seed drawn from the thread-local OS-seeded generator.
pub fn new_seed() -> [u8; 32] {
    let mut seed: [u8; 32] = [0u8; 32];
    rand::rng().fill_bytes(&mut seed);
    seed
}

impl Source {
    pub fn new(seed: [u8; 32]) -> Source {
        Source {
            source: ChaCha8Rng::from_seed(seed),
        }
    }

    pub fn new_seed(&mut self) -> [u8; 32] {
        let mut seed: [u8; 32] = [0u8; 32];
        self.source.fill_bytes(&mut seed);
        seed
    }

    /// Returns an independent source seeded from this one.
    pub fn branch(&mut self) -> Self {
        Source::new(self.new_seed())
    }

    /// Returns a uniform value in [0, max) by rejection on `next_u64() & mask`.
    /// `mask` must cover `max - 1`.
    #[inline(always)]
    pub fn next_u64n(&mut self, max: u64, mask: u64) -> u64 {
        debug_assert!(max != 0, "invalid argument: max = 0");
        debug_assert!(mask >= max - 1, "invalid argument: mask={} < max-1={}", mask, max - 1);
        let mut x: u64 = self.next_u64() & mask;
        while x >= max {
            x = self.next_u64() & mask;
        }
        x
    }

    /// Returns a uniform value in {-1, 0, 1}.
    #[inline(always)]
    pub fn next_i64_ternary(&mut self) -> i64 {
        self.next_u64n(3, 3) as i64 - 1
    }

    /// Returns a sample of the given normal distribution rounded to the nearest integer.
    #[inline(always)]
    pub fn next_i64_gaussian(&mut self, normal: &Normal<f64>) -> i64 {
        normal.sample(self).round() as i64
    }
}

impl RngCore for Source {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.source.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.source.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, bytes: &mut [u8]) {
        self.source.fill_bytes(bytes)
    }
}
