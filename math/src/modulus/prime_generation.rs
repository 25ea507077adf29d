use crate::modulus::prime::{is_prime, Prime};

/// Enumerates primes q = 1 mod nth_root below 2^bit_size, staying within
/// half a bit of 2^bit_size.
pub struct NTTFriendlyPrimesGenerator {
    size: f64,
    prev_prime: u64,
    nth_root: u64,
    exhausted: bool,
}

impl NTTFriendlyPrimesGenerator {
    pub fn new(bit_size: u64, nth_root: u64) -> Self {
        assert!(
            (2..62).contains(&bit_size),
            "invalid argument: bit_size={} must be in [2, 62)",
            bit_size
        );
        assert!(
            nth_root & (nth_root - 1) == 0 && nth_root < (1 << bit_size),
            "invalid argument: nth_root={} must be a power of two < 2^bit_size",
            nth_root
        );
        Self {
            size: bit_size as f64,
            prev_prime: (1 << bit_size) + 1 - nth_root,
            nth_root,
            exhausted: false,
        }
    }

    #[inline(always)]
    fn out_of_range(&self) -> bool {
        self.size - (self.prev_prime as f64).log2() >= 0.5 || self.prev_prime < self.nth_root
    }

    /// Returns the next prime below 2^bit_size, or None once the range is exhausted.
    pub fn next_downstream_prime(&mut self) -> Option<Prime<u64>> {
        while !self.exhausted {
            if self.out_of_range() {
                self.exhausted = true;
                break;
            }
            let candidate: u64 = self.prev_prime;
            self.prev_prime -= self.nth_root;
            if is_prime(candidate) {
                return Some(Prime::new_unchecked(candidate));
            }
        }
        None
    }
}
