use itertools::izip;
use math::modulus::ReduceOnce;
use sampling::source::Source;

use crate::lwe::ciphertext::LweCiphertext;

/// LWE secret with coefficients in {-1, 0, 1}.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LweSecretKey(pub Vec<i64>);

impl LweSecretKey {
    pub fn new(n: usize) -> Self {
        Self(vec![0i64; n])
    }

    pub fn n(&self) -> usize {
        self.0.len()
    }

    pub fn fill_ternary(&mut self, source: &mut Source) {
        self.0.iter_mut().for_each(|s| *s = source.next_i64_ternary());
    }

    /// Returns <a, s> mod modulus.
    pub fn dot(&self, a: &[u64], modulus: u64) -> u64 {
        debug_assert!(a.len() == self.n(), "a.len()={} != n={}", a.len(), self.n());
        izip!(a.iter(), self.0.iter()).fold(0u64, |acc, (a, s)| match s {
            0 => acc,
            1 => (acc + a).reduce_once(modulus),
            -1 => (acc + modulus - a).reduce_once(modulus),
            s => {
                let s: u128 = s.rem_euclid(modulus as i64) as u128;
                (acc + ((*a as u128 * s) % modulus as u128) as u64).reduce_once(modulus)
            }
        })
    }

    /// Returns b - <a, s> mod modulus.
    pub fn phase(&self, ct: &LweCiphertext) -> u64 {
        let q: u64 = ct.modulus();
        (ct.b + q - self.dot(&ct.a, q)).reduce_once(q)
    }
}
