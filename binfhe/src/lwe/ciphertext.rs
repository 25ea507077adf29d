use std::ops::{Add, AddAssign, Sub, SubAssign};

use itertools::izip;
use math::modulus::ReduceOnce;

/// LWE ciphertext (a, b) with phase b - <a, s> mod `modulus`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LweCiphertext {
    pub a: Vec<u64>,
    pub b: u64,
    pub modulus: u64,
    pub pt_modulus: u64,
}

/// Returns round(x * to / from) mod to.
#[inline(always)]
pub(crate) fn round_mod(x: u64, from: u64, to: u64) -> u64 {
    let r: u128 = (x as u128 * to as u128 + (from >> 1) as u128) / from as u128;
    (r % to as u128) as u64
}

impl LweCiphertext {
    /// Plaintext modulus given to ciphertexts that do not carry one explicitly.
    pub const DEFAULT_PT_MODULUS: u64 = 4;

    pub fn new(a: Vec<u64>, b: u64, modulus: u64) -> Self {
        Self {
            a,
            b,
            modulus,
            pt_modulus: Self::DEFAULT_PT_MODULUS,
        }
    }

    pub fn zero(n: usize, modulus: u64) -> Self {
        Self::new(vec![0u64; n], 0, modulus)
    }

    pub fn n(&self) -> usize {
        self.a.len()
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn pt_modulus(&self) -> u64 {
        self.pt_modulus
    }

    pub fn set_pt_modulus(&mut self, pt_modulus: u64) {
        self.pt_modulus = pt_modulus
    }

    pub fn with_pt_modulus(mut self, pt_modulus: u64) -> Self {
        self.pt_modulus = pt_modulus;
        self
    }

    pub fn add_const_assign(&mut self, c: u64) {
        self.b = (self.b + c % self.modulus).reduce_once(self.modulus);
    }

    pub fn sub_const_assign(&mut self, c: u64) {
        self.b = (self.b + self.modulus - c % self.modulus).reduce_once(self.modulus);
    }

    pub fn mul_const_assign(&mut self, c: u64) {
        let q: u128 = self.modulus as u128;
        let c: u128 = c as u128 % q;
        self.a
            .iter_mut()
            .for_each(|a| *a = ((*a as u128 * c) % q) as u64);
        self.b = ((self.b as u128 * c) % q) as u64;
    }

    /// Reinterprets the ciphertext at `modulus`, reducing every component.
    pub fn set_modulus(&mut self, modulus: u64) {
        self.a.iter_mut().for_each(|a| *a %= modulus);
        self.b %= modulus;
        self.modulus = modulus;
    }

    /// Rescales the ciphertext to `modulus` with round-to-nearest.
    pub fn mod_switch(&self, modulus: u64) -> Self {
        let from: u64 = self.modulus;
        Self {
            a: self.a.iter().map(|&a| round_mod(a, from, modulus)).collect(),
            b: round_mod(self.b, from, modulus),
            modulus,
            pt_modulus: self.pt_modulus,
        }
    }
}

impl AddAssign<&LweCiphertext> for LweCiphertext {
    fn add_assign(&mut self, rhs: &LweCiphertext) {
        debug_assert!(self.modulus == rhs.modulus, "modulus mismatch {} != {}", self.modulus, rhs.modulus);
        debug_assert!(self.n() == rhs.n(), "dimension mismatch {} != {}", self.n(), rhs.n());
        let q: u64 = self.modulus;
        izip!(self.a.iter_mut(), rhs.a.iter()).for_each(|(a, b)| *a = (*a + *b).reduce_once(q));
        self.b = (self.b + rhs.b).reduce_once(q);
    }
}

impl SubAssign<&LweCiphertext> for LweCiphertext {
    fn sub_assign(&mut self, rhs: &LweCiphertext) {
        debug_assert!(self.modulus == rhs.modulus, "modulus mismatch {} != {}", self.modulus, rhs.modulus);
        debug_assert!(self.n() == rhs.n(), "dimension mismatch {} != {}", self.n(), rhs.n());
        let q: u64 = self.modulus;
        izip!(self.a.iter_mut(), rhs.a.iter()).for_each(|(a, b)| *a = (*a + q - *b).reduce_once(q));
        self.b = (self.b + q - rhs.b).reduce_once(q);
    }
}

impl Add<&LweCiphertext> for LweCiphertext {
    type Output = LweCiphertext;

    fn add(mut self, rhs: &LweCiphertext) -> LweCiphertext {
        self += rhs;
        self
    }
}

impl Sub<&LweCiphertext> for LweCiphertext {
    type Output = LweCiphertext;

    fn sub(mut self, rhs: &LweCiphertext) -> LweCiphertext {
        self -= rhs;
        self
    }
}
