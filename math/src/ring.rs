pub mod impl_u64;

use crate::dft::DFT;
use crate::modulus::prime::Prime;
use crate::modulus::WordOps;
use crate::poly::Poly;

/// Negacyclic ring Z_q[X]/(X^n + 1) with q an NTT-friendly prime.
pub struct Ring<O> {
    pub n: usize,
    pub modulus: Prime<O>,
    pub dft: Box<dyn DFT<O> + Send + Sync>,
}

impl<O> Ring<O> {
    pub fn log_n(&self) -> usize {
        self.n().log2()
    }

    pub fn n(&self) -> usize {
        self.n
    }
}

impl Ring<u64> {
    pub fn q(&self) -> u64 {
        self.modulus.q
    }

    pub fn new_poly(&self) -> Poly<u64> {
        Poly::<u64>::new(self.n())
    }
}

impl std::fmt::Debug for Ring<u64> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ring")
            .field("n", &self.n)
            .field("q", &self.modulus.q)
            .finish()
    }
}
