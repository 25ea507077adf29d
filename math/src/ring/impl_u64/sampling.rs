use crate::modulus::WordOps;
use crate::poly::Poly;
use crate::ring::Ring;
use sampling::distributions::Distributions;
use sampling::source::Source;

impl Ring<u64> {
    pub fn fill_uniform(&self, source: &mut Source, a: &mut Poly<u64>) {
        let max: u64 = self.q();
        let mask: u64 = max.mask();
        a.0.iter_mut()
            .for_each(|a| *a = source.next_u64n(max, mask));
    }

    /// Fills a with samples of dist mapped into [0, q).
    pub fn fill_dist(&self, dist: &Distributions, source: &mut Source, a: &mut Poly<u64>) {
        let q: i64 = self.q() as i64;
        a.0.iter_mut()
            .for_each(|a| *a = dist.sample(source).rem_euclid(q) as u64);
    }
}
