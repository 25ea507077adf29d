//! Blind rotation of the bootstrapping accumulator.
//!
//! The accumulator is an RLWE ciphertext of a test vector. [`Accumulator::eval_acc`]
//! multiplies it by `X^{-<a, s> * 2N / q}` for an LWE mask `a`, using an
//! [`AccKey`] that encrypts the LWE secret `s` under the ring secret.
//!
//! | Method | Secret | Key |
//! |--------|--------|-----|
//! | [`AccMethod::Ginx`] | ternary | two RGSW ciphertexts per secret coefficient, for `s_i = 1` and `s_i = -1` |

use itertools::izip;
use math::ring::Ring;
use rand_distr::Normal;
use sampling::source::Source;

use crate::lwe::LweSecretKey;
use crate::params::BinFheParams;
use crate::rgsw::{RgswCiphertext, external_product};
use crate::rlwe::{RlweCiphertext, RlweSecretKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccMethod {
    /// CGGI blind rotation with ternary secrets.
    Ginx,
}

impl AccMethod {
    pub fn accumulator(&self) -> Box<dyn Accumulator + Send + Sync> {
        match self {
            AccMethod::Ginx => Box::new(Ginx),
        }
    }
}

/// Accumulator key for a single gadget base.
#[derive(Clone, Debug)]
pub struct AccKey {
    base_g: u64,
    keys: Vec<[RgswCiphertext; 2]>,
}

impl AccKey {
    pub fn base_g(&self) -> u64 {
        self.base_g
    }

    /// Dimension of the LWE secret the key encrypts.
    pub fn n(&self) -> usize {
        self.keys.len()
    }
}

pub trait Accumulator {
    /// Encrypts `lwe_sk` under the ring secret `skn` with gadget base `base_g`.
    fn key_gen_acc(
        &self,
        params: &BinFheParams,
        skn: &RlweSecretKey,
        lwe_sk: &LweSecretKey,
        base_g: u64,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> AccKey;

    /// acc <- acc * X^{-<a, s> * 2N / modulus}.
    fn eval_acc(&self, params: &BinFheParams, key: &AccKey, acc: &mut RlweCiphertext, a: &[u64], modulus: u64);
}

pub struct Ginx;

impl Accumulator for Ginx {
    fn key_gen_acc(
        &self,
        params: &BinFheParams,
        skn: &RlweSecretKey,
        lwe_sk: &LweSecretKey,
        base_g: u64,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> AccKey {
        let ring: &Ring<u64> = params.ring();
        let digits: usize = params.ring_gsw().digits(base_g);
        let normal: &Normal<f64> = params.lwe().normal();
        let keys: Vec<[RgswCiphertext; 2]> = lwe_sk
            .0
            .iter()
            .map(|&s| {
                [1i64, -1].map(|v| {
                    RgswCiphertext::encrypt_sk(
                        ring,
                        skn,
                        (s == v) as u64,
                        base_g,
                        digits,
                        normal,
                        source_xa,
                        source_xe,
                    )
                })
            })
            .collect();
        AccKey { base_g, keys }
    }

    fn eval_acc(&self, params: &BinFheParams, key: &AccKey, acc: &mut RlweCiphertext, a: &[u64], modulus: u64) {
        let ring: &Ring<u64> = params.ring();
        let two_n: usize = ring.n() << 1;
        debug_assert!(a.len() == key.n(), "a.len()={} != key.n()={}", a.len(), key.n());
        debug_assert!(two_n as u64 % modulus == 0, "modulus={} does not divide 2N={}", modulus, two_n);
        let factor: usize = two_n / modulus as usize;
        let mut tmp: RlweCiphertext = RlweCiphertext::new(ring);
        let mut prod: RlweCiphertext = RlweCiphertext::new(ring);
        izip!(a.iter(), key.keys.iter()).for_each(|(&a_i, [key_pos, key_neg])| {
            let k: usize = ((a_i % modulus) as usize * factor) % two_n;
            if k == 0 {
                return;
            }
            // X^{-k} selects s_i = 1, X^{k} selects s_i = -1.
            [(two_n - k, key_pos), (k, key_neg)].iter().for_each(|(rot, rgsw)| {
                ring.mul_monomial_minus_one(&acc.a, *rot, &mut tmp.a);
                ring.mul_monomial_minus_one(&acc.b, *rot, &mut tmp.b);
                external_product(ring, &tmp, rgsw, &mut prod);
                ring.add_inplace(&prod.a, &mut acc.a);
                ring.add_inplace(&prod.b, &mut acc.b);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lwe;
    use crate::params::TOY;
    use math::poly::Poly;

    #[test]
    fn blind_rotation() {
        let params: BinFheParams = BinFheParams::new(&TOY).unwrap();
        let ring: &Ring<u64> = params.ring();
        let big_q: u64 = ring.q();
        let n_big: usize = ring.n();
        let q: u64 = params.lwe().q();
        let mut source_xs: Source = Source::new([0u8; 32]);
        let mut source_xa: Source = Source::new([1u8; 32]);
        let mut source_xe: Source = Source::new([2u8; 32]);

        let sk: LweSecretKey = lwe::key_gen(params.lwe().n(), &mut source_xs);
        let skn: RlweSecretKey = RlweSecretKey::from_lwe(ring, &lwe::key_gen(n_big, &mut source_xs));
        let acc_method: Box<dyn Accumulator + Send + Sync> = AccMethod::Ginx.accumulator();
        let key: AccKey = acc_method.key_gen_acc(&params, &skn, &sk, 1 << 10, &mut source_xa, &mut source_xe);
        assert_eq!(key.n(), params.lwe().n());
        assert_eq!(key.base_g(), 1 << 10);

        let delta: u64 = big_q / (4 * n_big as u64);
        let tv: Poly<u64> = Poly::from_vec((0..n_big as u64).map(|j| j * delta).collect());

        (0..4).for_each(|_| {
            let a: Vec<u64> = (0..params.lwe().n()).map(|_| source_xa.next_u64n(q, q - 1)).collect();
            let mut acc: RlweCiphertext = RlweCiphertext::trivial(ring, tv.clone());
            acc_method.eval_acc(&params, &key, &mut acc, &a, q);

            let t: usize = (sk.dot(&a, q) as usize * (2 * n_big / q as usize)) % (2 * n_big);
            let want: u64 = match t < n_big {
                true => tv.0[t],
                false => (big_q - tv.0[t - n_big]) % big_q,
            };
            let mut have: Poly<u64> = ring.new_poly();
            acc.decrypt(ring, &skn, &mut have);
            let diff: i64 = ring.center((have.0[0] + big_q - want) % big_q);
            assert!(diff.abs() < (delta >> 1) as i64, "t={} noise={}", t, diff);
        });
    }
}
