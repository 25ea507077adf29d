use itertools::izip;
use math::modulus::ReduceOnce;
use sampling::source::Source;

use crate::lwe::ciphertext::LweCiphertext;
use crate::lwe::encrypt_sk;
use crate::lwe::keys::LweSecretKey;
use crate::params::LweParams;

/// Switches ciphertexts under a dimension-N secret to a dimension-n secret at
/// modulus q_ks. Row i * digits + j encrypts s_in[i] * base^j under s_out.
#[derive(Clone, Debug)]
pub struct LweKeySwitchKey {
    base: u64,
    digits: usize,
    modulus: u64,
    n_out: usize,
    rows: Vec<LweCiphertext>,
}

impl LweKeySwitchKey {
    pub fn generate(
        params: &LweParams,
        sk_out: &LweSecretKey,
        sk_in: &LweSecretKey,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Self {
        let modulus: u64 = params.q_ks();
        let base: u64 = params.base_ks();
        let digits: usize = params.digits_ks();
        let mut rows: Vec<LweCiphertext> = Vec::with_capacity(sk_in.n() * digits);
        sk_in.0.iter().for_each(|&s| {
            let mut pt: u64 = s.rem_euclid(modulus as i64) as u64;
            (0..digits).for_each(|_| {
                rows.push(encrypt_sk(
                    sk_out,
                    pt,
                    modulus,
                    params.normal(),
                    source_xa,
                    source_xe,
                ));
                pt = ((pt as u128 * base as u128) % modulus as u128) as u64;
            });
        });
        Self {
            base,
            digits,
            modulus,
            n_out: sk_out.n(),
            rows,
        }
    }

    pub fn n_in(&self) -> usize {
        self.rows.len() / self.digits
    }

    pub fn n_out(&self) -> usize {
        self.n_out
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Key-switches a ciphertext at modulus q_ks.
    pub fn key_switch(&self, ct: &LweCiphertext) -> LweCiphertext {
        debug_assert!(ct.modulus() == self.modulus, "ct.modulus()={} != q_ks={}", ct.modulus(), self.modulus);
        debug_assert!(ct.n() == self.n_in(), "ct.n()={} != n_in={}", ct.n(), self.n_in());
        let q: u64 = self.modulus;
        let mut res: LweCiphertext = LweCiphertext::zero(self.n_out, q).with_pt_modulus(ct.pt_modulus());
        res.b = ct.b;
        izip!(ct.a.iter(), self.rows.chunks_exact(self.digits)).for_each(|(&a, rows)| {
            let mut x: u64 = a;
            rows.iter().for_each(|row| {
                let digit: u64 = x % self.base;
                x /= self.base;
                if digit != 0 {
                    izip!(res.a.iter_mut(), row.a.iter()).for_each(|(r, k)| {
                        *r = (*r + q - ((digit as u128 * *k as u128) % q as u128) as u64).reduce_once(q)
                    });
                    res.b = (res.b + q - ((digit as u128 * row.b as u128) % q as u128) as u64)
                        .reduce_once(q);
                }
            });
        });
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lwe::{decrypt, encrypt};
    use crate::params::{BinFheParams, TOY};

    #[test]
    fn key_switch_preserves_message() {
        let params: BinFheParams = BinFheParams::new(&TOY).unwrap();
        let lwe: &LweParams = params.lwe();
        let mut source_xs: Source = Source::new([0u8; 32]);
        let mut source_xa: Source = Source::new([1u8; 32]);
        let mut source_xe: Source = Source::new([2u8; 32]);

        let mut sk_in: LweSecretKey = LweSecretKey::new(64);
        sk_in.fill_ternary(&mut source_xs);
        let mut sk_out: LweSecretKey = LweSecretKey::new(lwe.n());
        sk_out.fill_ternary(&mut source_xs);

        let ksk: LweKeySwitchKey =
            LweKeySwitchKey::generate(lwe, &sk_out, &sk_in, &mut source_xa, &mut source_xe);
        assert_eq!(ksk.n_in(), 64);
        assert_eq!(ksk.n_out(), lwe.n());

        (0..8u64).for_each(|m| {
            let ct: LweCiphertext = encrypt(
                &sk_in,
                m,
                8,
                lwe.q_ks(),
                lwe.normal(),
                &mut source_xa,
                &mut source_xe,
            );
            let ct_ks: LweCiphertext = ksk.key_switch(&ct);
            assert_eq!(decrypt(&sk_out, &ct_ks, 8), m);
        });
    }
}
