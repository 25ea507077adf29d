use itertools::izip;
use math::poly::Poly;
use math::ring::Ring;
use rand_distr::Normal;
use sampling::source::Source;

use crate::rlwe::{RlweCiphertext, RlweSecretKey};

/// RGSW ciphertext of a scalar mu. Row 2k encrypts zero with mu * base^k added
/// to the mask, row 2k + 1 encrypts mu * base^k. Rows are kept in NTT form.
#[derive(Clone, Debug)]
pub struct RgswCiphertext {
    base_g: u64,
    rows: Vec<RlweCiphertext>,
}

impl RgswCiphertext {
    #[allow(clippy::too_many_arguments)]
    pub fn encrypt_sk(
        ring: &Ring<u64>,
        sk: &RlweSecretKey,
        mu: u64,
        base_g: u64,
        digits: usize,
        normal: &Normal<f64>,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Self {
        let q: u64 = ring.q();
        let mut rows: Vec<RlweCiphertext> = Vec::with_capacity(2 * digits);
        let mut g: u64 = mu % q;
        (0..digits).for_each(|_| {
            let mut row_a: RlweCiphertext = RlweCiphertext::encrypt_sk(ring, sk, None, normal, source_xa, source_xe);
            ring.add_scalar_inplace(g, &mut row_a.a);
            let mut row_b: RlweCiphertext = RlweCiphertext::encrypt_sk(ring, sk, None, normal, source_xa, source_xe);
            ring.add_scalar_inplace(g, &mut row_b.b);
            [row_a, row_b].into_iter().for_each(|mut row| {
                ring.ntt_inplace::<false>(&mut row.a);
                ring.ntt_inplace::<false>(&mut row.b);
                rows.push(row);
            });
            g = ((g as u128 * base_g as u128) % q as u128) as u64;
        });
        Self { base_g, rows }
    }

    pub fn base_g(&self) -> u64 {
        self.base_g
    }

    pub fn digits(&self) -> usize {
        self.rows.len() >> 1
    }
}

/// Decomposes every coefficient of `a` into centered digits in [-base/2, base/2).
/// The last digit absorbs the remainder so that sum_k out[k] * base^k = a.
pub fn signed_decompose(ring: &Ring<u64>, a: &Poly<u64>, base_g: u64, out: &mut [Poly<u64>]) {
    debug_assert!(base_g.is_power_of_two(), "base_g={} is not a power of two", base_g);
    let q: i64 = ring.q() as i64;
    let log_base: u32 = base_g.trailing_zeros();
    let mask: i64 = base_g as i64 - 1;
    let half: i64 = (base_g >> 1) as i64;
    let last: usize = out.len() - 1;
    a.0.iter().enumerate().for_each(|(i, &x)| {
        let mut v: i64 = ring.center(x);
        out.iter_mut().enumerate().for_each(|(k, digit)| {
            let r: i64 = match k == last {
                true => v,
                false => {
                    let mut r: i64 = v & mask;
                    if r >= half {
                        r -= base_g as i64;
                    }
                    v = (v - r) >> log_base;
                    r
                }
            };
            digit.0[i] = r.rem_euclid(q) as u64;
        });
    });
}

/// res <- acc ⊡ rgsw, with acc and res in coefficient form.
pub fn external_product(ring: &Ring<u64>, acc: &RlweCiphertext, rgsw: &RgswCiphertext, res: &mut RlweCiphertext) {
    let mut digits: Vec<Poly<u64>> = vec![ring.new_poly(); rgsw.digits()];
    res.a.zero();
    res.b.zero();
    [&acc.a, &acc.b].iter().enumerate().for_each(|(offset, src)| {
        signed_decompose(ring, src, rgsw.base_g, &mut digits);
        izip!(digits.iter_mut(), rgsw.rows.iter().skip(offset).step_by(2)).for_each(|(digit, row)| {
            ring.ntt_inplace::<false>(digit);
            ring.mul_ntt_add(digit, &row.a, &mut res.a);
            ring.mul_ntt_add(digit, &row.b, &mut res.b);
        });
    });
    ring.intt_inplace::<false>(&mut res.a);
    ring.intt_inplace::<false>(&mut res.b);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lwe::{self, LweSecretKey};
    use crate::params::{BinFheParams, TOY};

    #[test]
    fn decompose_recomposes() {
        let params: BinFheParams = BinFheParams::new(&TOY).unwrap();
        let ring: &Ring<u64> = params.ring();
        let q: u64 = ring.q();
        let mut source: Source = Source::new([0u8; 32]);
        let mut a: Poly<u64> = ring.new_poly();
        ring.fill_uniform(&mut source, &mut a);
        a.0[0] = 0;
        a.0[1] = q - 1;
        a.0[2] = q >> 1;
        [1u64 << 10, 1 << 14, 1 << 20].iter().for_each(|&base| {
            let d: usize = params.ring_gsw().digits(base);
            let mut out: Vec<Poly<u64>> = vec![ring.new_poly(); d];
            signed_decompose(ring, &a, base, &mut out);
            (0..ring.n()).for_each(|i| {
                let mut x: u128 = 0;
                let mut g: u128 = 1;
                out.iter().for_each(|digit| {
                    x = (x + digit.0[i] as u128 * g) % q as u128;
                    g = g * base as u128 % q as u128;
                });
                assert_eq!(x as u64, a.0[i], "base={} i={}", base, i);
            });
            out[..d - 1].iter().for_each(|digit| {
                assert!(digit.0.iter().all(|&x| ring.center(x).abs() <= (base >> 1) as i64))
            });
        });
    }

    #[test]
    fn external_product_scales_by_mu() {
        let params: BinFheParams = BinFheParams::new(&TOY).unwrap();
        let ring: &Ring<u64> = params.ring();
        let normal: &Normal<f64> = params.lwe().normal();
        let mut source_xs: Source = Source::new([0u8; 32]);
        let mut source_xa: Source = Source::new([1u8; 32]);
        let mut source_xe: Source = Source::new([2u8; 32]);
        let sk_lwe: LweSecretKey = lwe::key_gen(ring.n(), &mut source_xs);
        let sk: RlweSecretKey = RlweSecretKey::from_lwe(ring, &sk_lwe);

        let delta: u64 = ring.q() / 8;
        let pt: Poly<u64> = Poly::from_vec((0..ring.n() as u64).map(|i| (i % 4) * delta).collect());
        let acc: RlweCiphertext =
            RlweCiphertext::encrypt_sk(ring, &sk, Some(&pt), normal, &mut source_xa, &mut source_xe);

        [0u64, 1].iter().for_each(|&mu| {
            let rgsw: RgswCiphertext =
                RgswCiphertext::encrypt_sk(ring, &sk, mu, 1 << 10, 4, normal, &mut source_xa, &mut source_xe);
            assert_eq!(rgsw.digits(), 4);
            let mut res: RlweCiphertext = RlweCiphertext::new(ring);
            external_product(ring, &acc, &rgsw, &mut res);
            let mut have: Poly<u64> = ring.new_poly();
            res.decrypt(ring, &sk, &mut have);
            (0..ring.n()).for_each(|i| {
                let want: u64 = mu * pt.0[i];
                let diff: i64 = ring.center((have.0[i] + ring.q() - want) % ring.q());
                assert!(diff.abs() < (delta >> 4) as i64, "mu={} i={} noise={}", mu, i, diff);
            });
        });
    }
}
