use math::modulus::ReduceOnce;
use math::poly::Poly;
use math::ring::Ring;
use rand_distr::Normal;
use sampling::distributions::Distributions;
use sampling::source::Source;

use crate::lwe::{LweCiphertext, LweSecretKey};

/// Ring secret z, kept in NTT form.
#[derive(Clone, Debug)]
pub struct RlweSecretKey {
    poly_ntt: Poly<u64>,
}

impl RlweSecretKey {
    /// Lifts a dimension-N LWE secret to the ring.
    pub fn from_lwe(ring: &Ring<u64>, sk: &LweSecretKey) -> Self {
        assert!(sk.n() == ring.n(), "sk.n()={} != ring.n()={}", sk.n(), ring.n());
        let mut poly: Poly<u64> = ring.new_poly();
        ring.from_signed(&sk.0, &mut poly);
        let mut poly_ntt: Poly<u64> = ring.new_poly();
        ring.ntt::<false>(&poly, &mut poly_ntt);
        Self { poly_ntt }
    }

    /// res <- a * z, with a in coefficient form.
    fn mul(&self, ring: &Ring<u64>, a: &Poly<u64>, res: &mut Poly<u64>) {
        ring.ntt::<false>(a, res);
        let mut tmp: Poly<u64> = ring.new_poly();
        ring.mul_ntt(res, &self.poly_ntt, &mut tmp);
        ring.intt_inplace::<false>(&mut tmp);
        res.copy_from(&tmp);
    }
}

/// RLWE ciphertext (a, b) in coefficient form, with phase b - a * z.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RlweCiphertext {
    pub a: Poly<u64>,
    pub b: Poly<u64>,
}

impl RlweCiphertext {
    pub fn new(ring: &Ring<u64>) -> Self {
        Self {
            a: ring.new_poly(),
            b: ring.new_poly(),
        }
    }

    /// Trivial encryption (0, pt).
    pub fn trivial(ring: &Ring<u64>, pt: Poly<u64>) -> Self {
        Self { a: ring.new_poly(), b: pt }
    }

    pub fn encrypt_sk(
        ring: &Ring<u64>,
        sk: &RlweSecretKey,
        pt: Option<&Poly<u64>>,
        normal: &Normal<f64>,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Self {
        let mut ct: RlweCiphertext = RlweCiphertext::new(ring);
        ring.fill_uniform(source_xa, &mut ct.a);
        sk.mul(ring, &ct.a, &mut ct.b);
        let mut e: Poly<u64> = ring.new_poly();
        ring.fill_dist(&Distributions::Normal(*normal), source_xe, &mut e);
        ring.add_inplace(&e, &mut ct.b);
        if let Some(pt) = pt {
            ring.add_inplace(pt, &mut ct.b);
        }
        ct
    }

    /// Encrypts under the public key (p_a, p_b) as (p_a * u + e1, p_b * u + e2 + pt).
    pub fn encrypt_pk(
        ring: &Ring<u64>,
        pk: &RlwePublicKey,
        pt: Option<&Poly<u64>>,
        normal: &Normal<f64>,
        source_xu: &mut Source,
        source_xe: &mut Source,
    ) -> Self {
        let dist: Distributions = Distributions::Normal(*normal);
        let mut u: Poly<u64> = ring.new_poly();
        ring.fill_dist(&Distributions::Ternary, source_xu, &mut u);
        let mut u_ntt: Poly<u64> = ring.new_poly();
        ring.ntt::<false>(&u, &mut u_ntt);

        let mut ct: RlweCiphertext = RlweCiphertext::new(ring);
        ring.mul_ntt(&pk.a_ntt, &u_ntt, &mut ct.a);
        ring.mul_ntt(&pk.b_ntt, &u_ntt, &mut ct.b);
        ring.intt_inplace::<false>(&mut ct.a);
        ring.intt_inplace::<false>(&mut ct.b);

        let mut e: Poly<u64> = ring.new_poly();
        ring.fill_dist(&dist, source_xe, &mut e);
        ring.add_inplace(&e, &mut ct.a);
        ring.fill_dist(&dist, source_xe, &mut e);
        ring.add_inplace(&e, &mut ct.b);
        if let Some(pt) = pt {
            ring.add_inplace(pt, &mut ct.b);
        }
        ct
    }

    /// pt <- b - a * z.
    pub fn decrypt(&self, ring: &Ring<u64>, sk: &RlweSecretKey, pt: &mut Poly<u64>) {
        let mut az: Poly<u64> = ring.new_poly();
        sk.mul(ring, &self.a, &mut az);
        ring.sub(&self.b, &az, pt);
    }

    /// Extracts the constant coefficient as an LWE ciphertext of dimension N
    /// under the coefficients of z, adding `offset` to the body.
    pub fn extract_lwe(&self, ring: &Ring<u64>, offset: u64) -> LweCiphertext {
        let q: u64 = ring.q();
        let n: usize = ring.n();
        let mut a: Vec<u64> = Vec::with_capacity(n);
        a.push(self.a.0[0]);
        a.extend(
            (1..n).map(|i| (q - self.a.0[n - i]).reduce_once(q)),
        );
        LweCiphertext::new(a, (self.b.0[0] + offset % q).reduce_once(q), q)
    }
}

/// Public key (a, a * z + e), stored in NTT form.
#[derive(Clone, Debug)]
pub struct RlwePublicKey {
    a_ntt: Poly<u64>,
    b_ntt: Poly<u64>,
}

impl RlwePublicKey {
    pub fn generate(
        ring: &Ring<u64>,
        sk: &RlweSecretKey,
        normal: &Normal<f64>,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Self {
        let ct: RlweCiphertext = RlweCiphertext::encrypt_sk(ring, sk, None, normal, source_xa, source_xe);
        let mut a_ntt: Poly<u64> = ring.new_poly();
        let mut b_ntt: Poly<u64> = ring.new_poly();
        ring.ntt::<false>(&ct.a, &mut a_ntt);
        ring.ntt::<false>(&ct.b, &mut b_ntt);
        Self { a_ntt, b_ntt }
    }
}
