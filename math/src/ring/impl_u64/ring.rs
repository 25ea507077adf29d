use crate::dft::ntt::Table;
use crate::modulus::prime::Prime;
use crate::modulus::ReduceOnce;
use crate::poly::Poly;
use crate::ring::Ring;
use itertools::izip;

impl Ring<u64> {
    /// Panics if q is not a prime with q = 1 mod 2n.
    pub fn new(n: usize, q: u64) -> Self {
        assert!(
            n & (n - 1) == 0 && n >= 2,
            "invalid argument: n={} is not a power of two >= 2",
            n
        );
        let prime: Prime<u64> = Prime::<u64>::new(q);
        Self {
            n,
            modulus: prime.clone(),
            dft: Box::new(Table::<u64>::new(prime, (2 * n) as u64)),
        }
    }

    /// Maps signed coefficients into [0, q).
    pub fn from_signed(&self, coeffs: &[i64], a: &mut Poly<u64>) {
        debug_assert!(coeffs.len() == a.n(), "coeffs.len()={} != a.n()={}", coeffs.len(), a.n());
        let q: i64 = self.q() as i64;
        izip!(coeffs.iter(), a.0.iter_mut()).for_each(|(c, a)| *a = c.rem_euclid(q) as u64);
    }

    /// Returns x in (-q/2, q/2].
    #[inline(always)]
    pub fn center(&self, x: u64) -> i64 {
        let q: u64 = self.q();
        if x > q >> 1 {
            x as i64 - q as i64
        } else {
            x as i64
        }
    }
}

impl Ring<u64> {
    pub fn ntt_inplace<const LAZY: bool>(&self, poly: &mut Poly<u64>) {
        match LAZY {
            true => self.dft.forward_inplace_lazy(&mut poly.0),
            false => self.dft.forward_inplace(&mut poly.0),
        }
    }

    pub fn intt_inplace<const LAZY: bool>(&self, poly: &mut Poly<u64>) {
        match LAZY {
            true => self.dft.backward_inplace_lazy(&mut poly.0),
            false => self.dft.backward_inplace(&mut poly.0),
        }
    }

    pub fn ntt<const LAZY: bool>(&self, poly_in: &Poly<u64>, poly_out: &mut Poly<u64>) {
        poly_out.0.copy_from_slice(&poly_in.0);
        self.ntt_inplace::<LAZY>(poly_out);
    }
}

impl Ring<u64> {
    /// b <- a + b.
    #[inline(always)]
    pub fn add_inplace(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        let q: u64 = self.q();
        izip!(a.0.iter(), b.0.iter_mut()).for_each(|(a, b)| *b = (*a + *b).reduce_once(q));
    }

    /// c <- a + b.
    #[inline(always)]
    pub fn add(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        c.copy_from(b);
        self.add_inplace(a, c);
    }

    /// b <- b - a.
    #[inline(always)]
    pub fn sub_inplace(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        let q: u64 = self.q();
        izip!(a.0.iter(), b.0.iter_mut()).for_each(|(a, b)| *b = (*b + q - *a).reduce_once(q));
    }

    /// c <- a - b.
    #[inline(always)]
    pub fn sub(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        c.copy_from(a);
        self.sub_inplace(b, c);
    }

    #[inline(always)]
    pub fn neg_inplace(&self, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        let q: u64 = self.q();
        a.0.iter_mut().for_each(|a| *a = (q - *a).reduce_once(q));
    }

    /// a <- a + b on the constant coefficient only.
    #[inline(always)]
    pub fn add_scalar_inplace(&self, b: u64, a: &mut Poly<u64>) {
        let q: u64 = self.q();
        a.0[0] = (a.0[0] + b % q).reduce_once(q);
    }

    /// c <- a * b, coefficient-wise (operands in NTT domain).
    #[inline(always)]
    pub fn mul_ntt(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        let barrett = &self.modulus.barrett;
        izip!(a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(a, b, c)| *c = barrett.reduce_u128(*a as u128 * *b as u128));
    }

    /// c <- c + a * b, coefficient-wise (operands in NTT domain).
    #[inline(always)]
    pub fn mul_ntt_add(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        let q: u64 = self.q();
        let barrett = &self.modulus.barrett;
        izip!(a.0.iter(), b.0.iter(), c.0.iter_mut()).for_each(|(a, b, c)| {
            *c = (*c + barrett.reduce_u128(*a as u128 * *b as u128)).reduce_once(q)
        });
    }

    /// c <- a * b in coefficient domain.
    pub fn mul(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        let mut a_ntt: Poly<u64> = self.new_poly();
        let mut b_ntt: Poly<u64> = self.new_poly();
        self.ntt::<false>(a, &mut a_ntt);
        self.ntt::<false>(b, &mut b_ntt);
        self.mul_ntt(&a_ntt, &b_ntt, c);
        self.intt_inplace::<false>(c);
    }

    /// b <- a * X^k, k in [0, 2n).
    pub fn mul_monomial(&self, a: &Poly<u64>, k: usize, b: &mut Poly<u64>) {
        let n: usize = self.n();
        debug_assert!(k < 2 * n, "k={} >= 2n={}", k, 2 * n);
        debug_assert!(a.n() == n && b.n() == n);
        let q: u64 = self.q();
        a.0.iter().enumerate().for_each(|(i, x)| {
            let j: usize = i + k;
            let (j, neg) = match j {
                j if j < n => (j, false),
                j if j < 2 * n => (j - n, true),
                j if j < 3 * n => (j - 2 * n, false),
                j => (j - 3 * n, true),
            };
            b.0[j] = if neg { (q - *x).reduce_once(q) } else { *x };
        });
    }

    /// b <- a * (X^k - 1), k in [0, 2n).
    pub fn mul_monomial_minus_one(&self, a: &Poly<u64>, k: usize, b: &mut Poly<u64>) {
        self.mul_monomial(a, k, b);
        self.sub_inplace(a, b);
    }
}
