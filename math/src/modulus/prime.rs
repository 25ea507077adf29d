use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::{Montgomery, MontgomeryPrecomp};
use crate::modulus::ONCE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prime<O> {
    pub q: O,
    /// Euler's totient of q.
    pub phi: O,
    pub montgomery: MontgomeryPrecomp<O>,
    pub barrett: BarrettPrecomp<O>,
}

const SMALL_PRIMES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

#[inline(always)]
fn mul_mod(x: u64, y: u64, q: u64) -> u64 {
    ((x as u128 * y as u128) % q as u128) as u64
}

fn pow_mod(x: u64, exponent: u64, q: u64) -> u64 {
    let mut y: u64 = 1 % q;
    let mut x_pow: u64 = x % q;
    let mut i: u64 = exponent;
    while i > 0 {
        if i & 1 == 1 {
            y = mul_mod(y, x_pow, q);
        }
        x_pow = mul_mod(x_pow, x_pow, q);
        i >>= 1;
    }
    y
}

fn miller_rabin_round(q: u64, s: u32, d: u64, base: u64) -> bool {
    let mut x: u64 = pow_mod(base, d, q);
    if x == 1 || x == q - 1 {
        return true;
    }
    for _ in 1..s {
        x = mul_mod(x, x, q);
        if x == q - 1 {
            return true;
        }
    }
    false
}

/// Deterministic primality test, exact for every u64.
pub fn is_prime(q: u64) -> bool {
    if q < 2 {
        return false;
    }

    for &p in SMALL_PRIMES.iter() {
        if q % p == 0 {
            return q == p;
        }
    }

    let s: u32 = (q - 1).trailing_zeros();
    let d: u64 = (q - 1) >> s;

    SMALL_PRIMES
        .iter()
        .all(|&base| miller_rabin_round(q, s, d, base))
}

impl Prime<u64> {
    /// Returns a new instance of Prime<u64>.
    /// Panics if q is not a prime > 2 or if q >= 2^61.
    pub fn new(q: u64) -> Self {
        assert!(is_prime(q) && q > 2, "invalid argument: q={} is not an odd prime", q);
        Self::new_unchecked(q)
    }

    /// Returns a new instance of Prime<u64> without primality check.
    pub fn new_unchecked(q: u64) -> Self {
        assert!(
            q.next_power_of_two().ilog2() <= 61,
            "invalid argument: q={} >= 2^61",
            q
        );
        Self {
            q,
            phi: q - 1,
            montgomery: MontgomeryPrecomp::new(q),
            barrett: BarrettPrecomp::new(q),
        }
    }

    pub fn q(&self) -> u64 {
        self.q
    }

    /// Returns x^exponent mod q.
    #[inline(always)]
    pub fn pow(&self, x: u64, exponent: u64) -> u64 {
        let x_mont: Montgomery<u64> = self.montgomery.prepare::<ONCE>(x % self.q);
        self.montgomery
            .unprepare::<ONCE>(self.montgomery.pow(x_mont, exponent))
    }

    /// Returns x^-1 mod q.
    /// User must ensure that x is not divisible by q.
    #[inline(always)]
    pub fn inv(&self, x: u64) -> u64 {
        self.pow(x, self.phi - 1)
    }

    /// Returns a primitive nth_root-th root of unity, nth_root a power of two.
    pub fn primitive_nth_root(&self, nth_root: u64) -> u64 {
        assert!(
            nth_root & (nth_root - 1) == 0 && nth_root >= 2,
            "invalid argument: nth_root={} is not a power of two",
            nth_root
        );
        assert!(
            self.q % nth_root == 1,
            "invalid prime: q={} % nth_root={} = {} != 1",
            self.q,
            nth_root,
            self.q % nth_root
        );

        let exponent: u64 = self.phi / nth_root;

        // For a power of two order, g has order exactly nth_root iff g^(nth_root/2) = -1.
        let mut candidate: u64 = 2;
        loop {
            let psi: u64 = self.pow(candidate, exponent);
            if self.pow(psi, nth_root >> 1) == self.q - 1 {
                return psi;
            }
            candidate += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primality() {
        let primes: [u64; 6] = [2, 3, 97, 65537, 0xffffff7801, 0x1fffffffffe00001];
        primes.iter().for_each(|&p| assert!(is_prime(p), "{} is prime", p));
        // 3215031751 is a strong pseudoprime to bases 2, 3, 5 and 7.
        let composites: [u64; 6] = [0, 1, 561, 3215031751, 0xffffff7801 * 3, 1 << 40];
        composites.iter().for_each(|&c| assert!(!is_prime(c), "{} is composite", c));
    }

    #[test]
    fn nth_root() {
        let prime: Prime<u64> = Prime::new(0xffffff7801);
        let nth_root: u64 = 2048;
        let psi: u64 = prime.primitive_nth_root(nth_root);
        assert_eq!(prime.pow(psi, nth_root), 1);
        assert_eq!(prime.pow(psi, nth_root >> 1), prime.q - 1);
        assert_eq!(prime.pow(psi, 2 * nth_root), 1);
        let x: u64 = 123456789;
        assert_eq!(mul_mod(x, prime.inv(x), prime.q), 1);
    }
}
