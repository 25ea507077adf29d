use crate::modulus::ReduceOnce;
use crate::modulus::{BARRETT, BARRETTLAZY, FOURTIMES, NONE, ONCE, REDUCEMOD, TWICE};

/// A constant paired with its precomputed quotient floor(value * 2^64 / q).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Barrett<O>(pub O, pub O);

impl<O> Barrett<O> {
    #[inline(always)]
    pub fn value(&self) -> &O {
        &self.0
    }

    #[inline(always)]
    pub fn quotient(&self) -> &O {
        &self.1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarrettPrecomp<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    pub lo: O,
    pub hi: O,
    pub one: Barrett<O>,
}

impl BarrettPrecomp<u64> {
    pub fn new(q: u64) -> BarrettPrecomp<u64> {
        assert!(q > 1 && q & 1 == 1, "invalid argument: q={} must be odd and > 1", q);
        // q odd never divides 2^128, so floor((2^128 - 1)/q) = floor(2^128/q).
        let big_r: u128 = u128::MAX / q as u128;
        let mut precomp: BarrettPrecomp<u64> = Self {
            q,
            two_q: q << 1,
            four_q: q << 2,
            lo: big_r as u64,
            hi: (big_r >> 64) as u64,
            one: Barrett(0, 0),
        };
        precomp.one = precomp.prepare(1);
        precomp
    }

    #[inline(always)]
    pub fn one(&self) -> Barrett<u64> {
        self.one
    }

    #[inline(always)]
    pub fn reduce_assign<const REDUCE: REDUCEMOD>(&self, x: &mut u64) {
        match REDUCE {
            NONE => {}
            ONCE => x.reduce_once_assign(self.q),
            TWICE => x.reduce_once_assign(self.two_q),
            FOURTIMES => x.reduce_once_assign(self.four_q),
            BARRETT => {
                let mhi: u64 = ((*x as u128 * self.hi as u128) >> 64) as u64;
                *x -= mhi.wrapping_mul(self.q);
                x.reduce_once_assign(self.q);
            }
            BARRETTLAZY => {
                let mhi: u64 = ((*x as u128 * self.hi as u128) >> 64) as u64;
                *x -= mhi.wrapping_mul(self.q)
            }
            _ => unreachable!("invalid REDUCE argument"),
        }
    }

    #[inline(always)]
    pub fn reduce<const REDUCE: REDUCEMOD>(&self, x: &u64) -> u64 {
        let mut r: u64 = *x;
        self.reduce_assign::<REDUCE>(&mut r);
        r
    }

    /// Returns x mod q for x < q * 2^64.
    #[inline(always)]
    pub fn reduce_u128(&self, x: u128) -> u64 {
        debug_assert!((x >> 64) < self.q as u128, "invalid argument: x >= q * 2^64");
        const MASK: u128 = u64::MAX as u128;
        let (x0, x1) = (x & MASK, x >> 64);
        let (r0, r1) = (self.lo as u128, self.hi as u128);
        let t: u128 = ((x0 * r0) >> 64) + x1 * r0;
        let u: u128 = x0 * r1;
        let mid: u128 = (t & MASK) + (u & MASK);
        let quotient: u128 = x1 * r1 + (t >> 64) + (u >> 64) + (mid >> 64);
        let mut r: u64 = (x.wrapping_sub(quotient.wrapping_mul(self.q as u128))) as u64;
        r.reduce_once_assign(self.q);
        r
    }

    #[inline(always)]
    pub fn prepare(&self, v: u64) -> Barrett<u64> {
        debug_assert!(v < self.q);
        let quotient: u64 = (((v as u128) << 64) / self.q as u128) as _;
        Barrett(v, quotient)
    }

    /// Returns lhs * rhs mod q, in [0, 2q) if REDUCE=NONE.
    #[inline(always)]
    pub fn mul_external<const REDUCE: REDUCEMOD>(&self, lhs: Barrett<u64>, rhs: u64) -> u64 {
        let mut r: u64 = rhs;
        self.mul_external_assign::<REDUCE>(lhs, &mut r);
        r
    }

    #[inline(always)]
    pub fn mul_external_assign<const REDUCE: REDUCEMOD>(&self, lhs: Barrett<u64>, rhs: &mut u64) {
        let t: u64 = ((*lhs.quotient() as u128 * *rhs as u128) >> 64) as _;
        *rhs = (rhs.wrapping_mul(*lhs.value())).wrapping_sub(self.q.wrapping_mul(t));
        self.reduce_assign::<REDUCE>(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_barrett() {
        let q: u64 = 0xffffff7801;
        let barrett: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
        [0u64, 1, q - 1, q, q + 1, u64::MAX, 0x1234_5678_9abc_def0]
            .iter()
            .for_each(|&x| assert_eq!(barrett.reduce::<BARRETT>(&x), x % q, "x={}", x));
    }

    #[test]
    fn reduce_wide() {
        let q: u64 = 0xffffff7801;
        let barrett: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
        [
            0u128,
            1,
            (q as u128 - 1) * (q as u128 - 1),
            ((q as u128 - 1) << 64) | u64::MAX as u128,
            0x1234_5678_9abc_def0_1234_5678,
        ]
        .iter()
        .for_each(|&x| assert_eq!(barrett.reduce_u128(x) as u128, x % q as u128, "x={}", x));
    }

    #[test]
    fn mul_external() {
        let q: u64 = 0xffffff7801;
        let barrett: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
        let a: Barrett<u64> = barrett.prepare(0x0123_4567_89);
        [0u64, 1, 2, q - 1, 0xabcd_ef01_23].iter().for_each(|&b| {
            let want: u64 = ((a.0 as u128 * b as u128) % q as u128) as u64;
            assert_eq!(barrett.mul_external::<ONCE>(a, b), want);
        });
    }
}
