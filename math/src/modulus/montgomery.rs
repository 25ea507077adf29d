use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::ReduceOnce;
use crate::modulus::{BARRETT, BARRETTLAZY, FOURTIMES, NONE, ONCE, REDUCEMOD, TWICE};

/// Value stored in Montgomery form, i.e. x * 2^64 mod q.
pub type Montgomery<O> = O;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MontgomeryPrecomp<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    pub barrett: BarrettPrecomp<O>,
    pub q_inv: O,
    one: Montgomery<O>,
    minus_one: Montgomery<O>,
}

impl MontgomeryPrecomp<u64> {
    /// Returns a new instance of MontgomeryPrecomp<u64>.
    /// Panics if gcd(q, 2^64) != 1.
    pub fn new(q: u64) -> MontgomeryPrecomp<u64> {
        assert!(q & 1 != 0, "invalid argument: gcd(q={}, radix=2^64) != 1", q);
        // Newton iteration, each step doubles the number of correct low bits.
        let mut q_inv: u64 = q;
        for _ in 0..5 {
            q_inv = q_inv.wrapping_mul(2u64.wrapping_sub(q.wrapping_mul(q_inv)));
        }
        debug_assert!(q.wrapping_mul(q_inv) == 1);
        let mut precomp: MontgomeryPrecomp<u64> = Self {
            q,
            two_q: q << 1,
            four_q: q << 2,
            barrett: BarrettPrecomp::new(q),
            q_inv,
            one: 0,
            minus_one: 0,
        };
        precomp.one = precomp.prepare::<ONCE>(1);
        precomp.minus_one = q - precomp.one;
        precomp
    }

    /// Returns 2^64 mod q.
    #[inline(always)]
    pub fn one(&self) -> Montgomery<u64> {
        self.one
    }

    /// Returns (q-1) * 2^64 mod q.
    #[inline(always)]
    pub fn minus_one(&self) -> Montgomery<u64> {
        self.minus_one
    }

    #[inline(always)]
    pub fn reduce_assign<const REDUCE: REDUCEMOD>(&self, x: &mut u64) {
        match REDUCE {
            NONE => {}
            ONCE => x.reduce_once_assign(self.q),
            TWICE => x.reduce_once_assign(self.two_q),
            FOURTIMES => x.reduce_once_assign(self.four_q),
            BARRETT => self.barrett.reduce_assign::<BARRETT>(x),
            BARRETTLAZY => self.barrett.reduce_assign::<BARRETTLAZY>(x),
            _ => unreachable!("invalid REDUCE argument"),
        }
    }

    /// Returns lhs * 2^64 mod q.
    #[inline(always)]
    pub fn prepare<const REDUCE: REDUCEMOD>(&self, lhs: u64) -> Montgomery<u64> {
        let mut rhs: u64 = self.barrett.reduce_u128((lhs as u128) << 64);
        self.reduce_assign::<REDUCE>(&mut rhs);
        rhs
    }

    /// Returns lhs * 2^-64 mod q.
    #[inline(always)]
    pub fn unprepare<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>) -> u64 {
        let r: u64 = ((self.q as u128 * lhs.wrapping_mul(self.q_inv) as u128) >> 64) as u64;
        let mut rhs: u64 = self.q - r;
        self.reduce_assign::<REDUCE>(&mut rhs);
        rhs
    }

    /// Returns lhs * rhs * 2^-64 mod q in [0, q).
    #[inline(always)]
    fn redc(&self, lhs: u64, rhs: u64) -> u64 {
        let t: u128 = lhs as u128 * rhs as u128;
        let m: u64 = (t as u64).wrapping_mul(self.q_inv);
        let mq_hi: u64 = ((m as u128 * self.q as u128) >> 64) as u64;
        let t_hi: u64 = (t >> 64) as u64;
        if t_hi < mq_hi {
            t_hi.wrapping_sub(mq_hi).wrapping_add(self.q)
        } else {
            t_hi - mq_hi
        }
    }

    /// Returns lhs * rhs with lhs in Montgomery form and rhs, the result, in plain form.
    #[inline(always)]
    pub fn mul_external<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>, rhs: u64) -> u64 {
        let mut r: u64 = self.redc(lhs, rhs);
        self.reduce_assign::<REDUCE>(&mut r);
        r
    }

    #[inline(always)]
    pub fn mul_external_assign<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>, rhs: &mut u64) {
        *rhs = self.mul_external::<REDUCE>(lhs, *rhs);
    }

    /// Returns lhs * rhs with both operands and the result in Montgomery form.
    #[inline(always)]
    pub fn mul_internal<const REDUCE: REDUCEMOD>(
        &self,
        lhs: Montgomery<u64>,
        rhs: Montgomery<u64>,
    ) -> Montgomery<u64> {
        self.mul_external::<REDUCE>(lhs, rhs)
    }

    #[inline(always)]
    pub fn mul_internal_assign<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>, rhs: &mut Montgomery<u64>) {
        *rhs = self.mul_internal::<REDUCE>(lhs, *rhs);
    }

    /// Returns x^exponent in Montgomery form.
    pub fn pow(&self, x: Montgomery<u64>, exponent: u64) -> Montgomery<u64> {
        let mut y: Montgomery<u64> = self.one();
        let mut x_pow: Montgomery<u64> = x;
        let mut i: u64 = exponent;
        while i > 0 {
            if i & 1 == 1 {
                self.mul_internal_assign::<ONCE>(x_pow, &mut y);
            }
            self.mul_internal_assign::<ONCE>(x_pow, &mut x_pow);
            i >>= 1;
        }
        y
    }
}
