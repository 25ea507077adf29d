pub mod barrett;
pub mod montgomery;
pub mod prime;
pub mod prime_generation;

pub type REDUCEMOD = u8;

pub const NONE: REDUCEMOD = 0;
pub const ONCE: REDUCEMOD = 1;
pub const TWICE: REDUCEMOD = 2;
pub const FOURTIMES: REDUCEMOD = 3;
pub const BARRETT: REDUCEMOD = 4;
pub const BARRETTLAZY: REDUCEMOD = 5;

pub trait WordOps<O> {
    /// Returns ceil(log2(self)).
    fn log2(self) -> O;
    fn reverse_bits_msb(self, n: u32) -> O;
    /// Returns the smallest all-ones mask covering self - 1.
    fn mask(self) -> O;
}

impl WordOps<u64> for u64 {
    #[inline(always)]
    fn log2(self) -> u64 {
        (u64::BITS - (self - 1).leading_zeros()) as _
    }
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> u64 {
        self.reverse_bits() >> (u64::BITS - n)
    }
    #[inline(always)]
    fn mask(self) -> u64 {
        let log2: u64 = self.log2();
        if log2 == u64::BITS as u64 {
            return u64::MAX;
        }
        (1 << log2) - 1
    }
}

impl WordOps<usize> for usize {
    #[inline(always)]
    fn log2(self) -> usize {
        (usize::BITS - (self - 1).leading_zeros()) as _
    }
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> usize {
        self.reverse_bits() >> (usize::BITS - n)
    }
    #[inline(always)]
    fn mask(self) -> usize {
        (1 << self.log2()) - 1
    }
}

pub trait ReduceOnce<O> {
    /// Assigns self-q to self if self >= q in constant time.
    /// User must ensure that 2q fits in O.
    fn reduce_once_constant_time_assign(&mut self, q: O);
    /// Returns self-q if self >= q else self in constant time.
    fn reduce_once_constant_time(&self, q: O) -> O;
    /// Assigns self-q to self if self >= q.
    fn reduce_once_assign(&mut self, q: O);
    /// Returns self-q if self >= q else self.
    fn reduce_once(&self, q: O) -> O;
}

impl ReduceOnce<u64> for u64 {
    #[inline(always)]
    fn reduce_once_constant_time_assign(&mut self, q: u64) {
        debug_assert!(q < 0x8000000000000000, "2q >= 2^64");
        *self -= ((q - 1).wrapping_sub(*self) >> 63) * q;
    }

    #[inline(always)]
    fn reduce_once_constant_time(&self, q: u64) -> u64 {
        debug_assert!(q < 0x8000000000000000, "2q >= 2^64");
        self - ((q - 1).wrapping_sub(*self) >> 63) * q
    }

    #[inline(always)]
    fn reduce_once_assign(&mut self, q: u64) {
        debug_assert!(q < 0x8000000000000000, "2q >= 2^64");
        *self = (*self).min(self.wrapping_sub(q))
    }

    #[inline(always)]
    fn reduce_once(&self, q: u64) -> u64 {
        debug_assert!(q < 0x8000000000000000, "2q >= 2^64");
        (*self).min(self.wrapping_sub(q))
    }
}
