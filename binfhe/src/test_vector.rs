use math::poly::Poly;
use math::ring::Ring;

/// Function encoded in the accumulator before blind rotation.
///
/// [`TestVector::eval`] maps a value x of the rotated domain Z_modulus to an
/// output in Z_fmod. [`TestVector::polynomial`] spreads the outputs over the
/// ring with stride 2N / modulus, scaled by Q / fmod.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestVector<'a> {
    /// `inside` on [lb, ub), `outside` elsewhere. Used with fmod = Q.
    Interval {
        lb: u64,
        ub: u64,
        inside: u64,
        outside: u64,
    },
    /// Negacyclic table, read as is.
    Table(&'a [u64]),
    /// Table on the lower half of the domain, negated on the upper half.
    HalfTable(&'a [u64]),
    /// -modulus/4 on the lower half, modulus/4 on the upper half.
    SignCorrection,
    /// Second correction of the flooring, on the domain restricted to [0, modulus/2).
    FloorRefine,
    /// fmod/4 on the lower half, -fmod/4 on the upper half.
    SignThreshold,
    /// -fmod/4 on the lower half, fmod/4 on the upper half.
    SignThresholdNeg,
}

impl TestVector<'_> {
    pub fn eval(&self, x: u64, modulus: u64, fmod: u64) -> u64 {
        let half: u64 = modulus >> 1;
        let quarter: u64 = modulus >> 2;
        let r: u64 = match self {
            TestVector::Interval {
                lb,
                ub,
                inside,
                outside,
            } => match (*lb..*ub).contains(&x) {
                true => *inside,
                false => *outside,
            },
            TestVector::Table(lut) => lut[x as usize],
            TestVector::HalfTable(lut) => match x < half {
                true => lut[x as usize],
                false => fmod - lut[(x - half) as usize],
            },
            TestVector::SignCorrection => match x < half {
                true => fmod - quarter,
                false => quarter,
            },
            TestVector::FloorRefine => {
                if x < quarter {
                    fmod - half - x
                } else if x < 3 * quarter {
                    x
                } else {
                    fmod + half - x
                }
            }
            TestVector::SignThreshold => match x < half {
                true => fmod >> 2,
                false => fmod - (fmod >> 2),
            },
            TestVector::SignThresholdNeg => match x < half {
                true => fmod - (fmod >> 2),
                false => fmod >> 2,
            },
        };
        r % fmod
    }

    /// Returns the test polynomial for a ciphertext with body `b` at `modulus`.
    pub fn polynomial(&self, ring: &Ring<u64>, b: u64, modulus: u64, fmod: u64) -> Poly<u64> {
        let big_q: u64 = ring.q();
        let two_n: u64 = (ring.n() as u64) << 1;
        debug_assert!(two_n % modulus == 0, "modulus={} does not divide 2N={}", modulus, two_n);
        let factor: usize = (two_n / modulus) as usize;
        let scale: u64 = big_q / fmod;
        let mut m: Poly<u64> = ring.new_poly();
        (0..modulus >> 1).for_each(|j| {
            let x: u64 = (b % modulus + modulus - j) % modulus;
            m.0[j as usize * factor] = ((scale as u128 * self.eval(x, modulus, fmod) as u128) % big_q as u128) as u64;
        });
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_policies() {
        let q: u64 = 64;
        let fmod: u64 = 1024;
        assert_eq!(TestVector::SignCorrection.eval(0, q, fmod), fmod - 16);
        assert_eq!(TestVector::SignCorrection.eval(32, q, fmod), 16);
        assert_eq!(TestVector::SignThreshold.eval(31, q, fmod), 256);
        assert_eq!(TestVector::SignThreshold.eval(63, q, fmod), 768);
        assert_eq!(TestVector::SignThresholdNeg.eval(31, q, fmod), 768);
        assert_eq!(TestVector::SignThresholdNeg.eval(32, q, fmod), 256);
    }

    #[test]
    fn floor_refine() {
        let q: u64 = 64;
        let fmod: u64 = 1 << 12;
        assert_eq!(TestVector::FloorRefine.eval(0, q, fmod), fmod - 32);
        assert_eq!(TestVector::FloorRefine.eval(15, q, fmod), fmod - 47);
        assert_eq!(TestVector::FloorRefine.eval(16, q, fmod), 16);
        assert_eq!(TestVector::FloorRefine.eval(47, q, fmod), 47);
        assert_eq!(TestVector::FloorRefine.eval(48, q, fmod), fmod - 16);
        assert_eq!(TestVector::FloorRefine.eval(63, q, fmod), fmod - 31);
    }

    #[test]
    fn tables() {
        let lut: Vec<u64> = vec![0, 2, 4, 6, 0, 2, 4, 6];
        assert_eq!(TestVector::Table(&lut).eval(5, 8, 8), 2);
        assert_eq!(TestVector::HalfTable(&lut).eval(3, 8, 8), 6);
        assert_eq!(TestVector::HalfTable(&lut).eval(5, 8, 8), 6);
        assert_eq!(TestVector::HalfTable(&lut).eval(4, 8, 8), 0);
    }

    #[test]
    fn interval_polynomial() {
        let ring: Ring<u64> = Ring::new(16, 0xffffff7801);
        let big_q: u64 = ring.q();
        let tv: TestVector = TestVector::Interval {
            lb: 4,
            ub: 12,
            inside: 7,
            outside: big_q - 7,
        };
        // modulus 16 gives stride 2 over 8 slots.
        let m: Poly<u64> = tv.polynomial(&ring, 5, 16, big_q);
        let want: Vec<u64> = [5u64, 4, 3, 2, 1, 0, 15, 14]
            .iter()
            .map(|x| if (4..12).contains(x) { 7 } else { big_q - 7 })
            .collect();
        (0..8).for_each(|j| {
            assert_eq!(m.0[2 * j], want[j]);
            assert_eq!(m.0[2 * j + 1], 0);
        });
    }

    #[test]
    fn scaled_polynomial() {
        let ring: Ring<u64> = Ring::new(16, 0xffffff7801);
        let big_q: u64 = ring.q();
        let m: Poly<u64> = TestVector::SignThreshold.polynomial(&ring, 0, 32, 8);
        assert_eq!(m.0[0], (big_q / 8) * 2);
        assert_eq!(m.0[1], (big_q / 8) * 6);
        assert!(m.0[2..].iter().all(|&x| x == (big_q / 8) * 6));
    }
}
