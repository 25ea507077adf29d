use math::modulus::prime::Prime;
use math::modulus::prime_generation::NTTFriendlyPrimesGenerator;
use math::ring::Ring;
use rand_distr::Normal;

use crate::acc::AccMethod;
use crate::error::{BinFheError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinGate {
    Or,
    And,
    Nor,
    Nand,
    Xor,
    Xnor,
    And3,
    Or3,
    And4,
    Or4,
    Majority,
    Cmux,
}

impl BinGate {
    /// Start of the gate's interval as a fraction num/den of q.
    fn const_ratio(&self) -> Option<(u64, u64)> {
        match self {
            BinGate::Or => Some((5, 8)),
            BinGate::And => Some((7, 8)),
            BinGate::Nor => Some((1, 8)),
            BinGate::Nand => Some((3, 8)),
            BinGate::Xor => Some((5, 8)),
            BinGate::Xnor => Some((1, 8)),
            BinGate::And3 => Some((11, 12)),
            BinGate::Or3 => Some((7, 12)),
            BinGate::And4 => Some((15, 16)),
            BinGate::Or4 => Some((9, 16)),
            BinGate::Majority => Some((3, 4)),
            BinGate::Cmux => None,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            BinGate::And3 | BinGate::Or3 | BinGate::Majority | BinGate::Cmux => 3,
            BinGate::And4 | BinGate::Or4 => 4,
            _ => 2,
        }
    }

    /// Plaintext modulus the inputs of the gate are expected to carry.
    pub fn pt_modulus(&self) -> u64 {
        match self.arity() {
            3 => 6,
            4 => 8,
            _ => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeygenMode {
    SymEncrypt,
    PubEncrypt,
}

impl TryFrom<u8> for KeygenMode {
    type Error = BinFheError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(KeygenMode::SymEncrypt),
            1 => Ok(KeygenMode::PubEncrypt),
            _ => Err(BinFheError::invalid_argument(format!(
                "invalid keygen mode {}",
                value
            ))),
        }
    }
}

pub struct LweParamsLiteral {
    /// Dimension of the small LWE secret.
    pub n: usize,
    /// Ring degree of the accumulator.
    pub big_n: usize,
    /// Bit size of the accumulator prime Q.
    pub log_big_q: u64,
    pub q: u64,
    pub q_ks: u64,
    pub base_ks: u64,
    pub sigma: f64,
}

pub struct RingGswParamsLiteral {
    pub base_g: u64,
    /// Gadget bases keys may be generated for. Defaults to `[base_g]` when empty.
    pub base_gs: &'static [u64],
    /// (max log2 of the modulus, base) pairs used to pick a base in dynamic mode.
    pub base_thresholds: &'static [(u32, u64)],
    pub method: AccMethod,
}

pub struct BinFheParamsLiteral {
    pub lwe: LweParamsLiteral,
    pub ring_gsw: RingGswParamsLiteral,
    /// Noise margin used by the large-precision operations.
    pub beta: u64,
}

/// Small parameters for tests. Not secure.
pub const TOY: BinFheParamsLiteral = BinFheParamsLiteral {
    lwe: LweParamsLiteral {
        n: 32,
        big_n: 1024,
        log_big_q: 40,
        q: 1024,
        q_ks: 1 << 32,
        base_ks: 1 << 4,
        sigma: 3.19,
    },
    ring_gsw: RingGswParamsLiteral {
        base_g: 1 << 10,
        base_gs: &[1 << 10],
        base_thresholds: &[],
        method: AccMethod::Ginx,
    },
    beta: 32,
};

/// [TOY] with three gadget bases, for dynamic sign and decomposition.
pub const TOY_DYNAMIC: BinFheParamsLiteral = BinFheParamsLiteral {
    lwe: LweParamsLiteral {
        n: 32,
        big_n: 1024,
        log_big_q: 40,
        q: 1024,
        q_ks: 1 << 32,
        base_ks: 1 << 4,
        sigma: 3.19,
    },
    ring_gsw: RingGswParamsLiteral {
        base_g: 1 << 10,
        base_gs: &[1 << 10, 1 << 14, 1 << 20],
        base_thresholds: &[(9, 1 << 20), (13, 1 << 14)],
        method: AccMethod::Ginx,
    },
    beta: 32,
};

pub const MEDIUM: BinFheParamsLiteral = BinFheParamsLiteral {
    lwe: LweParamsLiteral {
        n: 512,
        big_n: 1024,
        log_big_q: 27,
        q: 1024,
        q_ks: 1 << 20,
        base_ks: 1 << 5,
        sigma: 3.19,
    },
    ring_gsw: RingGswParamsLiteral {
        base_g: 1 << 7,
        base_gs: &[1 << 7],
        base_thresholds: &[],
        method: AccMethod::Ginx,
    },
    beta: 32,
};

/// Returns the smallest d such that base^d >= modulus.
pub(crate) fn digits(modulus: u64, base: u64) -> usize {
    debug_assert!(base >= 2, "invalid argument: base={} < 2", base);
    let mut d: usize = 0;
    let mut x: u128 = 1;
    while x < modulus as u128 {
        x *= base as u128;
        d += 1;
    }
    d
}

#[derive(Debug)]
pub struct LweParams {
    n: usize,
    big_n: usize,
    big_q: u64,
    q: u64,
    q_ks: u64,
    base_ks: u64,
    digits_ks: usize,
    sigma: f64,
    normal: Normal<f64>,
}

impl LweParams {
    fn new(p: &LweParamsLiteral) -> Result<Self> {
        if p.n == 0 {
            return Err(BinFheError::invalid_argument("n must be > 0"));
        }
        if p.big_n < 2 || !p.big_n.is_power_of_two() {
            return Err(BinFheError::invalid_argument(format!(
                "N={} is not a power of two >= 2",
                p.big_n
            )));
        }
        let two_n: u64 = 2 * p.big_n as u64;
        if p.q < 4 || !p.q.is_power_of_two() || two_n % p.q != 0 {
            return Err(BinFheError::invalid_argument(format!(
                "q={} must be a power of two >= 4 dividing 2N={}",
                p.q, two_n
            )));
        }
        if p.q_ks < p.q || p.base_ks < 2 {
            return Err(BinFheError::invalid_argument(format!(
                "invalid key switching parameters q_ks={} base_ks={}",
                p.q_ks, p.base_ks
            )));
        }
        if p.log_big_q >= 62 || (1u64 << p.log_big_q) <= two_n || (1u64 << p.log_big_q) <= p.q_ks {
            return Err(BinFheError::invalid_argument(format!(
                "log_big_q={} out of range",
                p.log_big_q
            )));
        }
        let prime: Prime<u64> = NTTFriendlyPrimesGenerator::new(p.log_big_q, two_n)
            .next_downstream_prime()
            .ok_or_else(|| {
                BinFheError::invalid_argument(format!(
                    "no NTT-friendly prime of {} bits for 2N={}",
                    p.log_big_q, two_n
                ))
            })?;
        if !(p.sigma > 0.0) {
            return Err(BinFheError::invalid_argument(format!(
                "sigma={} must be > 0",
                p.sigma
            )));
        }
        let normal: Normal<f64> = Normal::new(0.0, p.sigma)
            .map_err(|e| BinFheError::invalid_argument(format!("sigma={}: {}", p.sigma, e)))?;
        Ok(Self {
            n: p.n,
            big_n: p.big_n,
            big_q: prime.q(),
            q: p.q,
            q_ks: p.q_ks,
            base_ks: p.base_ks,
            digits_ks: digits(p.q_ks, p.base_ks),
            sigma: p.sigma,
            normal,
        })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn big_n(&self) -> usize {
        self.big_n
    }

    pub fn big_q(&self) -> u64 {
        self.big_q
    }

    pub fn q(&self) -> u64 {
        self.q
    }

    pub fn q_ks(&self) -> u64 {
        self.q_ks
    }

    pub fn base_ks(&self) -> u64 {
        self.base_ks
    }

    pub fn digits_ks(&self) -> usize {
        self.digits_ks
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn normal(&self) -> &Normal<f64> {
        &self.normal
    }
}

#[derive(Debug)]
pub struct RingGswParams {
    ring: Ring<u64>,
    base_g: u64,
    base_gs: Vec<u64>,
    base_thresholds: Vec<(u32, u64)>,
    method: AccMethod,
}

impl RingGswParams {
    fn new(p: &RingGswParamsLiteral, lwe: &LweParams) -> Result<Self> {
        let check_base = |base: u64| -> Result<()> {
            if base < 2 || !base.is_power_of_two() || base >= lwe.big_q() {
                return Err(BinFheError::invalid_argument(format!(
                    "gadget base {} must be a power of two in [2, Q)",
                    base
                )));
            }
            Ok(())
        };
        check_base(p.base_g)?;
        let base_gs: Vec<u64> = match p.base_gs.is_empty() {
            true => vec![p.base_g],
            false => p.base_gs.to_vec(),
        };
        base_gs.iter().try_for_each(|&base| check_base(base))?;
        if !base_gs.contains(&p.base_g) {
            return Err(BinFheError::invalid_argument(format!(
                "base_g={} is not in base_gs={:?}",
                p.base_g, base_gs
            )));
        }
        if let Some((_, base)) = p.base_thresholds.iter().find(|(_, base)| !base_gs.contains(base)) {
            return Err(BinFheError::invalid_argument(format!(
                "threshold base {} is not in base_gs={:?}",
                base, base_gs
            )));
        }
        let mut base_thresholds: Vec<(u32, u64)> = p.base_thresholds.to_vec();
        base_thresholds.sort_by_key(|(log, _)| *log);
        Ok(Self {
            ring: Ring::new(lwe.big_n(), lwe.big_q()),
            base_g: p.base_g,
            base_gs,
            base_thresholds,
            method: p.method,
        })
    }

    pub fn ring(&self) -> &Ring<u64> {
        &self.ring
    }

    /// Default gadget base.
    pub fn base_g(&self) -> u64 {
        self.base_g
    }

    pub fn base_gs(&self) -> &[u64] {
        &self.base_gs
    }

    pub fn method(&self) -> AccMethod {
        self.method
    }

    /// Number of gadget digits for the given base.
    pub fn digits(&self, base_g: u64) -> usize {
        digits(self.ring.q(), base_g)
    }

    /// Returns the interval start of the gate at modulus q.
    pub fn gate_const(&self, gate: BinGate, q: u64) -> Result<u64> {
        let (num, den) = gate.const_ratio().ok_or_else(|| {
            BinFheError::invalid_argument(format!("no test vector constant for {:?}", gate))
        })?;
        Ok(num * q / den)
    }

    /// Gadget base to switch to once log2 of the working modulus is down to `log`.
    pub fn dynamic_base(&self, log: u32) -> Option<u64> {
        self.base_thresholds
            .iter()
            .find(|(max_log, _)| log <= *max_log)
            .map(|(_, base)| *base)
    }
}

/// Immutable parameter set shared by keys, scheme and context.
#[derive(Debug)]
pub struct BinFheParams {
    lwe: LweParams,
    ring_gsw: RingGswParams,
    beta: u64,
}

impl BinFheParams {
    pub fn new(p: &BinFheParamsLiteral) -> Result<Self> {
        let lwe: LweParams = LweParams::new(&p.lwe)?;
        let ring_gsw: RingGswParams = RingGswParams::new(&p.ring_gsw, &lwe)?;
        if p.beta == 0 || 2 * p.beta >= lwe.q() {
            return Err(BinFheError::invalid_argument(format!(
                "beta={} must be in [1, q/2)",
                p.beta
            )));
        }
        Ok(Self {
            lwe,
            ring_gsw,
            beta: p.beta,
        })
    }

    pub fn lwe(&self) -> &LweParams {
        &self.lwe
    }

    pub fn ring_gsw(&self) -> &RingGswParams {
        &self.ring_gsw
    }

    pub fn ring(&self) -> &Ring<u64> {
        self.ring_gsw.ring()
    }

    pub fn beta(&self) -> u64 {
        self.beta
    }
}
