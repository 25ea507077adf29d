use std::sync::Arc;

use math::poly::Poly;
use math::ring::Ring;
use sampling::source::Source;
use tracing::{debug, instrument, trace};

use crate::acc::{AccKey, Accumulator};
use crate::error::{BinFheError, Result};
use crate::keys::{BootstrapKey, BootstrapKeyMap};
use crate::lwe::{self, LweCiphertext, LweKeySwitchKey, LweSecretKey};
use crate::params::{BinFheParams, BinGate, KeygenMode, LweParams};
use crate::rlwe::{RlweCiphertext, RlwePublicKey, RlweSecretKey};
use crate::test_vector::TestVector;

/// Shape of a lookup table over Z_q, which decides how many bootstraps
/// [`BinFheScheme::eval_func`] needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LutClass {
    /// lut[i + q/2] = -lut[i].
    Negacyclic = 0,
    /// lut[i + q/2] = lut[i].
    Periodic = 1,
    Arbitrary = 2,
}

/// Classifies `lut` by comparing its two halves modulo q. A table that is
/// both negacyclic and periodic (only the zero table) is reported as negacyclic.
pub fn check_input_function(lut: &[u64], q: u64) -> LutClass {
    let mid: usize = lut.len() >> 1;
    let (lo, hi) = lut.split_at(mid);
    if lo.iter().zip(hi).all(|(&x, &y)| x % q == (q - y % q) % q) {
        LutClass::Negacyclic
    } else if lo.iter().zip(hi).all(|(&x, &y)| x % q == y % q) {
        LutClass::Periodic
    } else {
        LutClass::Arbitrary
    }
}

/// Gate bootstrapping and large-precision evaluation over a fixed parameter set.
pub struct BinFheScheme {
    params: Arc<BinFheParams>,
    acc: Box<dyn Accumulator + Send + Sync>,
}

impl BinFheScheme {
    pub fn new(params: Arc<BinFheParams>) -> Self {
        let acc: Box<dyn Accumulator + Send + Sync> = params.ring_gsw().method().accumulator();
        Self { params, acc }
    }

    pub fn params(&self) -> &BinFheParams {
        &self.params
    }

    fn check_secret(&self, lwe_sk: &LweSecretKey) -> Result<()> {
        if lwe_sk.n() == 0 || lwe_sk.n() != self.params.lwe().n() {
            return Err(BinFheError::invalid_argument(format!(
                "secret key of dimension {} does not match n={}",
                lwe_sk.n(),
                self.params.lwe().n()
            )));
        }
        Ok(())
    }

    fn check_base(&self, base_g: u64) -> Result<()> {
        if !self.params.ring_gsw().base_gs().contains(&base_g) {
            return Err(BinFheError::invalid_argument(format!(
                "gadget base {} is not in {:?}",
                base_g,
                self.params.ring_gsw().base_gs()
            )));
        }
        Ok(())
    }

    /// Generates the ring secret and everything that does not depend on the gadget base.
    fn key_gen_shared(
        &self,
        lwe_sk: &LweSecretKey,
        mode: KeygenMode,
        source_xs: &mut Source,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> (RlweSecretKey, LweKeySwitchKey, Option<RlwePublicKey>) {
        let lwe: &LweParams = self.params.lwe();
        let ring: &Ring<u64> = self.params.ring();
        let sk_big_n: LweSecretKey = lwe::key_gen(lwe.big_n(), source_xs);
        let skn: RlweSecretKey = RlweSecretKey::from_lwe(ring, &sk_big_n);
        let ks_key: LweKeySwitchKey = LweKeySwitchKey::generate(lwe, lwe_sk, &sk_big_n, source_xa, source_xe);
        let public_key: Option<RlwePublicKey> = match mode {
            KeygenMode::SymEncrypt => None,
            KeygenMode::PubEncrypt => Some(RlwePublicKey::generate(
                ring,
                &skn,
                lwe.normal(),
                source_xa,
                source_xe,
            )),
        };
        (skn, ks_key, public_key)
    }

    /// Generates the bootstrap key for the default gadget base.
    #[instrument(skip_all)]
    pub fn key_gen(&self, lwe_sk: &LweSecretKey, mode: KeygenMode, source: &mut Source) -> Result<BootstrapKey> {
        self.check_secret(lwe_sk)?;
        let base_g: u64 = self.params.ring_gsw().base_g();
        let mut source_xs: Source = source.branch();
        let mut source_xa: Source = source.branch();
        let mut source_xe: Source = source.branch();
        let (skn, ks_key, public_key) =
            self.key_gen_shared(lwe_sk, mode, &mut source_xs, &mut source_xa, &mut source_xe);
        let acc_key: AccKey = self
            .acc
            .key_gen_acc(&self.params, &skn, lwe_sk, base_g, &mut source_xa, &mut source_xe);
        debug!(base_g, n = lwe_sk.n(), ?mode, "generated bootstrap key");
        Ok(BootstrapKey {
            ks_key,
            acc_key,
            public_key,
        })
    }

    /// Generates one bootstrap key per gadget base. All keys share the ring
    /// secret, the key switching key and the public key.
    #[instrument(skip_all)]
    pub fn key_gen_multi(
        &self,
        lwe_sk: &LweSecretKey,
        bases: &[u64],
        mode: KeygenMode,
        source: &mut Source,
    ) -> Result<BootstrapKeyMap> {
        self.check_secret(lwe_sk)?;
        if bases.is_empty() {
            return Err(BinFheError::invalid_argument("no gadget base given"));
        }
        bases.iter().try_for_each(|&base| self.check_base(base))?;
        let mut source_xs: Source = source.branch();
        let mut source_xa: Source = source.branch();
        let mut source_xe: Source = source.branch();
        let (skn, ks_key, public_key) =
            self.key_gen_shared(lwe_sk, mode, &mut source_xs, &mut source_xa, &mut source_xe);
        let keys: BootstrapKeyMap = bases
            .iter()
            .map(|&base_g| {
                debug!(base_g, "generating accumulator key");
                BootstrapKey {
                    ks_key: ks_key.clone(),
                    acc_key: self
                        .acc
                        .key_gen_acc(&self.params, &skn, lwe_sk, base_g, &mut source_xa, &mut source_xe),
                    public_key: public_key.clone(),
                }
            })
            .collect();
        Ok(keys)
    }

    /// Encrypts m mod p under the ring public key of `key`. The result is
    /// returned at (N, Q) when `extended` is set, at (n, q) otherwise.
    pub fn encrypt_pk(
        &self,
        key: &BootstrapKey,
        m: u64,
        p: u64,
        extended: bool,
        source: &mut Source,
    ) -> Result<LweCiphertext> {
        let pk: &RlwePublicKey = key
            .public_key
            .as_ref()
            .ok_or_else(|| BinFheError::InvalidState("public key has not been generated".to_string()))?;
        if p < 2 {
            return Err(BinFheError::invalid_argument(format!("plaintext modulus {} < 2", p)));
        }
        let lwe: &LweParams = self.params.lwe();
        let ring: &Ring<u64> = self.params.ring();
        let mut pt: Poly<u64> = ring.new_poly();
        pt.0[0] = (m % p) * (lwe.big_q() / p);
        let mut source_xu: Source = source.branch();
        let mut source_xe: Source = source.branch();
        let ct: LweCiphertext =
            RlweCiphertext::encrypt_pk(ring, pk, Some(&pt), lwe.normal(), &mut source_xu, &mut source_xe)
                .extract_lwe(ring, 0)
                .with_pt_modulus(p);
        match extended {
            true => Ok(ct),
            false => Ok(lwe::switch_ct_to_qn(lwe, &key.ks_key, &ct)),
        }
    }

    /// Brings a gate input to (n, q). Inputs at (N, Q) are switched down,
    /// inputs already at (n, q) are copied.
    fn to_small(&self, key: &BootstrapKey, ct: &LweCiphertext) -> Result<LweCiphertext> {
        let lwe: &LweParams = self.params.lwe();
        if ct.n() == 0 {
            return Err(BinFheError::invalid_argument("empty ciphertext"));
        }
        if ct.modulus() == lwe.big_q() && ct.n() == lwe.big_n() {
            return Ok(lwe::switch_ct_to_qn(lwe, &key.ks_key, ct));
        }
        if ct.modulus() == lwe.q() && ct.n() == lwe.n() {
            return Ok(ct.clone());
        }
        Err(BinFheError::invalid_argument(format!(
            "ciphertext of dimension {} at modulus {} is neither at (n, q) nor at (N, Q)",
            ct.n(),
            ct.modulus()
        )))
    }

    fn check_small(&self, ct: &LweCiphertext) -> Result<()> {
        if ct.n() == 0 || ct.n() != self.params.lwe().n() {
            return Err(BinFheError::invalid_argument(format!(
                "ciphertext of dimension {} does not match n={}",
                ct.n(),
                self.params.lwe().n()
            )));
        }
        Ok(())
    }

    /// Extracts the gate output with offset Q/(2p) + 1 and optionally
    /// switches it back to (n, q).
    fn finish_gate(&self, key: &BootstrapKey, acc: &RlweCiphertext, p: u64, extended: bool) -> LweCiphertext {
        let lwe: &LweParams = self.params.lwe();
        let ct: LweCiphertext = acc
            .extract_lwe(self.params.ring(), lwe.big_q() / (2 * p) + 1)
            .with_pt_modulus(p);
        match extended {
            true => ct,
            false => lwe::switch_ct_to_qn(lwe, &key.ks_key, &ct),
        }
    }

    /// Evaluates a two-input gate.
    pub fn eval_bin_gate(
        &self,
        gate: BinGate,
        key: &BootstrapKey,
        ct1: &LweCiphertext,
        ct2: &LweCiphertext,
        extended: bool,
    ) -> Result<LweCiphertext> {
        if gate.arity() != 2 {
            return Err(BinFheError::invalid_argument(format!(
                "{:?} takes {} inputs",
                gate,
                gate.arity()
            )));
        }
        if std::ptr::eq(ct1, ct2) {
            return Err(BinFheError::invalid_argument("input ciphertexts should be independent"));
        }
        let mut ct: LweCiphertext = self.to_small(key, ct1)?;
        ct += &self.to_small(key, ct2)?;
        if matches!(gate, BinGate::Xor | BinGate::Xnor) {
            ct.mul_const_assign(2);
        }
        ct.set_pt_modulus(4);
        trace!(?gate, "two-input gate");
        let acc: RlweCiphertext = self.bootstrap_gate_core(gate, &key.acc_key, &ct)?;
        Ok(self.finish_gate(key, &acc, 4, extended))
    }

    /// Evaluates a gate over several inputs: the 3 and 4 input AND/OR,
    /// majority and CMUX(ct0, ct1, selector).
    pub fn eval_bin_gate_n(
        &self,
        gate: BinGate,
        key: &BootstrapKey,
        cts: &[&LweCiphertext],
        extended: bool,
    ) -> Result<LweCiphertext> {
        if cts.len() != gate.arity() {
            return Err(BinFheError::invalid_argument(format!(
                "{:?} takes {} inputs, got {}",
                gate,
                gate.arity(),
                cts.len()
            )));
        }
        for (i, ct) in cts.iter().enumerate() {
            if cts[i + 1..].iter().any(|other| std::ptr::eq(*ct, *other)) {
                return Err(BinFheError::invalid_argument("input ciphertexts should be independent"));
            }
        }
        match gate {
            BinGate::Cmux => {
                let not_sel: LweCiphertext = self.eval_not(cts[2])?;
                let lhs: LweCiphertext = self.eval_bin_gate(BinGate::Nand, key, cts[0], &not_sel, false)?;
                let rhs: LweCiphertext = self.eval_bin_gate(BinGate::Nand, key, cts[1], cts[2], false)?;
                self.eval_bin_gate(BinGate::Nand, key, &lhs, &rhs, extended)
            }
            _ if gate.arity() > 2 => {
                let p: u64 = cts[0].pt_modulus();
                let mut ct: LweCiphertext = self.to_small(key, cts[0])?;
                for other in &cts[1..] {
                    ct += &self.to_small(key, other)?;
                }
                ct.set_pt_modulus(p);
                trace!(?gate, p, "n-input gate");
                let acc: RlweCiphertext = self.bootstrap_gate_core(gate, &key.acc_key, &ct)?;
                Ok(self.finish_gate(key, &acc, p, extended))
            }
            _ => Err(BinFheError::invalid_argument(format!(
                "{:?} is not defined over a vector of ciphertexts",
                gate
            ))),
        }
    }

    /// Refreshes the noise of a boolean ciphertext.
    pub fn bootstrap(&self, key: &BootstrapKey, ct: &LweCiphertext, extended: bool) -> Result<LweCiphertext> {
        let p: u64 = ct.pt_modulus();
        let mut ct_q: LweCiphertext = self.to_small(key, ct)?;
        ct_q.add_const_assign(ct_q.modulus() >> 2);
        let acc: RlweCiphertext = self.bootstrap_gate_core(BinGate::And, &key.acc_key, &ct_q)?;
        Ok(self.finish_gate(key, &acc, p, extended))
    }

    /// NOT without bootstrapping: (-a, q/4 - b).
    pub fn eval_not(&self, ct: &LweCiphertext) -> Result<LweCiphertext> {
        if ct.n() == 0 {
            return Err(BinFheError::invalid_argument("empty ciphertext"));
        }
        let q: u64 = ct.modulus();
        let a: Vec<u64> = ct.a.iter().map(|&x| (q - x % q) % q).collect();
        let b: u64 = ((q >> 2) + q - ct.b % q) % q;
        Ok(LweCiphertext::new(a, b, q).with_pt_modulus(ct.pt_modulus()))
    }

    fn blind_rotate(&self, acc_key: &AccKey, ct: &LweCiphertext, tv: &TestVector, fmod: u64) -> Result<RlweCiphertext> {
        let ring: &Ring<u64> = self.params.ring();
        let two_n: u64 = (ring.n() as u64) << 1;
        let modulus: u64 = ct.modulus();
        if modulus < 2 || two_n % modulus != 0 {
            return Err(BinFheError::invalid_argument(format!(
                "modulus {} does not divide 2N={}",
                modulus, two_n
            )));
        }
        if fmod == 0 || fmod > ring.q() {
            return Err(BinFheError::invalid_argument(format!(
                "output modulus {} is not in [1, Q]",
                fmod
            )));
        }
        if acc_key.n() != ct.n() {
            return Err(BinFheError::invalid_argument(format!(
                "ciphertext of dimension {} does not match the accumulator key dimension {}",
                ct.n(),
                acc_key.n()
            )));
        }
        trace!(modulus, fmod, base_g = acc_key.base_g(), "blind rotation");
        let m: Poly<u64> = tv.polynomial(ring, ct.b, modulus, fmod);
        let mut acc: RlweCiphertext = RlweCiphertext::trivial(ring, m);
        self.acc.eval_acc(&self.params, acc_key, &mut acc, &ct.a, modulus);
        Ok(acc)
    }

    /// Blind rotation of the gate test vector: Q/(2p) + 1 on one side of the
    /// gate threshold and its negation on the other, with p the plaintext
    /// modulus of `ct`.
    pub fn bootstrap_gate_core(&self, gate: BinGate, acc_key: &AccKey, ct: &LweCiphertext) -> Result<RlweCiphertext> {
        if ct.pt_modulus() < 2 {
            return Err(BinFheError::invalid_argument(format!(
                "plaintext modulus {} < 2",
                ct.pt_modulus()
            )));
        }
        let q: u64 = ct.modulus();
        let q1: u64 = self.params.ring_gsw().gate_const(gate, q)?;
        let q2: u64 = (q1 + (q >> 1)) % q;
        let swap: bool = q1 >= q2;
        let (lb, ub) = match swap {
            true => (q2, q1),
            false => (q1, q2),
        };
        let big_q: u64 = self.params.lwe().big_q();
        let q2p: u64 = big_q / (2 * ct.pt_modulus()) + 1;
        let (inside, outside) = match swap {
            true => (q2p, big_q - q2p),
            false => (big_q - q2p, q2p),
        };
        let tv: TestVector = TestVector::Interval {
            lb,
            ub,
            inside,
            outside,
        };
        self.blind_rotate(acc_key, ct, &tv, big_q)
    }

    /// Blind rotation of the test vector `tv` with outputs in Z_fmod.
    pub fn bootstrap_func_core(
        &self,
        acc_key: &AccKey,
        ct: &LweCiphertext,
        tv: &TestVector,
        fmod: u64,
    ) -> Result<RlweCiphertext> {
        self.blind_rotate(acc_key, ct, tv, fmod)
    }

    /// Full functional bootstrap: blind rotation, extraction, key switching
    /// and a final switch to `fmod`.
    pub fn bootstrap_func(
        &self,
        key: &BootstrapKey,
        ct: &LweCiphertext,
        tv: &TestVector,
        fmod: u64,
    ) -> Result<LweCiphertext> {
        let lwe: &LweParams = self.params.lwe();
        let acc: RlweCiphertext = self.bootstrap_func_core(&key.acc_key, ct, tv, fmod)?;
        let ct_ext: LweCiphertext = acc
            .extract_lwe(self.params.ring(), 0)
            .with_pt_modulus(ct.pt_modulus());
        let ct_ks: LweCiphertext = key.ks_key.key_switch(&ct_ext.mod_switch(lwe.q_ks()));
        Ok(ct_ks.mod_switch(fmod))
    }

    /// Evaluates the lookup table `lut` over Z_q, q the modulus of `ct`.
    #[instrument(skip_all)]
    pub fn eval_func(&self, key: &BootstrapKey, ct: &LweCiphertext, lut: &[u64], beta: u64) -> Result<LweCiphertext> {
        self.check_small(ct)?;
        self.check_beta(beta)?;
        let q: u64 = ct.modulus();
        if lut.len() as u64 != q {
            return Err(BinFheError::invalid_argument(format!(
                "lookup table of size {} does not match q={}",
                lut.len(),
                q
            )));
        }
        if let Some(x) = lut.iter().find(|&&x| x >= q) {
            return Err(BinFheError::invalid_argument(format!(
                "lookup table entry {} is not in Z_{}",
                x, q
            )));
        }
        let class: LutClass = check_input_function(lut, q);
        debug!(?class, q, "evaluating lookup table");
        match class {
            LutClass::Negacyclic => {
                let mut ct1: LweCiphertext = ct.clone();
                ct1.add_const_assign(beta);
                self.bootstrap_func(key, &ct1, &TestVector::Table(lut), q)
            }
            LutClass::Periodic => {
                let mut ct1: LweCiphertext = ct.clone();
                ct1.add_const_assign(beta);
                let ct2: LweCiphertext = self.bootstrap_func(key, &ct1, &TestVector::SignCorrection, q)?;
                let mut ct2: LweCiphertext = ct.clone() - &ct2;
                ct2.add_const_assign(beta);
                ct2.sub_const_assign(q >> 2);
                self.bootstrap_func(key, &ct2, &TestVector::HalfTable(lut), q)
            }
            LutClass::Arbitrary => {
                let big_n: u64 = self.params.lwe().big_n() as u64;
                if q > big_n {
                    return Err(BinFheError::invalid_argument(format!(
                        "q={} must be at most N={} for an arbitrary lookup table",
                        q, big_n
                    )));
                }
                let lut2: Vec<u64> = [lut, lut].concat();
                let dq: u64 = q << 1;
                let mut ct1: LweCiphertext = ct.clone();
                ct1.set_modulus(dq);
                let mut ct2: LweCiphertext = ct1.clone();
                ct2.add_const_assign(beta);
                let ct3: LweCiphertext = self.bootstrap_func(key, &ct2, &TestVector::SignCorrection, dq)?;
                let mut ct3: LweCiphertext = ct1 - &ct3;
                ct3.add_const_assign(beta);
                ct3.sub_const_assign(q >> 1);
                let mut ct4: LweCiphertext = self.bootstrap_func(key, &ct3, &TestVector::HalfTable(&lut2), dq)?;
                ct4.set_modulus(q);
                Ok(ct4)
            }
        }
    }

    /// Rounds the message down, clearing its `roundbits` least significant
    /// bits (all of the bits below q when `roundbits` is 0).
    pub fn eval_floor(
        &self,
        key: &BootstrapKey,
        ct: &LweCiphertext,
        beta: u64,
        roundbits: u32,
    ) -> Result<LweCiphertext> {
        self.check_small(ct)?;
        self.check_beta(beta)?;
        let lwe: &LweParams = self.params.lwe();
        let modulus: u64 = ct.modulus();
        let shift: u32 = roundbits.saturating_add(1);
        let q_sub: u64 = match roundbits {
            0 => lwe.q(),
            _ => beta
                .checked_shl(shift)
                .filter(|&x| x >> shift == beta)
                .ok_or_else(|| BinFheError::invalid_argument(format!("roundbits={} too large", roundbits)))?,
        };
        let two_n: u64 = (lwe.big_n() as u64) << 1;
        if q_sub < 2 || two_n % q_sub != 0 || modulus % q_sub != 0 {
            return Err(BinFheError::invalid_argument(format!(
                "flooring modulus {} must divide 2N={} and the ciphertext modulus {}",
                q_sub, two_n, modulus
            )));
        }
        let mut ct1: LweCiphertext = ct.clone();
        ct1.add_const_assign(beta);

        let mut ct_sub: LweCiphertext = ct1.clone();
        ct_sub.set_modulus(q_sub);
        ct1 -= &self.bootstrap_func(key, &ct_sub, &TestVector::SignCorrection, modulus)?;

        let mut ct_sub: LweCiphertext = ct1.clone();
        ct_sub.set_modulus(q_sub);
        ct1 -= &self.bootstrap_func(key, &ct_sub, &TestVector::FloorRefine, modulus)?;
        Ok(ct1)
    }

    /// Switches to the next gadget base once log2 of the working modulus
    /// drops below a threshold. Only applies when the map holds three keys.
    fn next_key<'a>(&self, keys: &'a BootstrapKeyMap, key: &'a BootstrapKey, log: u32) -> Result<&'a BootstrapKey> {
        if !keys.is_dynamic() {
            return Ok(key);
        }
        match self.params.ring_gsw().dynamic_base(log) {
            Some(base_g) if base_g != key.base_g() => {
                debug!(log, base_g, "switching gadget base");
                keys.get(base_g)
            }
            _ => Ok(key),
        }
    }

    /// beta must be in [1, q/2) for the modulus to shrink on every round.
    fn check_beta(&self, beta: u64) -> Result<()> {
        let q: u64 = self.params.lwe().q();
        if beta == 0 || beta >= q >> 1 {
            return Err(BinFheError::invalid_argument(format!(
                "beta={} must be in [1, q/2) for q={}",
                beta, q
            )));
        }
        Ok(())
    }

    fn check_large(&self, ct: &LweCiphertext) -> Result<()> {
        self.check_small(ct)?;
        let q: u64 = self.params.lwe().q();
        if ct.modulus() <= q {
            return Err(BinFheError::invalid_argument(format!(
                "ciphertext modulus {} must be larger than q={}",
                ct.modulus(),
                q
            )));
        }
        Ok(())
    }

    /// Returns an encryption of the most significant bit of the message of a
    /// ciphertext at a modulus larger than q.
    #[instrument(skip_all)]
    pub fn eval_sign(
        &self,
        keys: &BootstrapKeyMap,
        ct: &LweCiphertext,
        beta: u64,
        scheme_switch: bool,
    ) -> Result<LweCiphertext> {
        self.check_large(ct)?;
        self.check_beta(beta)?;
        let q: u64 = self.params.lwe().q();
        let mut key: &BootstrapKey = keys.get(self.params.ring_gsw().base_g())?;
        let mut modulus: u64 = ct.modulus();
        let mut ct_tmp: LweCiphertext = ct.clone();
        while modulus > q {
            ct_tmp = self.eval_floor(key, &ct_tmp, beta, 0)?;
            modulus = ((modulus as u128 * 2 * beta as u128) / q as u128) as u64;
            ct_tmp = ct_tmp.mod_switch(modulus);
            debug!(modulus, base_g = key.base_g(), "sign round");
            key = self.next_key(keys, key, modulus.ilog2())?;
        }
        ct_tmp.add_const_assign(beta);
        let tv: TestVector = match scheme_switch {
            true => TestVector::SignThresholdNeg,
            false => TestVector::SignThreshold,
        };
        let mut res: LweCiphertext = self.bootstrap_func(key, &ct_tmp, &tv, q)?;
        if !scheme_switch {
            res.sub_const_assign(q >> 2);
        }
        Ok(res.with_pt_modulus(2))
    }

    /// Splits the message of a ciphertext at a modulus larger than q into
    /// digits of log2(q / (2 beta)) bits, least significant first. Every
    /// digit is returned at q, the last element holds the remaining high
    /// bits at the modulus the loop stopped at.
    #[instrument(skip_all)]
    pub fn eval_decomp(&self, keys: &BootstrapKeyMap, ct: &LweCiphertext, beta: u64) -> Result<Vec<LweCiphertext>> {
        self.check_large(ct)?;
        self.check_beta(beta)?;
        let q: u64 = self.params.lwe().q();
        let digit_modulus: u64 = q / (2 * beta);
        let mut key: &BootstrapKey = keys.get(self.params.ring_gsw().base_g())?;
        let mut modulus: u64 = ct.modulus();
        let mut ct_tmp: LweCiphertext = ct.clone();
        let mut digits: Vec<LweCiphertext> = Vec::new();
        while modulus > q {
            let mut digit: LweCiphertext = ct_tmp.clone();
            digit.set_modulus(q);
            digits.push(digit.with_pt_modulus(digit_modulus));

            ct_tmp = self.eval_floor(key, &ct_tmp, beta, 0)?;
            modulus = modulus / q * 2 * beta;
            ct_tmp = ct_tmp.mod_switch(modulus);
            debug!(modulus, base_g = key.base_g(), digits = digits.len(), "decomposition round");
            key = self.next_key(keys, key, ceil_log2(modulus))?;
        }
        let p_high: u64 = (modulus / (2 * beta)).max(2);
        digits.push(ct_tmp.with_pt_modulus(p_high));
        Ok(digits)
    }
}

/// Smallest k with 2^k >= x.
#[inline(always)]
fn ceil_log2(x: u64) -> u32 {
    u64::BITS - x.saturating_sub(1).leading_zeros()
}
