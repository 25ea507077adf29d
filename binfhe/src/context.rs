use std::sync::Arc;

use sampling::source::Source;
use tracing::debug;

use crate::error::{BinFheError, Result};
use crate::keys::{BootstrapKey, BootstrapKeyMap};
use crate::lwe::{self, LweCiphertext, LweSecretKey};
use crate::params::{BinFheParams, BinFheParamsLiteral, BinGate, KeygenMode};
use crate::scheme::BinFheScheme;

/// Owns the parameters, the scheme and the bootstrap keys once generated.
pub struct BinFheContext {
    params: Arc<BinFheParams>,
    scheme: BinFheScheme,
    keys: Option<BootstrapKeyMap>,
}

impl BinFheContext {
    pub fn new(params: BinFheParams) -> Self {
        let params: Arc<BinFheParams> = Arc::new(params);
        Self {
            scheme: BinFheScheme::new(params.clone()),
            params,
            keys: None,
        }
    }

    pub fn from_literal(literal: &BinFheParamsLiteral) -> Result<Self> {
        Ok(Self::new(BinFheParams::new(literal)?))
    }

    pub fn params(&self) -> &BinFheParams {
        &self.params
    }

    pub fn scheme(&self) -> &BinFheScheme {
        &self.scheme
    }

    pub fn keys(&self) -> Option<&BootstrapKeyMap> {
        self.keys.as_ref()
    }

    /// Installs externally generated keys.
    pub fn set_keys(&mut self, keys: BootstrapKeyMap) {
        self.keys = Some(keys);
    }

    fn key_map(&self) -> Result<&BootstrapKeyMap> {
        self.keys
            .as_ref()
            .ok_or_else(|| BinFheError::InvalidState("bootstrapping keys have not been generated".to_string()))
    }

    fn default_key(&self) -> Result<&BootstrapKey> {
        self.key_map()?.get(self.params.ring_gsw().base_g())
    }

    /// Samples a secret of dimension n.
    pub fn key_gen(&self, source: &mut Source) -> LweSecretKey {
        lwe::key_gen(self.params.lwe().n(), source)
    }

    /// Generates the bootstrap key for the default gadget base, replacing
    /// any existing keys.
    pub fn bt_key_gen(&mut self, sk: &LweSecretKey, mode: KeygenMode, source: &mut Source) -> Result<()> {
        let key: BootstrapKey = self.scheme.key_gen(sk, mode, source)?;
        self.keys = Some(std::iter::once(key).collect());
        Ok(())
    }

    /// Generates one bootstrap key per supported gadget base.
    pub fn bt_key_gen_dynamic(&mut self, sk: &LweSecretKey, mode: KeygenMode, source: &mut Source) -> Result<()> {
        let bases: Vec<u64> = self.params.ring_gsw().base_gs().to_vec();
        let keys: BootstrapKeyMap = self.scheme.key_gen_multi(sk, &bases, mode, source)?;
        debug!(bases = ?keys.bases(), "generated dynamic bootstrap keys");
        self.keys = Some(keys);
        Ok(())
    }

    /// Encrypts m mod p at (n, q).
    pub fn encrypt(&self, sk: &LweSecretKey, m: u64, p: u64, source: &mut Source) -> Result<LweCiphertext> {
        self.encrypt_with_modulus(sk, m, p, self.params.lwe().q(), source)
    }

    /// Encrypts m mod p at dimension n and the given modulus, which can be
    /// larger than q for the large-precision operations.
    pub fn encrypt_with_modulus(
        &self,
        sk: &LweSecretKey,
        m: u64,
        p: u64,
        modulus: u64,
        source: &mut Source,
    ) -> Result<LweCiphertext> {
        if sk.n() != self.params.lwe().n() {
            return Err(BinFheError::invalid_argument(format!(
                "secret key of dimension {} does not match n={}",
                sk.n(),
                self.params.lwe().n()
            )));
        }
        if p < 2 || modulus < p || modulus > self.params.lwe().big_q() {
            return Err(BinFheError::invalid_argument(format!(
                "cannot encrypt mod {} at modulus {}",
                p, modulus
            )));
        }
        let mut source_xa: Source = source.branch();
        let mut source_xe: Source = source.branch();
        Ok(lwe::encrypt(
            sk,
            m,
            p,
            modulus,
            self.params.lwe().normal(),
            &mut source_xa,
            &mut source_xe,
        ))
    }

    /// Encrypts under the public key generated in [`KeygenMode::PubEncrypt`].
    pub fn encrypt_pk(&self, m: u64, p: u64, extended: bool, source: &mut Source) -> Result<LweCiphertext> {
        self.scheme.encrypt_pk(self.default_key()?, m, p, extended, source)
    }

    pub fn decrypt(&self, sk: &LweSecretKey, ct: &LweCiphertext, p: u64) -> Result<u64> {
        if sk.n() != ct.n() {
            return Err(BinFheError::invalid_argument(format!(
                "secret key of dimension {} cannot decrypt a ciphertext of dimension {}",
                sk.n(),
                ct.n()
            )));
        }
        if p < 2 || p > ct.modulus() {
            return Err(BinFheError::invalid_argument(format!(
                "plaintext modulus {} out of range for modulus {}",
                p,
                ct.modulus()
            )));
        }
        Ok(lwe::decrypt(sk, ct, p))
    }

    pub fn eval_bin_gate(
        &self,
        gate: BinGate,
        ct1: &LweCiphertext,
        ct2: &LweCiphertext,
        extended: bool,
    ) -> Result<LweCiphertext> {
        self.scheme.eval_bin_gate(gate, self.default_key()?, ct1, ct2, extended)
    }

    pub fn eval_bin_gate_n(&self, gate: BinGate, cts: &[&LweCiphertext], extended: bool) -> Result<LweCiphertext> {
        self.scheme.eval_bin_gate_n(gate, self.default_key()?, cts, extended)
    }

    pub fn bootstrap(&self, ct: &LweCiphertext, extended: bool) -> Result<LweCiphertext> {
        self.scheme.bootstrap(self.default_key()?, ct, extended)
    }

    pub fn eval_not(&self, ct: &LweCiphertext) -> Result<LweCiphertext> {
        self.scheme.eval_not(ct)
    }

    pub fn eval_func(&self, ct: &LweCiphertext, lut: &[u64]) -> Result<LweCiphertext> {
        self.scheme.eval_func(self.default_key()?, ct, lut, self.beta())
    }

    pub fn eval_floor(&self, ct: &LweCiphertext, roundbits: u32) -> Result<LweCiphertext> {
        self.scheme.eval_floor(self.default_key()?, ct, self.beta(), roundbits)
    }

    pub fn eval_sign(&self, ct: &LweCiphertext, scheme_switch: bool) -> Result<LweCiphertext> {
        self.scheme.eval_sign(self.key_map()?, ct, self.beta(), scheme_switch)
    }

    pub fn eval_decomp(&self, ct: &LweCiphertext) -> Result<Vec<LweCiphertext>> {
        self.scheme.eval_decomp(self.key_map()?, ct, self.beta())
    }

    /// Tabulates `f(m, p)` over Z_q for messages m in Z_p, with p a power of
    /// two no larger than [`Self::max_plaintext_space`].
    pub fn generate_lut_via_function<F>(&self, f: F, p: u64) -> Result<Vec<u64>>
    where
        F: Fn(u64, u64) -> u64,
    {
        let q: u64 = self.params.lwe().q();
        if p < 2 || !p.is_power_of_two() || p > self.max_plaintext_space() {
            return Err(BinFheError::invalid_argument(format!(
                "plaintext modulus {} must be a power of two in [2, {}]",
                p,
                self.max_plaintext_space()
            )));
        }
        let delta: u64 = q / p;
        Ok((0..q).map(|i| (f(i * p / q, p) % p) * delta).collect())
    }

    /// Largest plaintext modulus [`Self::eval_func`] supports: q / (2 beta).
    pub fn max_plaintext_space(&self) -> u64 {
        self.params.lwe().q() / (2 * self.beta())
    }

    pub fn beta(&self) -> u64 {
        self.params.beta()
    }
}
