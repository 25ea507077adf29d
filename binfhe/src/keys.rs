use utils::map::Map;

use crate::acc::AccKey;
use crate::error::{BinFheError, Result};
use crate::lwe::LweKeySwitchKey;
use crate::rlwe::RlwePublicKey;

/// Evaluation key: key switching key, accumulator key and, in public key mode,
/// the ring public key.
#[derive(Clone, Debug)]
pub struct BootstrapKey {
    pub ks_key: LweKeySwitchKey,
    pub acc_key: AccKey,
    pub public_key: Option<RlwePublicKey>,
}

impl BootstrapKey {
    pub fn base_g(&self) -> u64 {
        self.acc_key.base_g()
    }
}

/// Bootstrap keys indexed by gadget base.
#[derive(Clone, Debug, Default)]
pub struct BootstrapKeyMap(Map<u64, BootstrapKey>);

impl BootstrapKeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the key under its own gadget base.
    pub fn insert(&mut self, key: BootstrapKey) -> Option<BootstrapKey> {
        self.0.insert(key.base_g(), key)
    }

    pub fn get(&self, base_g: u64) -> Result<&BootstrapKey> {
        self.0.get(&base_g).ok_or_else(|| BinFheError::missing_base(base_g))
    }

    pub fn bases(&self) -> Vec<u64> {
        self.0.sorted_keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Three keys switch the gadget base along the large-precision loops.
    pub fn is_dynamic(&self) -> bool {
        self.len() == 3
    }
}

impl FromIterator<BootstrapKey> for BootstrapKeyMap {
    fn from_iter<I: IntoIterator<Item = BootstrapKey>>(iter: I) -> Self {
        Self(iter.into_iter().map(|key| (key.base_g(), key)).collect())
    }
}
