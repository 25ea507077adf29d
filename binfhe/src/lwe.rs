pub mod ciphertext;
pub mod keys;
pub mod keyswitch;

use math::modulus::{ReduceOnce, WordOps};
use rand_distr::Normal;
use sampling::source::Source;

use crate::params::LweParams;

pub use ciphertext::LweCiphertext;
pub use keys::LweSecretKey;
pub use keyswitch::LweKeySwitchKey;

/// Samples a ternary secret of dimension n.
pub fn key_gen(n: usize, source: &mut Source) -> LweSecretKey {
    let mut sk: LweSecretKey = LweSecretKey::new(n);
    sk.fill_ternary(source);
    sk
}

/// Encrypts the raw phase `pt` in [0, modulus).
pub fn encrypt_sk(
    sk: &LweSecretKey,
    pt: u64,
    modulus: u64,
    normal: &Normal<f64>,
    source_xa: &mut Source,
    source_xe: &mut Source,
) -> LweCiphertext {
    let mask: u64 = modulus.mask();
    let a: Vec<u64> = (0..sk.n())
        .map(|_| source_xa.next_u64n(modulus, mask))
        .collect();
    let e: u64 = source_xe
        .next_i64_gaussian(normal)
        .rem_euclid(modulus as i64) as u64;
    let b: u64 = (sk.dot(&a, modulus) + (pt + e).reduce_once(modulus)).reduce_once(modulus);
    LweCiphertext::new(a, b, modulus)
}

/// Encrypts m mod p scaled by modulus/p.
pub fn encrypt(
    sk: &LweSecretKey,
    m: u64,
    p: u64,
    modulus: u64,
    normal: &Normal<f64>,
    source_xa: &mut Source,
    source_xe: &mut Source,
) -> LweCiphertext {
    let pt: u64 = (m % p) * (modulus / p);
    encrypt_sk(sk, pt, modulus, normal, source_xa, source_xe).with_pt_modulus(p)
}

/// Rounds the phase to the nearest multiple of modulus/p.
pub fn decrypt(sk: &LweSecretKey, ct: &LweCiphertext, p: u64) -> u64 {
    let q: u64 = ct.modulus();
    let r: u64 = (sk.phase(ct) + q / (2 * p)).reduce_once(q);
    (((p as u128 * r as u128) / q as u128) as u64) % p
}

/// Maps a dimension-N ciphertext at Q to dimension n at q through q_ks.
pub fn switch_ct_to_qn(params: &LweParams, ksk: &LweKeySwitchKey, ct: &LweCiphertext) -> LweCiphertext {
    let ct_ks: LweCiphertext = ct.mod_switch(params.q_ks());
    ksk.key_switch(&ct_ks).mod_switch(params.q())
}
