mod common;

use binfhe::params::{TOY, TOY_DYNAMIC};
use binfhe::{BinFheError, BootstrapKey, BootstrapKeyMap, KeygenMode, LweCiphertext};

#[test]
fn floor_clears_low_digit() {
    let (ctx, sk, mut source) = common::setup(&TOY, KeygenMode::SymEncrypt, false);
    let modulus: u64 = 1 << 12;
    let p: u64 = modulus / (2 * ctx.beta());
    let step: u64 = ctx.max_plaintext_space();
    for m in 0..p {
        let ct: LweCiphertext = ctx.encrypt_with_modulus(&sk, m, p, modulus, &mut source).unwrap();
        let res: LweCiphertext = ctx.eval_floor(&ct, 0).unwrap();
        assert_eq!(res.modulus(), modulus);
        assert_eq!(ctx.decrypt(&sk, &res, p).unwrap(), m - m % step, "m={}", m);
    }
}

#[test]
fn floor_with_round_bits() {
    let (ctx, sk, mut source) = common::setup(&TOY, KeygenMode::SymEncrypt, false);
    let modulus: u64 = 1 << 12;
    let p: u64 = modulus / (2 * ctx.beta());
    for m in [0u64, 6, 13, 63] {
        let ct: LweCiphertext = ctx.encrypt_with_modulus(&sk, m, p, modulus, &mut source).unwrap();
        let res: LweCiphertext = ctx.eval_floor(&ct, 2).unwrap();
        assert_eq!(ctx.decrypt(&sk, &res, p).unwrap(), m - m % 4, "m={}", m);
    }
    let ct: LweCiphertext = ctx.encrypt_with_modulus(&sk, 1, p, modulus, &mut source).unwrap();
    assert!(matches!(ctx.eval_floor(&ct, 6), Err(BinFheError::InvalidArgument(_))));
}

#[test]
fn sign_of_large_messages() {
    let (ctx, sk, mut source) = common::setup(&TOY, KeygenMode::SymEncrypt, false);
    let modulus: u64 = 1 << 12;
    let p: u64 = modulus / (2 * ctx.beta());
    for m in [0u64, 1, 20, 31, 32, 45, 63] {
        let ct: LweCiphertext = ctx.encrypt_with_modulus(&sk, m, p, modulus, &mut source).unwrap();
        let sign: LweCiphertext = ctx.eval_sign(&ct, false).unwrap();
        assert_eq!(sign.modulus(), ctx.params().lwe().q());
        assert_eq!(ctx.decrypt(&sk, &sign, 2).unwrap(), (m >= p / 2) as u64, "m={}", m);

        // Negated thresholds without the final shift: 3 below p/2, 1 above.
        let switched: LweCiphertext = ctx.eval_sign(&ct, true).unwrap();
        let want: u64 = if m >= p / 2 { 1 } else { 3 };
        assert_eq!(ctx.decrypt(&sk, &switched, 4).unwrap(), want, "m={}", m);
    }
}

#[test]
fn dynamic_sign_keeps_gadget_base() {
    let (ctx, sk, mut source) = common::setup(&TOY_DYNAMIC, KeygenMode::SymEncrypt, true);
    let bases: Vec<u64> = ctx.keys().unwrap().bases();
    assert_eq!(bases, vec![1 << 10, 1 << 14, 1 << 20]);
    let modulus: u64 = 1 << 16;
    let p: u64 = modulus / (2 * ctx.beta());
    for m in [0u64, 300, 511, 512, 1000] {
        let ct: LweCiphertext = ctx.encrypt_with_modulus(&sk, m, p, modulus, &mut source).unwrap();
        let sign: LweCiphertext = ctx.eval_sign(&ct, false).unwrap();
        assert_eq!(ctx.decrypt(&sk, &sign, 2).unwrap(), (m >= p / 2) as u64, "m={}", m);
    }
    assert_eq!(ctx.params().ring_gsw().base_g(), 1 << 10);
    assert_eq!(ctx.keys().unwrap().bases(), bases);
}

#[test]
fn decomposition_reconstructs() {
    let (ctx, sk, mut source) = common::setup(&TOY_DYNAMIC, KeygenMode::SymEncrypt, true);
    let q: u64 = ctx.params().lwe().q();
    let modulus: u64 = 1 << 16;
    let p: u64 = modulus / (2 * ctx.beta());
    let digit: u64 = ctx.max_plaintext_space();
    for m in [0u64, 77, 300, 1023] {
        let ct: LweCiphertext = ctx.encrypt_with_modulus(&sk, m, p, modulus, &mut source).unwrap();
        let digits: Vec<LweCiphertext> = ctx.eval_decomp(&ct).unwrap();
        assert_eq!(digits.len(), 3);
        assert!(digits[..2].iter().all(|ct| ct.modulus() == q));
        let last: &LweCiphertext = &digits[2];
        assert_eq!(last.modulus(), 1 << 8);

        let have: Vec<u64> = digits
            .iter()
            .map(|ct| ctx.decrypt(&sk, ct, ct.pt_modulus()).unwrap())
            .collect();
        assert_eq!(have, vec![m % digit, (m / digit) % digit, m / (digit * digit)], "m={}", m);
        let value: u64 = have.iter().rev().fold(0, |acc, &d| acc * digit + d);
        assert_eq!(value, m);
    }
}

#[test]
fn decomposition_at_non_power_of_two_modulus() {
    let (ctx, sk, mut source) = common::setup(&TOY_DYNAMIC, KeygenMode::SymEncrypt, true);
    let modulus: u64 = 3 << 16;
    let p: u64 = modulus / (2 * ctx.beta());
    let digit: u64 = ctx.max_plaintext_space();
    for m in [5u64, 1000, 3071] {
        let ct: LweCiphertext = ctx.encrypt_with_modulus(&sk, m, p, modulus, &mut source).unwrap();
        let digits: Vec<LweCiphertext> = ctx.eval_decomp(&ct).unwrap();
        assert_eq!(digits.len(), 3);
        assert_eq!(digits[2].modulus(), 768);
        let have: Vec<u64> = digits
            .iter()
            .map(|ct| ctx.decrypt(&sk, ct, ct.pt_modulus()).unwrap())
            .collect();
        assert_eq!(have, vec![m % digit, (m / digit) % digit, m / (digit * digit)], "m={}", m);
    }
}

#[test]
fn beta_out_of_range() {
    let (ctx, sk, mut source) = common::setup(&TOY, KeygenMode::SymEncrypt, false);
    let q: u64 = ctx.params().lwe().q();
    let keys: &BootstrapKeyMap = ctx.keys().unwrap();
    let key: &BootstrapKey = keys.get(ctx.params().ring_gsw().base_g()).unwrap();
    let large: LweCiphertext = ctx.encrypt_with_modulus(&sk, 3, 64, 1 << 12, &mut source).unwrap();
    let small: LweCiphertext = ctx.encrypt(&sk, 1, 8, &mut source).unwrap();
    let lut: Vec<u64> = vec![0u64; q as usize];
    for beta in [0u64, q / 2, q] {
        let invalid = |res: Result<LweCiphertext, BinFheError>| matches!(res, Err(BinFheError::InvalidArgument(_)));
        assert!(invalid(ctx.scheme().eval_sign(keys, &large, beta, false)), "beta={}", beta);
        assert!(invalid(ctx.scheme().eval_floor(key, &large, beta, 0)), "beta={}", beta);
        assert!(invalid(ctx.scheme().eval_func(key, &small, &lut, beta)), "beta={}", beta);
        assert!(
            matches!(ctx.scheme().eval_decomp(keys, &large, beta), Err(BinFheError::InvalidArgument(_))),
            "beta={}",
            beta
        );
    }
}

#[test]
fn large_precision_errors() {
    let (mut ctx, sk, mut source) = common::setup(&TOY_DYNAMIC, KeygenMode::SymEncrypt, false);
    let small: LweCiphertext = ctx.encrypt(&sk, 1, 4, &mut source).unwrap();
    assert!(matches!(ctx.eval_sign(&small, false), Err(BinFheError::InvalidArgument(_))));
    assert!(matches!(ctx.eval_decomp(&small), Err(BinFheError::InvalidArgument(_))));

    let keys: BootstrapKeyMap = ctx
        .scheme()
        .key_gen_multi(&sk, &[1 << 14], KeygenMode::SymEncrypt, &mut source)
        .unwrap();
    ctx.set_keys(keys);
    let ct: LweCiphertext = ctx.encrypt_with_modulus(&sk, 3, 64, 1 << 12, &mut source).unwrap();
    assert!(matches!(ctx.eval_sign(&ct, false), Err(BinFheError::LookupFailure(_))));
    assert!(matches!(ctx.eval_decomp(&ct), Err(BinFheError::LookupFailure(_))));
    assert!(matches!(ctx.eval_floor(&ct, 0), Err(BinFheError::LookupFailure(_))));
}
