mod common;

use binfhe::params::TOY;
use binfhe::{BinFheContext, BinFheError, BinGate, KeygenMode, LweCiphertext, LweSecretKey};
use sampling::source::Source;

#[test]
fn two_input_truth_tables() {
    let (ctx, sk, mut source) = common::setup(&TOY, KeygenMode::SymEncrypt, false);
    let gates: [(BinGate, fn(u64, u64) -> u64); 6] = [
        (BinGate::Or, |a, b| a | b),
        (BinGate::And, |a, b| a & b),
        (BinGate::Nor, |a, b| 1 ^ (a | b)),
        (BinGate::Nand, |a, b| 1 ^ (a & b)),
        (BinGate::Xor, |a, b| a ^ b),
        (BinGate::Xnor, |a, b| 1 ^ a ^ b),
    ];
    for (gate, f) in gates {
        for a in 0..2u64 {
            for b in 0..2u64 {
                let ct1: LweCiphertext = ctx.encrypt(&sk, a, 4, &mut source).unwrap();
                let ct2: LweCiphertext = ctx.encrypt(&sk, b, 4, &mut source).unwrap();
                let ct: LweCiphertext = ctx.eval_bin_gate(gate, &ct1, &ct2, false).unwrap();
                assert_eq!(ct.n(), ctx.params().lwe().n());
                assert_eq!(ct.modulus(), ctx.params().lwe().q());
                assert_eq!(ctx.decrypt(&sk, &ct, 4).unwrap(), f(a, b), "{:?}({}, {})", gate, a, b);
            }
        }
    }
}

#[test]
fn multi_input_gates() {
    let (ctx, sk, mut source) = common::setup(&TOY, KeygenMode::SymEncrypt, false);
    let gates: [(BinGate, fn(u64) -> u64); 5] = [
        (BinGate::And3, |w| (w == 3) as u64),
        (BinGate::Or3, |w| (w > 0) as u64),
        (BinGate::Majority, |w| (w >= 2) as u64),
        (BinGate::And4, |w| (w == 4) as u64),
        (BinGate::Or4, |w| (w > 0) as u64),
    ];
    for (gate, f) in gates {
        let arity: usize = gate.arity();
        let p: u64 = gate.pt_modulus();
        for bits in 0..(1u64 << arity) {
            let cts: Vec<LweCiphertext> = (0..arity)
                .map(|i| ctx.encrypt(&sk, (bits >> i) & 1, p, &mut source).unwrap())
                .collect();
            let refs: Vec<&LweCiphertext> = cts.iter().collect();
            let ct: LweCiphertext = ctx.eval_bin_gate_n(gate, &refs, false).unwrap();
            assert_eq!(ct.pt_modulus(), p);
            let want: u64 = f(bits.count_ones() as u64);
            assert_eq!(ctx.decrypt(&sk, &ct, p).unwrap(), want, "{:?} inputs={:b}", gate, bits);
        }
    }
}

#[test]
fn cmux_selects() {
    let (ctx, sk, mut source) = common::setup(&TOY, KeygenMode::SymEncrypt, false);
    for bits in 0..8u64 {
        let (a, b, sel) = (bits & 1, (bits >> 1) & 1, bits >> 2);
        let ct0: LweCiphertext = ctx.encrypt(&sk, a, 4, &mut source).unwrap();
        let ct1: LweCiphertext = ctx.encrypt(&sk, b, 4, &mut source).unwrap();
        let ct_sel: LweCiphertext = ctx.encrypt(&sk, sel, 4, &mut source).unwrap();
        let ct: LweCiphertext = ctx
            .eval_bin_gate_n(BinGate::Cmux, &[&ct0, &ct1, &ct_sel], false)
            .unwrap();
        let want: u64 = if sel == 1 { b } else { a };
        assert_eq!(ctx.decrypt(&sk, &ct, 4).unwrap(), want, "a={} b={} sel={}", a, b, sel);
    }
}

#[test]
fn rejects_aliased_inputs_and_wrong_arity() {
    let (ctx, sk, mut source) = common::setup(&TOY, KeygenMode::SymEncrypt, false);
    let ct0: LweCiphertext = ctx.encrypt(&sk, 1, 4, &mut source).unwrap();
    let ct1: LweCiphertext = ctx.encrypt(&sk, 0, 4, &mut source).unwrap();

    let err: BinFheError = ctx.eval_bin_gate(BinGate::And, &ct0, &ct0, false).unwrap_err();
    assert!(matches!(err, BinFheError::InvalidArgument(_)));

    // Equal contents in distinct ciphertexts are fine.
    let copy: LweCiphertext = ct0.clone();
    assert_eq!(
        ctx.decrypt(&sk, &ctx.eval_bin_gate(BinGate::And, &ct0, &copy, false).unwrap(), 4)
            .unwrap(),
        1
    );

    assert!(matches!(
        ctx.eval_bin_gate_n(BinGate::Majority, &[&ct0, &ct1, &ct0], false),
        Err(BinFheError::InvalidArgument(_))
    ));
    assert!(matches!(
        ctx.eval_bin_gate(BinGate::And3, &ct0, &ct1, false),
        Err(BinFheError::InvalidArgument(_))
    ));
    assert!(matches!(
        ctx.eval_bin_gate_n(BinGate::Majority, &[&ct0, &ct1], false),
        Err(BinFheError::InvalidArgument(_))
    ));
    assert!(matches!(
        ctx.eval_bin_gate_n(BinGate::And, &[&ct0, &ct1], false),
        Err(BinFheError::InvalidArgument(_))
    ));
}

#[test]
fn not_is_an_involution() {
    let mut source: Source = Source::new([0u8; 32]);
    let ctx: BinFheContext = BinFheContext::from_literal(&TOY).unwrap();
    let sk: LweSecretKey = ctx.key_gen(&mut source);
    for m in 0..2u64 {
        let ct: LweCiphertext = ctx.encrypt(&sk, m, 4, &mut source).unwrap();
        let not_ct: LweCiphertext = ctx.eval_not(&ct).unwrap();
        assert_eq!(ctx.decrypt(&sk, &not_ct, 4).unwrap(), 1 - m);
        let back: LweCiphertext = ctx.eval_not(&not_ct).unwrap();
        assert_eq!(back.a, ct.a);
        assert_eq!(back.b, ct.b);
    }
}

#[test]
fn extended_outputs_chain() {
    let (ctx, sk, mut source) = common::setup(&TOY, KeygenMode::SymEncrypt, false);
    let ct0: LweCiphertext = ctx.encrypt(&sk, 1, 4, &mut source).unwrap();
    let ct1: LweCiphertext = ctx.encrypt(&sk, 1, 4, &mut source).unwrap();
    let ct2: LweCiphertext = ctx.encrypt(&sk, 0, 4, &mut source).unwrap();

    let ext: LweCiphertext = ctx.eval_bin_gate(BinGate::And, &ct0, &ct1, true).unwrap();
    assert_eq!(ext.n(), ctx.params().lwe().big_n());
    assert_eq!(ext.modulus(), ctx.params().lwe().big_q());

    let ct: LweCiphertext = ctx.eval_bin_gate(BinGate::Xor, &ext, &ct2, false).unwrap();
    assert_eq!(ctx.decrypt(&sk, &ct, 4).unwrap(), 1);

    let refreshed: LweCiphertext = ctx.bootstrap(&ext, false).unwrap();
    assert_eq!(ctx.decrypt(&sk, &refreshed, 4).unwrap(), 1);
}

#[test]
fn bootstrap_refreshes() {
    let (ctx, sk, mut source) = common::setup(&TOY, KeygenMode::SymEncrypt, false);
    for m in 0..2u64 {
        let mut ct: LweCiphertext = ctx.encrypt(&sk, m, 4, &mut source).unwrap();
        for _ in 0..3 {
            ct = ctx.bootstrap(&ct, false).unwrap();
            assert_eq!(ct.pt_modulus(), 4);
            assert_eq!(ctx.decrypt(&sk, &ct, 4).unwrap(), m);
        }
    }
}

#[test]
fn public_key_encryption() {
    let (ctx, sk, mut source) = common::setup(&TOY, KeygenMode::PubEncrypt, false);
    for m in 0..4u64 {
        let ct: LweCiphertext = ctx.encrypt_pk(m, 4, false, &mut source).unwrap();
        assert_eq!(ct.n(), ctx.params().lwe().n());
        assert_eq!(ctx.decrypt(&sk, &ct, 4).unwrap(), m);
    }
    let ext: LweCiphertext = ctx.encrypt_pk(1, 4, true, &mut source).unwrap();
    assert_eq!(ext.modulus(), ctx.params().lwe().big_q());
    let ct: LweCiphertext = ctx.encrypt(&sk, 0, 4, &mut source).unwrap();
    let or: LweCiphertext = ctx.eval_bin_gate(BinGate::Or, &ext, &ct, false).unwrap();
    assert_eq!(ctx.decrypt(&sk, &or, 4).unwrap(), 1);
}

#[test]
fn public_key_requires_public_mode() {
    let (ctx, _, mut source) = common::setup(&TOY, KeygenMode::SymEncrypt, false);
    assert!(matches!(
        ctx.encrypt_pk(1, 4, false, &mut source),
        Err(BinFheError::InvalidState(_))
    ));
}
