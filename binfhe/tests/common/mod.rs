#![allow(dead_code)]

use binfhe::params::BinFheParamsLiteral;
use binfhe::{BinFheContext, KeygenMode, LweSecretKey};
use sampling::source::Source;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Context with bootstrap keys for the default base, or for every
/// supported base when `dynamic` is set.
pub fn setup(literal: &BinFheParamsLiteral, mode: KeygenMode, dynamic: bool) -> (BinFheContext, LweSecretKey, Source) {
    init_tracing();
    let mut source: Source = Source::new([0u8; 32]);
    let mut ctx: BinFheContext = BinFheContext::from_literal(literal).unwrap();
    let sk: LweSecretKey = ctx.key_gen(&mut source);
    match dynamic {
        true => ctx.bt_key_gen_dynamic(&sk, mode, &mut source).unwrap(),
        false => ctx.bt_key_gen(&sk, mode, &mut source).unwrap(),
    }
    (ctx, sk, source)
}
