use rand_distr::Normal;

use crate::source::Source;

/// Integer-valued distributions used for secrets and errors.
#[derive(Clone, Copy, Debug)]
pub enum Distributions {
    Ternary,
    Normal(Normal<f64>),
}

impl Distributions {
    #[inline(always)]
    pub fn sample(&self, source: &mut Source) -> i64 {
        match self {
            Distributions::Ternary => source.next_i64_ternary(),
            Distributions::Normal(normal) => source.next_i64_gaussian(normal),
        }
    }
}
