use crate::modulus::WordOps;

/// Dense polynomial, one coefficient per slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly<O>(pub Vec<O>);

impl<O> Poly<O>
where
    O: Default + Clone + Copy,
{
    pub fn new(n: usize) -> Self {
        Self(vec![O::default(); n])
    }

    pub fn from_vec(coeffs: Vec<O>) -> Self {
        Self(coeffs)
    }

    pub fn n(&self) -> usize {
        self.0.len()
    }

    pub fn log_n(&self) -> usize {
        self.n().log2()
    }

    pub fn set_all(&mut self, v: &O) {
        self.0.fill(*v)
    }

    pub fn zero(&mut self) {
        self.set_all(&O::default())
    }

    pub fn copy_from(&mut self, other: &Poly<O>) {
        if std::ptr::eq(self, other) {
            return;
        }
        self.0.resize(other.n(), O::default());
        self.0.copy_from_slice(&other.0)
    }

    #[inline(always)]
    pub fn at_mut(&mut self, i: usize) -> &mut O {
        &mut self.0[i]
    }
}
