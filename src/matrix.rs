//! Complex 2×2 transfer matrices.
//!
//! Transfer matrices act on the (forward, backward) wave amplitudes in a layer.
//! They are plain `nalgebra` matrices over `Complex<f64>`; this module adds the
//! handful of operations the assembly algorithm needs on top of `nalgebra`.

use nalgebra::{Complex, Matrix2};

pub type C64 = Complex<f64>;
pub type TransferMatrix = Matrix2<C64>;


/// Returns the identity ("unary") transfer matrix.
pub fn unary() -> TransferMatrix {
    TransferMatrix::identity()
}

/// Operations on transfer matrices not covered by `nalgebra`.
pub trait TransferOps {
    /// Sets both off-diagonal entries to `value`.
    fn fill_anti_diagonal(&mut self, value: C64);
    /// Integer power by repeated squaring.
    fn power(&self, exponent: u32) -> Self;
    /// Determinant `m00 * m11 - m01 * m10`.
    fn det(&self) -> C64;
}

impl TransferOps for TransferMatrix {
    fn fill_anti_diagonal(&mut self, value: C64) {
        self[(0, 1)] = value;
        self[(1, 0)] = value;
    }

    fn power(&self, exponent: u32) -> Self {
        let mut result = unary();
        let mut base = *self;
        let mut exponent = exponent;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result * base;
            }
            base = base * base;
            exponent >>= 1;
        }
        result
    }

    fn det(&self) -> C64 {
        self[(0, 0)] * self[(1, 1)] - self[(0, 1)] * self[(1, 0)]
    }
}
