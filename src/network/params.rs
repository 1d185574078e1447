use rand::Rng;

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Scale applied to N(0, 1) samples when initializing weight matrices.
pub const INIT_SCALE: f64 = 0.01;

/// The four weight tensors of a one-hidden-layer network.
///
/// Shapes:
/// - `w1`: hidden × input
/// - `b1`: hidden × 1
/// - `w2`: output × hidden
/// - `b2`: output × 1
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub w1: Matrix,
    pub b1: Matrix,
    pub w2: Matrix,
    pub b2: Matrix,
}

impl Parameters {
    /// Wraps existing tensors after checking that their shapes agree.
    pub fn new(w1: Matrix, b1: Matrix, w2: Matrix, b2: Matrix) -> Result<Parameters> {
        let params = Parameters { w1, b1, w2, b2 };
        params.validate()?;
        Ok(params)
    }

    /// Small random weights (N(0, 1) × 0.01) and zero biases.
    pub fn initialize<R: Rng + ?Sized>(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        rng: &mut R,
    ) -> Parameters {
        Parameters {
            w1: Matrix::random_normal(hidden_size, input_size, INIT_SCALE, rng),
            b1: Matrix::zeros(hidden_size, 1),
            w2: Matrix::random_normal(output_size, hidden_size, INIT_SCALE, rng),
            b2: Matrix::zeros(output_size, 1),
        }
    }

    pub fn input_size(&self) -> usize {
        self.w1.cols
    }

    pub fn hidden_size(&self) -> usize {
        self.w1.rows
    }

    pub fn output_size(&self) -> usize {
        self.w2.rows
    }

    pub fn validate(&self) -> Result<()> {
        let hidden = self.w1.rows;
        let output = self.w2.rows;

        if self.b1.shape() != (hidden, 1) {
            return Err(Error::Shape(format!(
                "b1 is {}x{}, expected {}x1 to match W1 rows",
                self.b1.rows, self.b1.cols, hidden
            )));
        }
        if self.w2.cols != hidden {
            return Err(Error::Shape(format!(
                "W2 has {} columns, expected hidden size {}",
                self.w2.cols, hidden
            )));
        }
        if self.b2.shape() != (output, 1) {
            return Err(Error::Shape(format!(
                "b2 is {}x{}, expected {}x1 to match W2 rows",
                self.b2.rows, self.b2.cols, output
            )));
        }
        Ok(())
    }

    /// The tensors in their canonical order, paired with their names.
    pub fn named(&self) -> [(&'static str, &Matrix); 4] {
        [("W1", &self.w1), ("b1", &self.b1), ("W2", &self.w2), ("b2", &self.b2)]
    }
}
