use crate::activation::{relu, softmax_columns};
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::params::Parameters;

/// Intermediates of one forward pass, kept for the backward pass.
#[derive(Debug, Clone)]
pub struct ForwardCache {
    pub z1: Matrix,
    pub a1: Matrix,
    pub z2: Matrix,
    pub a2: Matrix,
}

/// `Z1 = W1·X + b1`, `A1 = relu(Z1)`, `Z2 = W2·A1 + b2`, `A2 = softmax(Z2)`.
///
/// `x` holds one example per column and must have `input_size` rows.
pub fn forward(params: &Parameters, x: &Matrix) -> Result<ForwardCache> {
    if x.rows != params.input_size() {
        return Err(Error::Shape(format!(
            "input has {} features, model expects {}",
            x.rows,
            params.input_size()
        )));
    }

    let z1 = params.w1.dot(x).add_column(&params.b1);
    let a1 = relu(&z1);
    let z2 = params.w2.dot(&a1).add_column(&params.b2);
    let a2 = softmax_columns(&z2);

    Ok(ForwardCache { z1, a1, z2, a2 })
}
