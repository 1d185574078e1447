use crate::activation::relu_derivative;
use crate::loss::CrossEntropyLoss;
use crate::math::matrix::Matrix;
use crate::network::forward::ForwardCache;
use crate::network::params::Parameters;

/// Gradients of the mean cross-entropy loss, shaped like `Parameters`.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub dw1: Matrix,
    pub db1: Matrix,
    pub dw2: Matrix,
    pub db2: Matrix,
}

/// Closed-form gradients for softmax + cross-entropy on top of one ReLU layer.
///
/// The softmax/cross-entropy pair collapses to `dZ2 = (A2 - onehot(Y)) / m`
/// (see `CrossEntropyLoss::logit_gradient`). Valid only for exactly this
/// two-layer topology.
///
/// # Panics
/// If `labels` does not have one entry per column of `x`, each `< output_size`.
/// `train_loop` checks this before the first epoch.
pub fn backward(params: &Parameters, x: &Matrix, labels: &[usize], cache: &ForwardCache) -> Gradients {
    let dz2 = CrossEntropyLoss::logit_gradient(labels, &cache.a2);

    let dw2 = dz2.dot(&cache.a1.transpose());
    let db2 = dz2.row_sums();

    let da1 = params.w2.transpose().dot(&dz2);
    let dz1 = da1.hadamard(&relu_derivative(&cache.z1));

    let dw1 = dz1.dot(&x.transpose());
    let db1 = dz1.row_sums();

    Gradients { dw1, db1, dw2, db2 }
}
