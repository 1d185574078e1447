use crate::network::backward::Gradients;
use crate::network::params::Parameters;

/// Plain gradient descent: no momentum, no adaptive scaling, no regularization.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies `param -= lr * grad` to all four tensors in place.
    pub fn step(&self, params: &mut Parameters, grads: &Gradients) {
        params.w1.sub_scaled_assign(&grads.dw1, self.learning_rate);
        params.b1.sub_scaled_assign(&grads.db1, self.learning_rate);
        params.w2.sub_scaled_assign(&grads.dw2, self.learning_rate);
        params.b2.sub_scaled_assign(&grads.db2, self.learning_rate);
    }
}
