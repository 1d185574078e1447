use crate::math::matrix::Matrix;

/// Mean categorical cross-entropy for a softmax output layer, indexed directly
/// by integer labels rather than through a one-hot matrix.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// `L = -(1/m) * Σ_j ln(A2[Y[j], j])`
    ///
    /// No epsilon is added: a true-class probability of exactly 0 yields
    /// `f64::INFINITY`.
    ///
    /// # Panics
    /// If a label is `>= probs.rows` or `labels` is longer than `probs.cols`.
    pub fn loss(labels: &[usize], probs: &Matrix) -> f64 {
        let m = labels.len() as f64;
        labels
            .iter()
            .enumerate()
            .map(|(j, &label)| -probs.data[label][j].ln())
            .sum::<f64>()
            / m
    }

    /// Gradient of the mean loss w.r.t. the pre-softmax logits:
    ///   ∂L/∂Z2 = (A2 - onehot(Y)) / m
    ///
    /// # Panics
    /// Same preconditions as [`CrossEntropyLoss::loss`].
    pub fn logit_gradient(labels: &[usize], probs: &Matrix) -> Matrix {
        let m = labels.len() as f64;
        let mut dz = probs.clone();
        for (j, &label) in labels.iter().enumerate() {
            dz.data[label][j] -= 1.0;
        }
        dz.map(|v| v / m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic]
    fn out_of_range_label_panics() {
        let probs = Matrix::from_data(vec![vec![0.5], vec![0.5]]);
        CrossEntropyLoss::loss(&[2], &probs);
    }

    #[test]
    fn averages_negative_log_of_true_class() {
        let probs = Matrix::from_data(vec![vec![0.5, 0.25], vec![0.5, 0.75]]);
        let loss = CrossEntropyLoss::loss(&[0, 1], &probs);
        let expected = -(0.5f64.ln() + 0.75f64.ln()) / 2.0;
        assert!((loss - expected).abs() < 1e-15);
    }

    #[test]
    fn zero_probability_gives_infinite_loss() {
        let probs = Matrix::from_column(&[1.0, 0.0]);
        assert_eq!(CrossEntropyLoss::loss(&[1], &probs), f64::INFINITY);
    }

    #[test]
    fn logit_gradient_subtracts_one_at_label() {
        let probs = Matrix::from_data(vec![vec![0.2, 0.6], vec![0.8, 0.4]]);
        let dz = CrossEntropyLoss::logit_gradient(&[1, 0], &probs);
        assert!((dz.data[0][0] - 0.1).abs() < 1e-15);
        assert!((dz.data[1][0] - (-0.1)).abs() < 1e-15);
        assert!((dz.data[0][1] - (-0.2)).abs() < 1e-15);
        assert!((dz.data[1][1] - 0.2).abs() < 1e-15);
    }
}
