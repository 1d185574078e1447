use crate::math::matrix::Matrix;

/// Element-wise `max(0, x)`.
pub fn relu(z: &Matrix) -> Matrix {
    z.map(|x| if x > 0.0 { x } else { 0.0 })
}

/// Element-wise ReLU derivative: 1 where `z > 0`, else 0 (including at 0).
pub fn relu_derivative(z: &Matrix) -> Matrix {
    z.map(|x| if x > 0.0 { 1.0 } else { 0.0 })
}

/// Softmax applied independently to every column (one column per example).
///
/// Softmax is vector-valued, so unlike ReLU it cannot go through `Matrix::map`.
/// The column maximum is subtracted before exponentiation; the result is
/// unchanged and `exp` cannot overflow.
pub fn softmax_columns(z: &Matrix) -> Matrix {
    let mut res = Matrix::zeros(z.rows, z.cols);

    for j in 0..z.cols {
        let max = (0..z.rows).map(|i| z.data[i][j]).fold(f64::NEG_INFINITY, f64::max);

        let mut sum = 0.0;
        for i in 0..z.rows {
            let e = (z.data[i][j] - max).exp();
            res.data[i][j] = e;
            sum += e;
        }
        for i in 0..z.rows {
            res.data[i][j] /= sum;
        }
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_clamps_negatives() {
        let z = Matrix::from_data(vec![vec![-1.0, 0.0, 2.5]]);
        assert_eq!(relu(&z).data, vec![vec![0.0, 0.0, 2.5]]);
        assert_eq!(relu_derivative(&z).data, vec![vec![0.0, 0.0, 1.0]]);
    }

    #[test]
    fn softmax_columns_sum_to_one() {
        let z = Matrix::from_data(vec![
            vec![1.0, -3.0, 0.0],
            vec![2.0, 7.5, 0.0],
            vec![3.0, 0.2, 0.0],
        ]);
        let a = softmax_columns(&z);
        for j in 0..a.cols {
            let s: f64 = a.column(j).iter().sum();
            assert!((s - 1.0).abs() < 1e-12);
        }
        assert!((a.data[0][2] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn softmax_survives_huge_logits() {
        let z = Matrix::from_column(&[1000.0, 1000.0, -1000.0]);
        let a = softmax_columns(&z);
        assert!(a.iter().all(|v| v.is_finite()));
        assert!((a.data[0][0] - 0.5).abs() < 1e-12);
        assert_eq!(a.data[2][0], 0.0);
    }
}
