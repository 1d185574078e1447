use rand::Rng;
use std::f64::consts::PI;

/// Dense row-major matrix.
///
/// Batches are stored column-wise: a batch of `m` feature vectors of length
/// `n` is an `n × m` matrix, one example per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        let cols = data.first().map_or(0, |row| row.len());
        debug_assert!(data.iter().all(|row| row.len() == cols), "ragged matrix rows");
        Matrix {
            rows: data.len(),
            cols,
            data,
        }
    }

    /// Builds an `n × 1` column vector.
    pub fn from_column(values: &[f64]) -> Matrix {
        Matrix::from_data(values.iter().map(|&v| vec![v]).collect())
    }

    /// Stacks equally sized feature vectors as the columns of a new matrix.
    pub fn from_columns(columns: &[Vec<f64>]) -> Matrix {
        let rows = columns.first().map_or(0, |c| c.len());
        let mut res = Matrix::zeros(rows, columns.len());
        for (j, column) in columns.iter().enumerate() {
            assert_eq!(column.len(), rows, "columns must have equal length");
            for (i, &v) in column.iter().enumerate() {
                res.data[i][j] = v;
            }
        }
        res
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Both uniforms in (0, 1] so ln() stays finite.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Samples every entry i.i.d. from N(0, 1) and multiplies it by `scale`.
    pub fn random_normal<R: Rng + ?Sized>(rows: usize, cols: usize, scale: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * scale;
            }
        }
        res
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix::from_data(
            self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        )
    }

    /// Matrix product `self · rhs` without consuming either operand.
    pub fn dot(&self, rhs: &Matrix) -> Matrix {
        if self.cols != rhs.rows {
            panic!(
                "Matrices are of incorrect sizes: {}x{} · {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i][k];
                for j in 0..rhs.cols {
                    res.data[i][j] += a * rhs.data[k][j];
                }
            }
        }

        res
    }

    /// Adds an `rows × 1` column vector to every column.
    pub fn add_column(&self, column: &Matrix) -> Matrix {
        if column.rows != self.rows || column.cols != 1 {
            panic!(
                "Broadcast column has incorrect size: {}x{} onto {}x{}",
                column.rows, column.cols, self.rows, self.cols
            )
        }

        let mut res = self.clone();
        for (row, bias) in res.data.iter_mut().zip(column.data.iter()) {
            for v in row.iter_mut() {
                *v += bias[0];
            }
        }
        res
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.shape(), rhs.shape(), "hadamard operands differ in shape");
        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(row_a, row_b)| row_a.iter().zip(row_b.iter()).map(|(x, y)| x * y).collect())
            .collect();
        Matrix::from_data(data)
    }

    /// Sums each row, producing a `rows × 1` column vector.
    pub fn row_sums(&self) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: 1,
            data: self.data.iter().map(|row| vec![row.iter().sum()]).collect(),
        }
    }

    /// Copies column `j` out as a plain vector.
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.data.iter().map(|row| row[j]).collect()
    }

    /// Index of the largest entry in each column. Ties resolve to the lowest row.
    pub fn argmax_columns(&self) -> Vec<usize> {
        (0..self.cols)
            .map(|j| {
                let mut best = 0;
                for i in 1..self.rows {
                    if self.data[i][j] > self.data[best][j] {
                        best = i;
                    }
                }
                best
            })
            .collect()
    }

    /// `self -= scale * rhs`, in place.
    pub fn sub_scaled_assign(&mut self, rhs: &Matrix, scale: f64) {
        assert_eq!(self.shape(), rhs.shape(), "update operands differ in shape");
        for (row, grad_row) in self.data.iter_mut().zip(rhs.data.iter()) {
            for (v, g) in row.iter_mut().zip(grad_row.iter()) {
                *v -= scale * g;
            }
        }
    }

    /// All entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.data.iter().flat_map(|row| row.iter())
    }
}
