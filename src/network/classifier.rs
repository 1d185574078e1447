use std::collections::BTreeMap;

use rand::Rng;

use crate::checkpoint::{CheckpointInfo, CheckpointStore};
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::math::normalize::Normalizer;
use crate::network::forward::{forward, ForwardCache};
use crate::network::params::Parameters;
use crate::train::{train_loop, TrainConfig, TrainReport};

/// Selects one of the four parameter tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tensor {
    W1,
    B1,
    W2,
    B2,
}

/// Display-ready view of a single prediction: both layers min-max normalized
/// onto [0, 1] independently and rounded to 4 decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerView {
    /// One entry per output class.
    pub probabilities: Vec<f64>,
    /// One entry per hidden unit (`A1`).
    pub activations: Vec<f64>,
}

/// Owns the model parameters and answers inference queries.
///
/// Inference never mutates parameters; only `set_parameters`, the loaders
/// and training replace them.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    params: Option<Parameters>,
    normalizer: Normalizer,
}

impl Classifier {
    pub fn new() -> Classifier {
        Classifier::default()
    }

    pub fn with_parameters(params: Parameters) -> Classifier {
        Classifier { params: Some(params), normalizer: Normalizer::default() }
    }

    pub fn set_parameters(&mut self, params: Parameters) {
        self.params = Some(params);
    }

    pub fn parameters(&self) -> Option<&Parameters> {
        self.params.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.params.is_some()
    }

    /// Replaces the parameters with the checkpoint stored under `id`.
    pub fn load_checkpoint(&mut self, store: &CheckpointStore, id: &str) -> Result<()> {
        self.params = Some(store.load(id)?);
        Ok(())
    }

    /// Replaces the parameters with the store's best checkpoint.
    /// Leaves the model untouched and returns `None` when the store is empty.
    pub fn load_best(&mut self, store: &CheckpointStore) -> Result<Option<CheckpointInfo>> {
        match store.load_best()? {
            Some(checkpoint) => {
                self.params = Some(checkpoint.params);
                Ok(Some(checkpoint.info))
            }
            None => Ok(None),
        }
    }

    /// Trains according to `config` and keeps the resulting parameters.
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        x: &Matrix,
        labels: &[usize],
        config: &TrainConfig,
        store: Option<&CheckpointStore>,
        rng: &mut R,
    ) -> Result<TrainReport> {
        let report = train_loop(x, labels, config, store, rng)?;
        self.params = Some(report.params.clone());
        Ok(report)
    }

    fn params(&self) -> Result<&Parameters> {
        self.params.as_ref().ok_or_else(|| {
            Error::InvalidState("weights have not been initialized; load or set them before prediction".into())
        })
    }

    pub fn input_size(&self) -> Option<usize> {
        self.params.as_ref().map(Parameters::input_size)
    }

    pub fn output_size(&self) -> Option<usize> {
        self.params.as_ref().map(Parameters::output_size)
    }

    pub fn forward(&self, x: &Matrix) -> Result<ForwardCache> {
        forward(self.params()?, x)
    }

    /// Most probable class for every column of `x`.
    pub fn predict(&self, x: &Matrix) -> Result<Vec<usize>> {
        Ok(self.forward(x)?.a2.argmax_columns())
    }

    pub fn predict_single(&self, image: &[f64]) -> Result<usize> {
        let labels = self.predict(&Matrix::from_column(image))?;
        Ok(labels[0])
    }

    /// Class index → normalized, rounded probability.
    pub fn predict_single_with_probabilities(&self, image: &[f64]) -> Result<BTreeMap<usize, f64>> {
        let cache = self.forward(&Matrix::from_column(image))?;
        let scaled = self.normalizer.normalize_rounded(&cache.a2.column(0));
        Ok(scaled.into_iter().enumerate().collect())
    }

    pub fn predict_single_with_probabilities_and_activations(&self, image: &[f64]) -> Result<LayerView> {
        let cache = self.forward(&Matrix::from_column(image))?;
        Ok(LayerView {
            probabilities: self.normalizer.normalize_rounded(&cache.a2.column(0)),
            activations: self.normalizer.normalize_rounded(&cache.a1.column(0)),
        })
    }

    /// Percentage of columns of `x` whose prediction equals `labels`.
    pub fn accuracy(&self, x: &Matrix, labels: &[usize]) -> Result<f64> {
        if x.cols != labels.len() {
            return Err(Error::Shape(format!(
                "{} examples but {} labels",
                x.cols,
                labels.len()
            )));
        }
        if labels.is_empty() {
            return Ok(0.0);
        }
        let predictions = self.predict(x)?;
        let correct = predictions.iter().zip(labels).filter(|(p, l)| p == l).count();
        Ok(correct as f64 / labels.len() as f64 * 100.0)
    }

    /// One parameter tensor scaled onto `normalizer`'s range, row-major.
    pub fn normalized_tensor(&self, tensor: Tensor, normalizer: &Normalizer) -> Result<Vec<f64>> {
        let params = self.params()?;
        let m = match tensor {
            Tensor::W1 => &params.w1,
            Tensor::B1 => &params.b1,
            Tensor::W2 => &params.w2,
            Tensor::B2 => &params.b2,
        };
        let flat: Vec<f64> = m.iter().copied().collect();
        Ok(normalizer.normalize(&flat))
    }
}
