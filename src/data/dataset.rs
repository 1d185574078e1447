use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::idx;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Locations of the four IDX files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPaths {
    pub train_images: PathBuf,
    pub train_labels: PathBuf,
    pub test_images: PathBuf,
    pub test_labels: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        DatasetPaths {
            train_images: PathBuf::from("./dataset/train-images.idx3-ubyte"),
            train_labels: PathBuf::from("./dataset/train-labels.idx1-ubyte"),
            test_images: PathBuf::from("./dataset/t10k-images.idx3-ubyte"),
            test_labels: PathBuf::from("./dataset/t10k-labels.idx1-ubyte"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

/// Labelled feature vectors for both splits, plus a label → sample index
/// cache over one split for "random example of class K" lookups.
#[derive(Debug, Clone)]
pub struct Dataset {
    train_images: Vec<Vec<f64>>,
    train_labels: Vec<usize>,
    test_images: Vec<Vec<f64>>,
    test_labels: Vec<usize>,
    feature_count: usize,
    cache: BTreeMap<usize, Vec<usize>>,
    cached_split: Split,
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::data_access(path, e))
}

impl Dataset {
    /// Reads and parses all four files. The label cache is built over the
    /// test split.
    pub fn load(paths: &DatasetPaths) -> Result<Dataset> {
        let (train_images, _) = idx::parse_images(&read(&paths.train_images)?)?;
        let train_labels = idx::parse_labels(&read(&paths.train_labels)?)?;
        let (test_images, _) = idx::parse_images(&read(&paths.test_images)?)?;
        let test_labels = idx::parse_labels(&read(&paths.test_labels)?)?;

        let dataset = Dataset::from_parts(train_images, train_labels, test_images, test_labels)?;
        info!(
            train = dataset.train_labels.len(),
            test = dataset.test_labels.len(),
            features = dataset.feature_count,
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_parts(
        train_images: Vec<Vec<f64>>,
        train_labels: Vec<usize>,
        test_images: Vec<Vec<f64>>,
        test_labels: Vec<usize>,
    ) -> Result<Dataset> {
        if train_images.len() != train_labels.len() || test_images.len() != test_labels.len() {
            return Err(Error::Shape(format!(
                "image/label counts differ: train {}/{}, test {}/{}",
                train_images.len(),
                train_labels.len(),
                test_images.len(),
                test_labels.len()
            )));
        }

        let feature_count = train_images.first().or(test_images.first()).map_or(0, Vec::len);
        if train_images.iter().chain(test_images.iter()).any(|img| img.len() != feature_count) {
            return Err(Error::Shape(format!(
                "all samples must have {} features",
                feature_count
            )));
        }

        let mut dataset = Dataset {
            train_images,
            train_labels,
            test_images,
            test_labels,
            feature_count,
            cache: BTreeMap::new(),
            cached_split: Split::Test,
        };
        dataset.compute_cache(Split::Test);
        Ok(dataset)
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn len(&self, split: Split) -> usize {
        self.labels(split).len()
    }

    pub fn is_empty(&self, split: Split) -> bool {
        self.len(split) == 0
    }

    pub fn images(&self, split: Split) -> &[Vec<f64>] {
        match split {
            Split::Train => &self.train_images,
            Split::Test => &self.test_images,
        }
    }

    pub fn labels(&self, split: Split) -> &[usize] {
        match split {
            Split::Train => &self.train_labels,
            Split::Test => &self.test_labels,
        }
    }

    /// The whole split as `(X, Y)`, `X` holding one example per column.
    pub fn batch(&self, split: Split) -> (Matrix, Vec<usize>) {
        let x = Matrix::from_columns(self.images(split));
        let x = if x.cols == 0 { Matrix::zeros(self.feature_count, 0) } else { x };
        (x, self.labels(split).to_vec())
    }

    /// Rebuilds the label → indices cache over `split`.
    pub fn compute_cache(&mut self, split: Split) {
        let mut cache: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, &label) in self.labels(split).iter().enumerate() {
            cache.entry(label).or_default().push(i);
        }
        self.cache = cache;
        self.cached_split = split;
    }

    pub fn cached_split(&self) -> Split {
        self.cached_split
    }

    /// A uniformly chosen sample of `label` from the cached split.
    pub fn random_of_label<R: Rng + ?Sized>(&self, label: usize, rng: &mut R) -> Result<&[f64]> {
        let idx = self
            .cache
            .get(&label)
            .and_then(|indices| indices.choose(rng))
            .ok_or_else(|| Error::NotFound(format!("no sample with label {}", label)))?;
        Ok(&self.images(self.cached_split)[*idx])
    }
}
