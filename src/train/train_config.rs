use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};

use crate::train::epoch_stats::EpochStats;

/// Where the starting parameters of a run come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Initialization {
    /// Random weights, zero biases.
    Fresh,
    /// Highest-accuracy checkpoint in the store; falls back to `Fresh` when
    /// the store is empty.
    ResumeBest,
    /// A specific checkpoint; failing to read it aborts the run.
    ResumeFrom(String),
}

/// Configuration for a training run.
///
/// # Fields
/// - `input_size`, `hidden_size`, `output_size`: layer widths
/// - `epochs`: number of full-batch gradient steps
/// - `learning_rate`: SGD step size, must be positive
/// - `init`: fresh weights or a checkpoint to resume from
/// - `log_every`: a progress line is logged when `epoch % log_every == 0`
/// - `progress_tx`: optional channel receiving one `EpochStats` per epoch.
///   If the receiver is dropped the loop stops early.
/// - `stop_flag`: optional atomic flag; when set from another thread the
///   loop stops at the next epoch boundary.
pub struct TrainConfig {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub init: Initialization,
    pub log_every: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a fresh-initialization config with no progress channel and no stop flag.
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        epochs: usize,
        learning_rate: f64,
    ) -> Self {
        TrainConfig {
            input_size,
            hidden_size,
            output_size,
            epochs,
            learning_rate,
            init: Initialization::Fresh,
            log_every: 10,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn with_init(mut self, init: Initialization) -> Self {
        self.init = init;
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }
}
