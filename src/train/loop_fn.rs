use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::checkpoint::CheckpointStore;
use crate::error::{Error, Result};
use crate::loss::CrossEntropyLoss;
use crate::math::matrix::Matrix;
use crate::network::{backward, forward, Parameters};
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::{Initialization, TrainConfig};

/// Lifecycle of one training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainPhase {
    Uninitialized,
    Initializing,
    /// Currently running (or last ran) the given 0-based epoch.
    Training { epoch: usize },
    Done,
}

/// Outcome of a finished (or stopped) run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub params: Parameters,
    /// Loss of every completed epoch, measured before that epoch's update.
    pub losses: Vec<f64>,
    pub epochs_completed: usize,
    /// True when the stop flag or a dropped progress receiver ended the run early.
    pub stopped: bool,
}

impl TrainReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.losses.last().copied()
    }
}

/// Drives `Uninitialized → Initializing → Training(epoch) → Done`.
pub struct Trainer<'a> {
    config: &'a TrainConfig,
    store: Option<&'a CheckpointStore>,
    phase: TrainPhase,
}

impl<'a> Trainer<'a> {
    pub fn new(config: &'a TrainConfig, store: Option<&'a CheckpointStore>) -> Trainer<'a> {
        Trainer { config, store, phase: TrainPhase::Uninitialized }
    }

    pub fn phase(&self) -> TrainPhase {
        self.phase
    }

    fn enter(&mut self, phase: TrainPhase) {
        debug!(from = ?self.phase, to = ?phase, "training phase");
        self.phase = phase;
    }

    /// Produces the starting parameters according to `config.init`.
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Parameters> {
        self.enter(TrainPhase::Initializing);
        let c = self.config;
        let fresh = |rng: &mut R| Parameters::initialize(c.input_size, c.hidden_size, c.output_size, rng);

        let params = match &c.init {
            Initialization::Fresh => fresh(rng),
            Initialization::ResumeBest => match self.store.map(CheckpointStore::load_best).transpose()?.flatten() {
                Some(checkpoint) => {
                    info!(checkpoint = %checkpoint.info.id, "resuming from best checkpoint");
                    checkpoint.params
                }
                None => {
                    let dir = self.store.map(|s| s.dir().to_path_buf()).unwrap_or_default();
                    warn!("{}; starting from fresh weights", Error::MissingCheckpoint(dir));
                    fresh(rng)
                }
            },
            Initialization::ResumeFrom(id) => {
                let store = self.store.ok_or_else(|| {
                    Error::InvalidState(format!("checkpoint '{}' requested but no checkpoint store is configured", id))
                })?;
                info!(checkpoint = %id, "resuming from checkpoint");
                store.load(id)?
            }
        };

        if (params.input_size(), params.hidden_size(), params.output_size())
            != (c.input_size, c.hidden_size, c.output_size)
        {
            return Err(Error::Shape(format!(
                "checkpoint is {}-{}-{}, run is configured for {}-{}-{}",
                params.input_size(),
                params.hidden_size(),
                params.output_size(),
                c.input_size,
                c.hidden_size,
                c.output_size
            )));
        }
        Ok(params)
    }

    /// Full-batch gradient descent over `x` (one example per column) and `labels`.
    pub fn run<R: Rng + ?Sized>(&mut self, x: &Matrix, labels: &[usize], rng: &mut R) -> Result<TrainReport> {
        validate_batch(self.config, x, labels)?;

        let mut params = self.initialize(rng)?;
        let optimizer = Sgd::new(self.config.learning_rate);
        let total_epochs = self.config.epochs;
        let log_every = self.config.log_every.max(1);

        let mut losses = Vec::with_capacity(total_epochs);
        let mut stopped = false;

        for epoch in 0..total_epochs {
            if stop_requested(self.config) {
                info!(epoch, "training stopped at epoch boundary");
                stopped = true;
                break;
            }
            self.enter(TrainPhase::Training { epoch });
            let t_start = Instant::now();

            let cache = forward(&params, x)?;
            let loss = CrossEntropyLoss::loss(labels, &cache.a2);
            let grads = backward(&params, x, labels, &cache);
            optimizer.step(&mut params, &grads);
            losses.push(loss);

            if epoch % log_every == 0 {
                info!(epoch, loss, "epoch");
            }

            if let Some(ref tx) = self.config.progress_tx {
                let stats = EpochStats {
                    epoch,
                    total_epochs,
                    loss,
                    elapsed_ms: t_start.elapsed().as_millis() as u64,
                };
                // Receiver dropped: nobody is watching, stop training.
                if tx.send(stats).is_err() {
                    info!(epoch, "progress receiver dropped; stopping");
                    stopped = true;
                    break;
                }
            }
        }

        self.enter(TrainPhase::Done);
        Ok(TrainReport {
            params,
            epochs_completed: losses.len(),
            losses,
            stopped,
        })
    }
}

/// Runs a complete training session; see `Trainer`.
pub fn train_loop<R: Rng + ?Sized>(
    x: &Matrix,
    labels: &[usize],
    config: &TrainConfig,
    store: Option<&CheckpointStore>,
    rng: &mut R,
) -> Result<TrainReport> {
    Trainer::new(config, store).run(x, labels, rng)
}

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}

fn validate_batch(config: &TrainConfig, x: &Matrix, labels: &[usize]) -> Result<()> {
    if !(config.learning_rate > 0.0 && config.learning_rate.is_finite()) {
        return Err(Error::InvalidInput(format!(
            "learning rate must be positive, got {}",
            config.learning_rate
        )));
    }
    if x.cols == 0 {
        return Err(Error::InvalidInput("training batch is empty".into()));
    }
    if x.rows != config.input_size {
        return Err(Error::Shape(format!(
            "batch has {} features, run is configured for {}",
            x.rows, config.input_size
        )));
    }
    if x.cols != labels.len() {
        return Err(Error::Shape(format!("{} examples but {} labels", x.cols, labels.len())));
    }
    if let Some((i, &label)) = labels.iter().enumerate().find(|&(_, &l)| l >= config.output_size) {
        return Err(Error::InvalidInput(format!(
            "label {} at index {} is outside [0, {})",
            label, i, config.output_size
        )));
    }
    Ok(())
}
