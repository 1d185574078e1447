pub mod math;
pub mod activation;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod checkpoint;
pub mod data;
pub mod protocol;
pub mod config;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use math::normalize::Normalizer;
pub use network::{Classifier, Gradients, LayerView, Parameters};
pub use loss::CrossEntropyLoss;
pub use optim::sgd::Sgd;
pub use train::{train_loop, EpochStats, Initialization, TrainConfig, TrainPhase, TrainReport, Trainer};
pub use checkpoint::{CheckpointInfo, CheckpointStore};
pub use data::{Dataset, DatasetPaths, Split};
pub use config::AppConfig;
pub use error::{Error, Result};
