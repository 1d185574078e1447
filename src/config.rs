use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::DatasetPaths;
use crate::error::{Error, Result};

/// Settings shared by the CLI and the visualization server.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    /// Directory handed to `CheckpointStore::new`.
    pub checkpoint_dir: PathBuf,
    /// Name segment used in saved checkpoint file names.
    pub checkpoint_name: String,
    pub dataset: DatasetPaths,
    /// Address the `viz` server binds to.
    pub bind_addr: String,
    /// Seed for weight initialization and random example picks; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            input_size: 784,
            hidden_size: 128,
            output_size: 10,
            epochs: 500,
            learning_rate: 0.1,
            checkpoint_dir: PathBuf::from("./model_cache"),
            checkpoint_name: "model_weights".to_owned(),
            dataset: DatasetPaths::default(),
            bind_addr: "127.0.0.1:5000".to_owned(),
            seed: None,
        }
    }
}

impl AppConfig {
    /// Reads a JSON config file; keys that are absent keep their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::data_access(path, e))?;
        let reader = std::io::BufReader::new(file);
        let config: AppConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::data_access(path, e))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 || self.hidden_size == 0 || self.output_size == 0 {
            return Err(Error::InvalidInput(format!(
                "layer sizes must be positive, got {}-{}-{}",
                self.input_size, self.hidden_size, self.output_size
            )));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
