use std::cmp::Ordering;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use tracing::{debug, info};

use crate::checkpoint::codec;
use crate::error::{Error, Result};
use crate::network::params::Parameters;

pub const EXTENSION: &str = "nnck";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d--%H-%M-%S";

fn file_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^checkpoint_(\d+(?:\.\d+)?)_(.*?)(?:_(\d{4}-\d{2}-\d{2}--\d{2}-\d{2}-\d{2}))?\.nnck$")
            .expect("checkpoint file name pattern is valid")
    })
}

/// Metadata recovered from a checkpoint's file name.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointInfo {
    /// File name inside the store directory; used as the identifier.
    pub id: String,
    pub accuracy: f64,
    pub name: String,
    pub created: Option<NaiveDateTime>,
}

impl CheckpointInfo {
    /// Parses `checkpoint_{accuracy}_{name}_{timestamp}.nnck`.
    /// The timestamp part is optional so hand-named files still rank by accuracy.
    pub fn parse(file_name: &str) -> Option<CheckpointInfo> {
        let caps = file_name_pattern().captures(file_name)?;
        let accuracy: f64 = caps.get(1)?.as_str().parse().ok()?;
        let created = caps
            .get(3)
            .and_then(|ts| NaiveDateTime::parse_from_str(ts.as_str(), TIMESTAMP_FORMAT).ok());
        Some(CheckpointInfo {
            id: file_name.to_owned(),
            accuracy,
            name: caps.get(2).map_or("", |m| m.as_str()).to_owned(),
            created,
        })
    }

    /// Best first: accuracy descending, then newest, then identifier ascending.
    fn rank(&self, other: &CheckpointInfo) -> Ordering {
        other
            .accuracy
            .partial_cmp(&self.accuracy)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.created.cmp(&self.created))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// A stored checkpoint together with its decoded parameters.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub info: CheckpointInfo,
    pub params: Parameters,
}

/// Directory of accuracy-tagged, timestamped parameter snapshots.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> CheckpointStore {
        CheckpointStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `params` as `checkpoint_{accuracy}_{name}_{timestamp}.nnck` and
    /// returns the file name. A save with the same accuracy and name within
    /// the same second replaces the earlier file.
    pub fn save(&self, params: &Parameters, accuracy: f64, name: &str) -> Result<String> {
        if !accuracy.is_finite() || accuracy < 0.0 {
            return Err(Error::InvalidInput(format!(
                "checkpoint accuracy must be a non-negative number, got {}",
                accuracy
            )));
        }
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(Error::InvalidInput(format!("invalid checkpoint name '{}'", name)));
        }

        fs::create_dir_all(&self.dir).map_err(|e| Error::data_access(&self.dir, e))?;

        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let id = format!("checkpoint_{}_{}_{}.{}", accuracy, name, timestamp, EXTENSION);
        let path = self.dir.join(&id);

        fs::write(&path, codec::encode(params)).map_err(|e| Error::data_access(&path, e))?;
        info!(path = %path.display(), accuracy, "checkpoint saved");
        Ok(id)
    }

    /// Loads the checkpoint stored under `id` (a file name inside the store).
    pub fn load(&self, id: &str) -> Result<Parameters> {
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(Error::NotFound(format!("checkpoint '{}'", id)));
        }

        let path = self.dir.join(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("checkpoint '{}' in {}", id, self.dir.display())));
            }
            Err(e) => return Err(Error::data_access(&path, e)),
        };

        let params = codec::decode(&bytes)?;
        info!(path = %path.display(), "checkpoint loaded");
        Ok(params)
    }

    /// All recognised checkpoints, best first. A missing directory is empty.
    pub fn list(&self) -> Result<Vec<CheckpointInfo>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::data_access(&self.dir, e)),
        };

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::data_access(&self.dir, e))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let file_name = entry.file_name();
            match file_name.to_str().and_then(CheckpointInfo::parse) {
                Some(info) => found.push(info),
                None => debug!(file = ?file_name, "skipping non-checkpoint file"),
            }
        }

        found.sort_by(|a, b| a.rank(b));
        Ok(found)
    }

    /// The highest-accuracy checkpoint, if any exists.
    pub fn best(&self) -> Result<Option<CheckpointInfo>> {
        Ok(self.list()?.into_iter().next())
    }

    pub fn load_best(&self) -> Result<Option<Checkpoint>> {
        match self.best()? {
            Some(info) => {
                let params = self.load(&info.id)?;
                Ok(Some(Checkpoint { info, params }))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::math::matrix::Matrix;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) fn temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("shallow-net-{}-{}-{}", tag, std::process::id(), nanos))
    }

    fn params(seed: u64) -> Parameters {
        Parameters::initialize(4, 3, 2, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn parses_generated_names() {
        let info = CheckpointInfo::parse("checkpoint_95.5_model_weights_2024-03-01--10-20-30.nnck").unwrap();
        assert_eq!(info.accuracy, 95.5);
        assert_eq!(info.name, "model_weights");
        assert_eq!(
            info.created,
            NaiveDateTime::parse_from_str("2024-03-01--10-20-30", TIMESTAMP_FORMAT).ok()
        );

        let bare = CheckpointInfo::parse("checkpoint_87_custom.nnck").unwrap();
        assert_eq!(bare.accuracy, 87.0);
        assert_eq!(bare.created, None);

        assert!(CheckpointInfo::parse("notes.txt").is_none());
        assert!(CheckpointInfo::parse("checkpoint_abc_x.nnck").is_none());
    }

    #[test]
    fn ties_break_on_newest_then_id() {
        let mut infos = vec![
            CheckpointInfo::parse("checkpoint_90_b_2024-01-01--00-00-00.nnck").unwrap(),
            CheckpointInfo::parse("checkpoint_90_a_2024-01-01--00-00-00.nnck").unwrap(),
            CheckpointInfo::parse("checkpoint_90_c_2024-06-01--00-00-00.nnck").unwrap(),
            CheckpointInfo::parse("checkpoint_91_z.nnck").unwrap(),
        ];
        infos.sort_by(|a, b| a.rank(b));
        let names: Vec<_> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["z", "c", "a", "b"]);
    }

    #[test]
    fn load_best_picks_highest_accuracy() {
        let store = CheckpointStore::new(temp_dir("best"));
        store.save(&params(1), 91.2, "model_weights").unwrap();
        store.save(&params(2), 87.0, "model_weights").unwrap();
        store.save(&params(3), 95.5, "model_weights").unwrap();
        fs::write(store.dir().join("README"), b"not a checkpoint").unwrap();

        let best = store.load_best().unwrap().unwrap();
        assert_eq!(best.info.accuracy, 95.5);
        assert!(best.info.id.starts_with("checkpoint_95.5_model_weights_"));
        assert_eq!(best.params, params(3));
        assert_eq!(store.list().unwrap().len(), 3);

        fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn empty_or_missing_directory_has_no_best() {
        let store = CheckpointStore::new(temp_dir("missing"));
        assert!(store.best().unwrap().is_none());
        assert!(store.load_best().unwrap().is_none());
    }

    #[test]
    fn unknown_identifier_is_not_found() {
        let store = CheckpointStore::new(temp_dir("unknown"));
        assert!(matches!(store.load("checkpoint_1_x.nnck"), Err(Error::NotFound(_))));
        assert!(matches!(store.load("../etc/passwd"), Err(Error::NotFound(_))));
    }

    #[test]
    fn save_rejects_bad_metadata() {
        let store = CheckpointStore::new(temp_dir("reject"));
        let p = Parameters::new(Matrix::zeros(1, 1), Matrix::zeros(1, 1), Matrix::zeros(1, 1), Matrix::zeros(1, 1))
            .unwrap();
        assert!(matches!(store.save(&p, f64::NAN, "m"), Err(Error::InvalidInput(_))));
        assert!(matches!(store.save(&p, 50.0, "a/b"), Err(Error::InvalidInput(_))));
    }
}
