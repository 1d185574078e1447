use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A raw feature vector drawn by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub input: Vec<f64>,
}

/// Asks for a random test example of `label`.
///
/// The label is kept as raw JSON so both `5` and `"5"` are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomRequest {
    #[serde(default)]
    pub label: Value,
}

/// Payload sent back for both request types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualUpdate {
    /// Class index → normalized output probability.
    pub probabilities: BTreeMap<usize, f64>,
    /// Hidden unit index → normalized activation.
    pub activations: BTreeMap<usize, f64>,
    /// The example that was classified; only set for random requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

/// Accepts an integer JSON number, an integral float, or a string holding an
/// integer, and checks it lies in `[0, n_classes)`.
pub fn parse_label(value: &Value, n_classes: usize) -> Result<usize> {
    let max = n_classes.saturating_sub(1);
    let not_integer = || Error::InvalidInput(format!("Label must be an integer between 0 and {}", max));

    let label: i64 = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
            _ => return Err(not_integer()),
        },
        Value::String(s) => s.trim().parse().map_err(|_| not_integer())?,
        _ => return Err(not_integer()),
    };

    if label < 0 || label as u64 >= n_classes as u64 {
        return Err(Error::InvalidInput(format!(
            "Label {} is not in [0, {}]",
            label, max
        )));
    }
    Ok(label as usize)
}
