use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use shallow_net::{Classifier, Dataset};

/// Everything the request handlers need.
///
/// Handlers only read `model`; it is replaced wholesale, never mutated in
/// place, so a request always sees one consistent set of parameters.
pub struct VizState {
    pub model: Classifier,
    /// `None` when the IDX files could not be read at start-up; random-example
    /// requests are refused in that case.
    pub dataset: Option<Dataset>,
    pub rng: StdRng,
}

impl VizState {
    pub fn new(model: Classifier, dataset: Option<Dataset>, rng: StdRng) -> Self {
        VizState { model, dataset, rng }
    }
}

/// Shared state type: an `Arc<Mutex<VizState>>` passed to every handler.
pub type SharedState = Arc<Mutex<VizState>>;
