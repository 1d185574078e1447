use rand::Rng;

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::network::{Classifier, LayerView};
use crate::protocol::messages::{parse_label, Interaction, RandomRequest, VisualUpdate};

fn to_update(view: LayerView, data: Option<Vec<f64>>) -> VisualUpdate {
    VisualUpdate {
        probabilities: view.probabilities.into_iter().enumerate().collect(),
        activations: view.activations.into_iter().enumerate().collect(),
        data,
    }
}

fn expect_input_size(model: &Classifier, len: usize) -> Result<()> {
    let expected = model
        .input_size()
        .ok_or_else(|| Error::InvalidState("no model is loaded".into()))?;
    if len != expected {
        return Err(Error::InvalidInput(format!(
            "input must have {} values, got {}",
            expected, len
        )));
    }
    Ok(())
}

/// Classifies a client-drawn feature vector.
pub fn handle_interaction(model: &Classifier, request: &Interaction) -> Result<VisualUpdate> {
    expect_input_size(model, request.input.len())?;
    let view = model.predict_single_with_probabilities_and_activations(&request.input)?;
    Ok(to_update(view, None))
}

/// Picks a random example of the requested class and classifies it.
pub fn handle_random<R: Rng + ?Sized>(
    model: &Classifier,
    dataset: &Dataset,
    request: &RandomRequest,
    rng: &mut R,
) -> Result<VisualUpdate> {
    let n_classes = model
        .output_size()
        .ok_or_else(|| Error::InvalidState("no model is loaded".into()))?;
    let label = parse_label(&request.label, n_classes)?;

    let sample = dataset.random_of_label(label, rng)?;
    expect_input_size(model, sample.len())?;
    let view = model.predict_single_with_probabilities_and_activations(sample)?;
    Ok(to_update(view, Some(sample.to_vec())))
}
