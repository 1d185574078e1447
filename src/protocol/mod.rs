//! Request handling for the visualization client.
//!
//! Two requests are supported: classify a client-drawn feature vector, and
//! classify a random test example of a chosen class. Both answer with the
//! normalized output probabilities and hidden-layer activations.

pub mod handler;
pub mod messages;

pub use handler::{handle_interaction, handle_random};
pub use messages::{parse_label, ErrorReply, Interaction, RandomRequest, VisualUpdate};
