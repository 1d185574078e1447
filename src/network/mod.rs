pub mod backward;
pub mod classifier;
pub mod forward;
pub mod params;

pub use backward::{backward, Gradients};
pub use classifier::{Classifier, LayerView, Tensor};
pub use forward::{forward, ForwardCache};
pub use params::Parameters;
