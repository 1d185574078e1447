pub mod codec;
pub mod store;

pub use store::{Checkpoint, CheckpointInfo, CheckpointStore};
