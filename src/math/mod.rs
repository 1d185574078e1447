pub mod matrix;
pub mod normalize;

pub use matrix::Matrix;
pub use normalize::Normalizer;
