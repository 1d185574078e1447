pub mod activation;

pub use activation::{relu, relu_derivative, softmax_columns};
