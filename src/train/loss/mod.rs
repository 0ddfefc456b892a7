//! Loss functions for the task objective
//!
//! - [`MSELoss`] - Mean Squared Error for regression
//! - [`CrossEntropyLoss`] - Row-wise softmax cross entropy for classification

mod cross_entropy;
mod mse;
mod traits;

pub use cross_entropy::CrossEntropyLoss;
pub use mse::MSELoss;
pub use traits::LossFn;
