//! Optimizers for the weight and architecture parameter groups

mod adam;
mod optimizer;
mod sgd;

pub use adam::Adam;
pub use optimizer::Optimizer;
pub use sgd::SGD;
