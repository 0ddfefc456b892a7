//! Training support for supernet search
//!
//! Batches, task losses, metrics, the callback system and synthetic data.

mod batch;
pub mod callback;
pub mod loss;
pub mod metrics;
pub mod synthetic;

pub use batch::Batch;
pub use callback::{CallbackAction, CallbackContext, CallbackManager, TrainerCallback};
pub use loss::{CrossEntropyLoss, LossFn, MSELoss};
pub use metrics::{Accuracy, Metric, MetricsTracker, MAE};
