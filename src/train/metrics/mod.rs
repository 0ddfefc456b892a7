//! Evaluation metrics for search steps
//!
//! - Classification: [`Accuracy`]
//! - Regression: [`MAE`]
//! - [`MetricsTracker`] keeps per-epoch running means

mod classification;
mod regression;
mod tracker;
mod trait_def;

pub use classification::Accuracy;
pub use regression::MAE;
pub use tracker::MetricsTracker;
pub use trait_def::Metric;
