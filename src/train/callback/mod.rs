//! Callback system for search events
//!
//! Provides hooks for the search loop:
//! - `on_train_begin` / `on_train_end`
//! - `on_epoch_begin` / `on_epoch_end`
//! - `on_step_end`
//!
//! The temperature scheduler and the genotype watcher are callbacks.
//!
//! # Example
//!
//! ```rust
//! use gumbel_nas::train::callback::{CallbackAction, CallbackContext, TrainerCallback};
//!
//! struct LogEpoch;
//!
//! impl TrainerCallback for LogEpoch {
//!     fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
//!         log::info!("Epoch {} finished with loss {:.4}", ctx.epoch, ctx.loss);
//!         CallbackAction::Continue
//!     }
//! }
//! ```

mod manager;
mod traits;

pub use manager::CallbackManager;
pub use traits::{CallbackAction, CallbackContext, TrainerCallback};
