//! Hook trait and the state handed to it by `SupernetModel::fit`

/// Context passed to callbacks with current search state
#[derive(Clone, Debug, Default)]
pub struct CallbackContext {
    /// Epoch being run, from 0
    pub epoch: usize,
    /// Epochs requested from `fit`
    pub max_epochs: usize,
    /// Batch index within the epoch
    pub step: usize,
    /// Batches per epoch
    pub steps_per_epoch: usize,
    /// Steps since the search started
    pub global_step: usize,
    /// Current loss value (task loss plus auxiliary losses)
    pub loss: f32,
    /// Learning rate of the weight optimizer
    pub lr: f32,
    /// Learning rate of the architecture optimizer
    pub arch_lr: f32,
    /// Best epoch loss seen so far
    pub best_loss: Option<f32>,
    /// Search duration in seconds
    pub elapsed_secs: f64,
}

/// What a hook asks the search loop to do next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Keep going
    Continue,
    /// End the search after the current hook round
    Stop,
    /// Skip the epoch's steps (only honored at epoch begin); epoch end still fires
    SkipEpoch,
}

/// Search-loop hooks; every method defaults to a no-op
///
/// Implementors typically hold `Rc` handles to model state (temperature
/// slots, preference vectors), so the trait does not require `Send`.
pub trait TrainerCallback {
    /// Once, before the first epoch
    fn on_train_begin(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Once, after the last epoch or a stop
    fn on_train_end(&mut self, _ctx: &CallbackContext) {}

    fn on_epoch_begin(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    fn on_epoch_end(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// After every `train_step`
    fn on_step_end(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Name used in logs and by `CallbackManager::names`
    fn name(&self) -> &'static str {
        "TrainerCallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_context_default() {
        let ctx = CallbackContext::default();
        assert_eq!(ctx.epoch, 0);
        assert_eq!(ctx.loss, 0.0);
        assert!(ctx.best_loss.is_none());
    }

    #[test]
    fn test_default_trainer_callback_impl() {
        struct MinimalCallback;
        impl TrainerCallback for MinimalCallback {
            fn name(&self) -> &'static str {
                "MinimalCallback"
            }
        }

        let mut cb = MinimalCallback;
        let ctx = CallbackContext::default();
        assert_eq!(cb.on_train_begin(&ctx), CallbackAction::Continue);
        assert_eq!(cb.on_epoch_begin(&ctx), CallbackAction::Continue);
        assert_eq!(cb.on_epoch_end(&ctx), CallbackAction::Continue);
        assert_eq!(cb.on_step_end(&ctx), CallbackAction::Continue);
        assert_eq!(cb.name(), "MinimalCallback");
        cb.on_train_end(&ctx);
    }
}
