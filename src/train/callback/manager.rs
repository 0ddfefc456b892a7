//! Callback manager for dispatching events to multiple callbacks

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Manages multiple callbacks and dispatches events in registration order
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    /// Create new callback manager
    pub fn new() -> Self {
        Self { callbacks: Vec::new() }
    }

    /// Add a callback
    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Add an already boxed callback
    pub fn add_boxed(&mut self, callback: Box<dyn TrainerCallback>) {
        self.callbacks.push(callback);
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Get number of callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Names of the registered callbacks
    pub fn names(&self) -> Vec<&'static str> {
        self.callbacks.iter().map(|cb| cb.name()).collect()
    }

    /// Fire train begin event
    pub fn on_train_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        for cb in &mut self.callbacks {
            if cb.on_train_begin(ctx) == CallbackAction::Stop {
                return CallbackAction::Stop;
            }
        }
        CallbackAction::Continue
    }

    /// Fire train end event
    pub fn on_train_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_train_end(ctx);
        }
    }

    /// Fire epoch begin event
    ///
    /// Every callback sees the event before the combined action is returned,
    /// so a schedule registered after a stopping callback still runs.
    pub fn on_epoch_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        let mut action = CallbackAction::Continue;
        for cb in &mut self.callbacks {
            action = merge(action, cb.on_epoch_begin(ctx));
        }
        action
    }

    /// Fire epoch end event
    pub fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        let mut action = CallbackAction::Continue;
        for cb in &mut self.callbacks {
            action = merge(action, cb.on_epoch_end(ctx));
        }
        action
    }

    /// Fire step end event
    pub fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        for cb in &mut self.callbacks {
            if cb.on_step_end(ctx) == CallbackAction::Stop {
                return CallbackAction::Stop;
            }
        }
        CallbackAction::Continue
    }
}

/// Stop wins over SkipEpoch, which wins over Continue
fn merge(current: CallbackAction, next: CallbackAction) -> CallbackAction {
    match (current, next) {
        (CallbackAction::Stop, _) | (_, CallbackAction::Stop) => CallbackAction::Stop,
        (CallbackAction::SkipEpoch, _) | (_, CallbackAction::SkipEpoch) => CallbackAction::SkipEpoch,
        _ => CallbackAction::Continue,
    }
}

impl Default for CallbackManager {
    fn default() -> Self {
        Self::new()
    }
}
