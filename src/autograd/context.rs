//! Execution context for forward passes

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Context for a forward pass: mode flag and random state
///
/// Stochastic layers draw their noise from the context generator, so a fixed
/// seed makes a whole training run reproducible.
pub struct Context {
    training: bool,
    rng: StdRng,
}

impl Context {
    /// Create a new context in training mode with seed 0
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Create a new context in training mode with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            training: true,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Set training mode
    pub fn train(&mut self) {
        self.training = true;
    }

    /// Set evaluation mode
    pub fn eval(&mut self) {
        self.training = false;
    }

    /// Check if in training mode
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Random generator for sampling noise
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
